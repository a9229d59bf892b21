//! State school holiday calendar.
//!
//! Holidays are derived from each state's four school terms: the gaps between
//! consecutive terms, plus a summer block after term 4. Years other than the
//! configured base year reuse the base year's terms shifted by whole years.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::{SchoolTermsConfig, TermDates};
use crate::error::{EngineError, EngineResult};
use crate::models::HolidayBlock;

/// Terms per school year.
pub const TERMS_PER_YEAR: usize = 4;

/// An Australian state or territory.
///
/// # Example
///
/// ```
/// use child_support_engine::care::AustralianState;
///
/// let state: AustralianState = " vic ".parse().unwrap();
/// assert_eq!(state, AustralianState::Vic);
/// assert_eq!(state.code(), "VIC");
/// assert!("XYZ".parse::<AustralianState>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AustralianState {
    /// Victoria.
    Vic,
    /// New South Wales.
    Nsw,
    /// Queensland.
    Qld,
    /// Western Australia.
    Wa,
    /// South Australia.
    Sa,
    /// Tasmania.
    Tas,
    /// Australian Capital Territory.
    Act,
    /// Northern Territory.
    Nt,
}

impl AustralianState {
    /// Every state and territory.
    pub const ALL: [AustralianState; 8] = [
        AustralianState::Vic,
        AustralianState::Nsw,
        AustralianState::Qld,
        AustralianState::Wa,
        AustralianState::Sa,
        AustralianState::Tas,
        AustralianState::Act,
        AustralianState::Nt,
    ];

    /// The upper-case postal code.
    pub fn code(self) -> &'static str {
        match self {
            AustralianState::Vic => "VIC",
            AustralianState::Nsw => "NSW",
            AustralianState::Qld => "QLD",
            AustralianState::Wa => "WA",
            AustralianState::Sa => "SA",
            AustralianState::Tas => "TAS",
            AustralianState::Act => "ACT",
            AustralianState::Nt => "NT",
        }
    }
}

impl fmt::Display for AustralianState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for AustralianState {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        AustralianState::ALL
            .into_iter()
            .find(|state| state.code() == code)
            .ok_or(EngineError::UnknownJurisdiction {
                code: s.trim().to_string(),
            })
    }
}

/// One school holiday block in one year.
///
/// `start` and `end` are both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayPeriod {
    /// Which block this is.
    pub block: HolidayBlock,
    /// First holiday night.
    pub start: NaiveDate,
    /// Last holiday night.
    pub end: NaiveDate,
}

impl HolidayPeriod {
    /// Returns true if `date` falls within the block.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Nights in the block.
    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Zero-based night index of `date` within the block.
    pub fn night_index(&self, date: NaiveDate) -> i64 {
        (date - self.start).num_days()
    }
}

/// Validated school term dates for every state.
#[derive(Debug, Clone, PartialEq)]
pub struct SchoolCalendar {
    base_year: i32,
    summer_holiday_days: u32,
    terms: BTreeMap<AustralianState, Vec<TermDates>>,
}

/// Moves a date to another year, using the 28th when the day does not exist.
fn shift_to_year(date: NaiveDate, year: i32) -> Option<NaiveDate> {
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28))
}

impl SchoolCalendar {
    /// Builds a calendar from a parsed terms file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for unknown state codes, a state without
    /// exactly four terms, a term ending before it starts, overlapping or
    /// out-of-order terms, or a zero-length summer block.
    pub fn from_config(config: SchoolTermsConfig) -> EngineResult<Self> {
        if config.summer_holiday_days == 0 {
            return Err(EngineError::invalid_config(
                "summer_holiday_days must be at least 1",
            ));
        }

        let mut terms = BTreeMap::new();
        for (code, state_terms) in config.states {
            let state: AustralianState = code.parse().map_err(|_| {
                EngineError::invalid_config(format!("unknown state code '{code}' in school terms"))
            })?;
            if state_terms.len() != TERMS_PER_YEAR {
                return Err(EngineError::invalid_config(format!(
                    "{code}: expected {TERMS_PER_YEAR} terms, found {}",
                    state_terms.len()
                )));
            }
            for (index, term) in state_terms.iter().enumerate() {
                if term.start > term.end {
                    return Err(EngineError::invalid_config(format!(
                        "{code}: term {} ends before it starts",
                        index + 1
                    )));
                }
            }
            for (index, pair) in state_terms.windows(2).enumerate() {
                if pair[0].end >= pair[1].start {
                    return Err(EngineError::invalid_config(format!(
                        "{code}: term {} must end before term {} starts",
                        index + 1,
                        index + 2
                    )));
                }
            }
            terms.insert(state, state_terms);
        }

        Ok(Self {
            base_year: config.base_year,
            summer_holiday_days: config.summer_holiday_days,
            terms,
        })
    }

    /// The year the configured terms belong to.
    pub fn base_year(&self) -> i32 {
        self.base_year
    }

    /// Returns true if term dates are configured for `state`.
    pub fn supports(&self, state: AustralianState) -> bool {
        self.terms.contains_key(&state)
    }

    /// Term dates for `state` in `year`, shifted from the base year.
    pub fn terms_for_year(&self, state: AustralianState, year: i32) -> Vec<TermDates> {
        let Some(terms) = self.terms.get(&state) else {
            return Vec::new();
        };
        terms
            .iter()
            .filter_map(|term| {
                let start = shift_to_year(term.start, term.start.year() - self.base_year + year)?;
                let end = shift_to_year(term.end, term.end.year() - self.base_year + year)?;
                Some(TermDates { start, end })
            })
            .collect()
    }

    /// The holiday blocks of `state` that begin in `year`.
    ///
    /// The summer block runs from the day after term 4 ends, so it usually
    /// extends into January of the following year.
    pub fn holidays(&self, state: AustralianState, year: i32) -> Vec<HolidayPeriod> {
        let terms = self.terms_for_year(state, year);
        if terms.len() != TERMS_PER_YEAR {
            return Vec::new();
        }

        let gap_blocks = [HolidayBlock::Term1, HolidayBlock::Term2, HolidayBlock::Term3];
        let mut periods: Vec<HolidayPeriod> = terms
            .windows(2)
            .zip(gap_blocks)
            .filter_map(|(pair, block)| {
                let start = pair[0].end.checked_add_days(Days::new(1))?;
                let end = pair[1].start.checked_sub_days(Days::new(1))?;
                (start <= end).then_some(HolidayPeriod { block, start, end })
            })
            .collect();

        let last_term_end = terms[TERMS_PER_YEAR - 1].end;
        if let (Some(start), Some(end)) = (
            last_term_end.checked_add_days(Days::new(1)),
            last_term_end.checked_add_days(Days::new(u64::from(self.summer_holiday_days))),
        ) {
            periods.push(HolidayPeriod {
                block: HolidayBlock::Summer,
                start,
                end,
            });
        }
        periods
    }

    /// Every holiday block overlapping `start..end` (end exclusive), in date order.
    pub fn holidays_between(
        &self,
        state: AustralianState,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<HolidayPeriod> {
        let mut periods: Vec<HolidayPeriod> = (start.year() - 1..=end.year())
            .flat_map(|year| self.holidays(state, year))
            .filter(|period| period.end >= start && period.start < end)
            .collect();
        periods.sort_by_key(|period| period.start);
        periods
    }

    /// The holiday block containing `date`, if any.
    ///
    /// # Example
    ///
    /// ```
    /// use child_support_engine::care::{AustralianState, SchoolCalendar};
    /// use child_support_engine::models::HolidayBlock;
    /// use chrono::NaiveDate;
    ///
    /// let calendar = SchoolCalendar::builtin().unwrap();
    /// let date = NaiveDate::from_ymd_opt(2027, 1, 10).unwrap();
    /// let period = calendar.holiday_at(AustralianState::Vic, date).unwrap();
    /// assert_eq!(period.block, HolidayBlock::Summer);
    /// ```
    pub fn holiday_at(&self, state: AustralianState, date: NaiveDate) -> Option<HolidayPeriod> {
        (date.year() - 1..=date.year() + 1)
            .flat_map(|year| self.holidays(state, year))
            .find(|period| period.contains(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar() -> SchoolCalendar {
        SchoolCalendar::builtin().unwrap().as_ref().clone()
    }

    fn term(start: NaiveDate, end: NaiveDate) -> TermDates {
        TermDates { start, end }
    }

    #[test]
    fn test_parse_state_codes() {
        assert_eq!("NSW".parse::<AustralianState>().unwrap(), AustralianState::Nsw);
        assert_eq!("act".parse::<AustralianState>().unwrap(), AustralianState::Act);
        match "Victoria".parse::<AustralianState>() {
            Err(EngineError::UnknownJurisdiction { code }) => assert_eq!(code, "Victoria"),
            other => panic!("Expected UnknownJurisdiction, got {:?}", other),
        }
    }

    #[test]
    fn test_builtin_calendar_covers_every_state() {
        let calendar = calendar();
        for state in AustralianState::ALL {
            assert!(calendar.supports(state), "{state} missing");
            assert_eq!(calendar.holidays(state, 2026).len(), 4);
        }
    }

    #[test]
    fn test_vic_2026_holidays() {
        let holidays = calendar().holidays(AustralianState::Vic, 2026);

        assert_eq!(holidays[0].block, HolidayBlock::Term1);
        assert_eq!(holidays[0].start, date(2026, 4, 3));
        assert_eq!(holidays[0].end, date(2026, 4, 19));
        assert_eq!(holidays[1].start, date(2026, 6, 27));
        assert_eq!(holidays[1].end, date(2026, 7, 12));
        assert_eq!(holidays[2].start, date(2026, 9, 19));
        assert_eq!(holidays[2].end, date(2026, 10, 4));

        let summer = holidays[3];
        assert_eq!(summer.block, HolidayBlock::Summer);
        assert_eq!(summer.start, date(2026, 12, 19));
        assert_eq!(summer.end, date(2027, 1, 29));
        assert_eq!(summer.nights(), 42);
    }

    #[test]
    fn test_other_years_shift_base_terms() {
        let holidays = calendar().holidays(AustralianState::Vic, 2028);
        assert_eq!(holidays[0].start, date(2028, 4, 3));
        assert_eq!(holidays[3].start, date(2028, 12, 19));
    }

    #[test]
    fn test_january_falls_in_previous_summer() {
        let period = calendar().holiday_at(AustralianState::Nsw, date(2026, 1, 5)).unwrap();
        assert_eq!(period.block, HolidayBlock::Summer);
        assert_eq!(period.start.year(), 2025);
    }

    #[test]
    fn test_term_time_is_not_holiday() {
        assert_eq!(calendar().holiday_at(AustralianState::Vic, date(2026, 5, 12)), None);
    }

    #[test]
    fn test_holidays_between_is_ordered_and_bounded() {
        let periods = calendar().holidays_between(AustralianState::Qld, date(2026, 3, 1), date(2027, 3, 1));
        assert_eq!(periods.len(), 4);
        assert!(periods.windows(2).all(|p| p[0].start < p[1].start));
        assert_eq!(periods[0].block, HolidayBlock::Term1);
        assert_eq!(periods[3].block, HolidayBlock::Summer);
    }

    #[test]
    fn test_night_index_within_block() {
        let period = HolidayPeriod {
            block: HolidayBlock::Term2,
            start: date(2026, 6, 27),
            end: date(2026, 7, 12),
        };
        assert_eq!(period.nights(), 16);
        assert_eq!(period.night_index(date(2026, 7, 4)), 7);
        assert!(!period.contains(date(2026, 7, 13)));
    }

    #[test]
    fn test_shift_leap_day_falls_back_to_28th() {
        assert_eq!(shift_to_year(date(2028, 2, 29), 2027), Some(date(2027, 2, 28)));
    }

    #[test]
    fn test_rejects_unknown_state_code() {
        let config = SchoolTermsConfig {
            base_year: 2026,
            summer_holiday_days: 42,
            states: BTreeMap::from([("XX".to_string(), Vec::new())]),
        };
        assert!(matches!(
            SchoolCalendar::from_config(config),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_rejects_overlapping_terms() {
        let terms = vec![
            term(date(2026, 1, 27), date(2026, 4, 20)),
            term(date(2026, 4, 20), date(2026, 6, 26)),
            term(date(2026, 7, 13), date(2026, 9, 18)),
            term(date(2026, 10, 5), date(2026, 12, 18)),
        ];
        let config = SchoolTermsConfig {
            base_year: 2026,
            summer_holiday_days: 42,
            states: BTreeMap::from([("VIC".to_string(), terms)]),
        };
        match SchoolCalendar::from_config(config) {
            Err(EngineError::InvalidConfig { message }) => assert!(message.contains("term 1")),
            other => panic!("Expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_missing_terms() {
        let config = SchoolTermsConfig {
            base_year: 2026,
            summer_holiday_days: 42,
            states: BTreeMap::from([(
                "TAS".to_string(),
                vec![term(date(2026, 2, 5), date(2026, 4, 17))],
            )]),
        };
        assert!(SchoolCalendar::from_config(config).is_err());
    }
}
