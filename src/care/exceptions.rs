//! Exception periods that override the base pattern.
//!
//! Each validated [`ExceptionRule`] reports which parent, if any, it assigns
//! to a given night. [`resolve_night`] then applies specificity ranking:
//! the most specific matching rule wins; equally specific rules that disagree
//! leave the night in conflict.

use chrono::{Datelike, NaiveDate};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AssignmentSource, CareParent, ExceptionJson, HolidayBlock, HolidaySplit, NightOwner,
    ParentRule,
};

use super::school_holidays::HolidayPeriod;

/// A leap year, used to check that an annual date can occur at all.
const LEAP_YEAR: i32 = 2024;

/// A validated exception rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExceptionRule {
    /// Explicit inclusive date range.
    DateRange {
        /// First night.
        start: NaiveDate,
        /// Last night.
        end: NaiveDate,
        /// The assigned parent.
        parent: CareParent,
        /// Display label.
        label: String,
    },
    /// The same days of one month every year.
    AnnualDates {
        /// Month, 1 to 12.
        month: u32,
        /// First day, inclusive.
        start_day: u32,
        /// Last day, inclusive.
        end_day: u32,
        /// Who holds the days.
        parent_rule: ParentRule,
        /// Display label.
        label: String,
    },
    /// State school holiday blocks.
    SchoolHolidays {
        /// Blocks covered.
        blocks: Vec<HolidayBlock>,
        /// How each block is divided.
        split: HolidaySplit,
        /// Display label; block names are used when absent.
        label: Option<String>,
    },
}

/// One rule's claim on a night.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionMatch {
    /// Specificity of the rule.
    pub source: AssignmentSource,
    /// The parent it assigns.
    pub parent: CareParent,
    /// Label of the rule.
    pub label: String,
}

impl ExceptionRule {
    /// Validates a raw exception.
    ///
    /// # Errors
    ///
    /// Returns `MalformedOrder` for a date range ending before it starts, an
    /// annual date that never occurs, an annual range running backwards, or a
    /// school holiday rule naming no blocks.
    pub fn from_json(exception: &ExceptionJson) -> EngineResult<Self> {
        match exception {
            ExceptionJson::DateRange {
                start,
                end,
                parent,
                label,
            } => {
                if start > end {
                    return Err(EngineError::malformed(format!(
                        "date range ends ({end}) before it starts ({start})"
                    )));
                }
                Ok(ExceptionRule::DateRange {
                    start: *start,
                    end: *end,
                    parent: *parent,
                    label: label.clone().unwrap_or_else(|| format!("date_range {start} to {end}")),
                })
            }
            ExceptionJson::AnnualDates {
                month,
                start_day,
                end_day,
                parent_rule,
                label,
            } => {
                for day in [start_day, end_day] {
                    if NaiveDate::from_ymd_opt(LEAP_YEAR, *month, *day).is_none() {
                        return Err(EngineError::malformed(format!(
                            "annual date {month:02}-{day:02} does not exist"
                        )));
                    }
                }
                if start_day > end_day {
                    return Err(EngineError::malformed(format!(
                        "annual dates in month {month} run backwards ({start_day} to {end_day})"
                    )));
                }
                Ok(ExceptionRule::AnnualDates {
                    month: *month,
                    start_day: *start_day,
                    end_day: *end_day,
                    parent_rule: *parent_rule,
                    label: label.clone().unwrap_or_else(|| {
                        format!("annual_dates {month:02}-{start_day:02} to {month:02}-{end_day:02}")
                    }),
                })
            }
            ExceptionJson::SchoolHolidays {
                blocks,
                split,
                label,
            } => {
                if blocks.is_empty() {
                    return Err(EngineError::malformed(
                        "school holiday exception names no blocks",
                    ));
                }
                Ok(ExceptionRule::SchoolHolidays {
                    blocks: blocks.clone(),
                    split: *split,
                    label: label.clone(),
                })
            }
        }
    }

    /// Specificity of this rule.
    pub fn source(&self) -> AssignmentSource {
        match self {
            ExceptionRule::DateRange { .. } => AssignmentSource::DateRange,
            ExceptionRule::AnnualDates { .. } => AssignmentSource::AnnualDates,
            ExceptionRule::SchoolHolidays { .. } => AssignmentSource::SchoolHolidays,
        }
    }

    /// The rule's claim on the night beginning `date`, if it covers it.
    ///
    /// `holiday` is the school holiday block containing `date`, if any.
    pub fn claim(&self, date: NaiveDate, holiday: Option<&HolidayPeriod>) -> Option<ExceptionMatch> {
        let (parent, label) = match self {
            ExceptionRule::DateRange {
                start,
                end,
                parent,
                label,
            } => {
                if date < *start || date > *end {
                    return None;
                }
                (*parent, label.clone())
            }
            ExceptionRule::AnnualDates {
                month,
                start_day,
                end_day,
                parent_rule,
                label,
            } => {
                if date.month() != *month || date.day() < *start_day || date.day() > *end_day {
                    return None;
                }
                (parent_rule.parent_for_year(date.year()), label.clone())
            }
            ExceptionRule::SchoolHolidays {
                blocks,
                split,
                label,
            } => {
                let period = holiday.filter(|p| blocks.contains(&p.block))?;
                let label = label.clone().unwrap_or_else(|| period.block.name().to_string());
                (holiday_owner(split, period, date), label)
            }
        };
        Some(ExceptionMatch {
            source: self.source(),
            parent,
            label,
        })
    }
}

/// Owner of a night within a school holiday block.
///
/// Parent rules resolve against the year the block starts in.
pub fn holiday_owner(split: &HolidaySplit, period: &HolidayPeriod, date: NaiveDate) -> CareParent {
    let year = period.start.year();
    let night = period.night_index(date);
    match split {
        HolidaySplit::Whole { parent_rule } => parent_rule.parent_for_year(year),
        HolidaySplit::HalfHalf { first_half } => {
            let first = first_half.parent_for_year(year);
            if 2 * night < period.nights() {
                first
            } else {
                first.other()
            }
        }
        HolidaySplit::AlternatingWeeks { first_week } => {
            let first = first_week.parent_for_year(year);
            if (night / 7) % 2 == 0 {
                first
            } else {
                first.other()
            }
        }
    }
}

/// The decided owner of one night.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNight {
    /// Owner, or conflict.
    pub owner: NightOwner,
    /// The deciding rule.
    pub source: AssignmentSource,
    /// Label of the deciding rule.
    pub label: Option<String>,
}

/// Applies specificity ranking to the claims on one night.
///
/// # Example
///
/// ```
/// use child_support_engine::care::{ExceptionMatch, resolve_night};
/// use child_support_engine::models::{AssignmentSource, CareParent, NightOwner};
///
/// let claims = vec![
///     ExceptionMatch { source: AssignmentSource::SchoolHolidays, parent: CareParent::Mother, label: "Term 1 Holidays".into() },
///     ExceptionMatch { source: AssignmentSource::DateRange, parent: CareParent::Father, label: "Trip".into() },
/// ];
/// let night = resolve_night(CareParent::Mother, &claims);
/// assert_eq!(night.owner, NightOwner::Father);
/// assert_eq!(night.source, AssignmentSource::DateRange);
/// ```
pub fn resolve_night(base_owner: CareParent, claims: &[ExceptionMatch]) -> ResolvedNight {
    let Some(top) = claims.iter().map(|c| c.source).max() else {
        return ResolvedNight {
            owner: base_owner.into(),
            source: AssignmentSource::BasePattern,
            label: None,
        };
    };

    let mut winners = claims.iter().filter(|c| c.source == top);
    let Some(first) = winners.next() else {
        return ResolvedNight {
            owner: base_owner.into(),
            source: AssignmentSource::BasePattern,
            label: None,
        };
    };
    let agreed = winners.clone().all(|c| c.parent == first.parent);

    if agreed {
        ResolvedNight {
            owner: first.parent.into(),
            source: top,
            label: Some(first.label.clone()),
        }
    } else {
        let mut labels = vec![first.label.as_str()];
        labels.extend(winners.map(|c| c.label.as_str()));
        labels.dedup();
        ResolvedNight {
            owner: NightOwner::Conflict,
            source: top,
            label: Some(labels.join(" / ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixed(parent: CareParent) -> ParentRule {
        ParentRule::Fixed { parent }
    }

    fn claim(source: AssignmentSource, parent: CareParent, label: &str) -> ExceptionMatch {
        ExceptionMatch {
            source,
            parent,
            label: label.to_string(),
        }
    }

    fn summer_2026() -> HolidayPeriod {
        HolidayPeriod {
            block: HolidayBlock::Summer,
            start: date(2026, 12, 19),
            end: date(2027, 1, 29),
        }
    }

    #[test]
    fn test_date_range_claims_inclusive_bounds() {
        let rule = ExceptionRule::from_json(&ExceptionJson::DateRange {
            start: date(2026, 3, 1),
            end: date(2026, 3, 3),
            parent: CareParent::Father,
            label: None,
        })
        .unwrap();

        assert!(rule.claim(date(2026, 2, 28), None).is_none());
        let claimed = rule.claim(date(2026, 3, 3), None).unwrap();
        assert_eq!(claimed.parent, CareParent::Father);
        assert_eq!(claimed.label, "date_range 2026-03-01 to 2026-03-03");
        assert!(rule.claim(date(2026, 3, 4), None).is_none());
    }

    #[test]
    fn test_backwards_date_range_rejected() {
        let result = ExceptionRule::from_json(&ExceptionJson::DateRange {
            start: date(2026, 3, 5),
            end: date(2026, 3, 3),
            parent: CareParent::Father,
            label: None,
        });
        assert!(matches!(result, Err(EngineError::MalformedOrder { .. })));
    }

    #[test]
    fn test_annual_dates_alternate_by_year() {
        let rule = ExceptionRule::from_json(&ExceptionJson::AnnualDates {
            month: 12,
            start_day: 24,
            end_day: 26,
            parent_rule: ParentRule::AlternatingYears {
                even_years: CareParent::Mother,
            },
            label: Some("Christmas".to_string()),
        })
        .unwrap();

        assert_eq!(rule.claim(date(2026, 12, 25), None).unwrap().parent, CareParent::Mother);
        assert_eq!(rule.claim(date(2027, 12, 25), None).unwrap().parent, CareParent::Father);
        assert!(rule.claim(date(2026, 12, 27), None).is_none());
        assert_eq!(rule.source(), AssignmentSource::AnnualDates);
    }

    #[test]
    fn test_nonexistent_annual_date_rejected() {
        let rule = |month, day| ExceptionJson::AnnualDates {
            month,
            start_day: day,
            end_day: day,
            parent_rule: fixed(CareParent::Mother),
            label: None,
        };
        assert!(ExceptionRule::from_json(&rule(2, 29)).is_ok());
        assert!(ExceptionRule::from_json(&rule(2, 30)).is_err());
        assert!(ExceptionRule::from_json(&rule(13, 1)).is_err());
    }

    #[test]
    fn test_school_holidays_only_claim_named_blocks() {
        let rule = ExceptionRule::from_json(&ExceptionJson::SchoolHolidays {
            blocks: vec![HolidayBlock::Term2],
            split: HolidaySplit::Whole {
                parent_rule: fixed(CareParent::Father),
            },
            label: None,
        })
        .unwrap();
        let summer = summer_2026();
        assert!(rule.claim(date(2026, 12, 20), Some(&summer)).is_none());
        assert!(rule.claim(date(2026, 12, 20), None).is_none());
    }

    #[test]
    fn test_school_holiday_label_defaults_to_block_name() {
        let rule = ExceptionRule::from_json(&ExceptionJson::SchoolHolidays {
            blocks: vec![HolidayBlock::Summer],
            split: HolidaySplit::Whole {
                parent_rule: fixed(CareParent::Father),
            },
            label: None,
        })
        .unwrap();
        let claimed = rule.claim(date(2027, 1, 2), Some(&summer_2026())).unwrap();
        assert_eq!(claimed.label, "Summer Holidays");
        assert_eq!(claimed.source, AssignmentSource::SchoolHolidays);
    }

    #[test]
    fn test_half_half_split() {
        // 42 nights: first 21 with the first parent
        let split = HolidaySplit::HalfHalf {
            first_half: fixed(CareParent::Mother),
        };
        let summer = summer_2026();
        assert_eq!(holiday_owner(&split, &summer, date(2026, 12, 19)), CareParent::Mother);
        assert_eq!(holiday_owner(&split, &summer, date(2027, 1, 8)), CareParent::Mother);
        assert_eq!(holiday_owner(&split, &summer, date(2027, 1, 9)), CareParent::Father);
        assert_eq!(holiday_owner(&split, &summer, date(2027, 1, 29)), CareParent::Father);
    }

    #[test]
    fn test_half_half_odd_length_gives_first_parent_extra_night() {
        let period = HolidayPeriod {
            block: HolidayBlock::Term1,
            start: date(2026, 4, 3),
            end: date(2026, 4, 19),
        };
        let split = HolidaySplit::HalfHalf {
            first_half: fixed(CareParent::Father),
        };
        let father_nights = (0..period.nights())
            .filter(|&i| holiday_owner(&split, &period, period.start + chrono::Duration::days(i)) == CareParent::Father)
            .count();
        assert_eq!(father_nights, 9);
    }

    #[test]
    fn test_alternating_weeks_split() {
        let split = HolidaySplit::AlternatingWeeks {
            first_week: ParentRule::AlternatingYears {
                even_years: CareParent::Father,
            },
        };
        let summer = summer_2026();
        assert_eq!(holiday_owner(&split, &summer, date(2026, 12, 25)), CareParent::Father);
        assert_eq!(holiday_owner(&split, &summer, date(2026, 12, 26)), CareParent::Mother);
        // Block started in 2026, so January nights still use the 2026 rule
        assert_eq!(holiday_owner(&split, &summer, date(2027, 1, 2)), CareParent::Father);
    }

    #[test]
    fn test_resolve_without_claims_uses_base() {
        let night = resolve_night(CareParent::Mother, &[]);
        assert_eq!(night.owner, NightOwner::Mother);
        assert_eq!(night.source, AssignmentSource::BasePattern);
        assert_eq!(night.label, None);
    }

    #[test]
    fn test_resolve_equal_specificity_agreement() {
        let claims = [
            claim(AssignmentSource::AnnualDates, CareParent::Father, "Christmas"),
            claim(AssignmentSource::AnnualDates, CareParent::Father, "Boxing Day"),
        ];
        let night = resolve_night(CareParent::Mother, &claims);
        assert_eq!(night.owner, NightOwner::Father);
        assert_eq!(night.label.as_deref(), Some("Christmas"));
    }

    #[test]
    fn test_resolve_equal_specificity_disagreement_is_conflict() {
        let claims = [
            claim(AssignmentSource::DateRange, CareParent::Father, "Trip"),
            claim(AssignmentSource::DateRange, CareParent::Mother, "Camp"),
            claim(AssignmentSource::SchoolHolidays, CareParent::Mother, "Term 1 Holidays"),
        ];
        let night = resolve_night(CareParent::Mother, &claims);
        assert_eq!(night.owner, NightOwner::Conflict);
        assert_eq!(night.source, AssignmentSource::DateRange);
        assert_eq!(night.label.as_deref(), Some("Trip / Camp"));
    }
}
