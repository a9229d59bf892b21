//! The court order care calculator.
//!
//! Projects a validated order night by night over a 24-month horizon from the
//! anchor date, then aggregates care percentages for the reporting window.

use std::collections::HashSet;

use chrono::{Datelike, Days, Local, Months, NaiveDate};
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AssignmentSource, CareCalculationResult, CareWarning, CourtOrderJson, DayAssignment,
    HolidayAssignment, NightOwner,
};

use super::exceptions::resolve_night;
use super::order::ValidatedOrder;
use super::school_holidays::{AustralianState, HolidayPeriod, SchoolCalendar};
use super::window::{ReportingWindow, summarize};

/// Length of the projection horizon.
pub const HORIZON_MONTHS: u32 = 24;

/// Projects a court order into nightly care.
///
/// # Example
///
/// ```
/// use child_support_engine::care::{CareCalculator, SchoolCalendar};
/// use child_support_engine::models::CourtOrderJson;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let order = CourtOrderJson::from_json_str(r#"{
///     "pattern": {
///         "type": "weekly_alternating",
///         "week_a": { "mother": ["mon", "tue", "wed", "thu", "fri", "sat", "sun"] }
///     }
/// }"#).unwrap();
/// let calendar = SchoolCalendar::builtin().unwrap();
/// let anchor = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
///
/// let result = CareCalculator::new(&order, anchor, "VIC", &calendar)
///     .unwrap()
///     .as_of(NaiveDate::from_ymd_opt(2027, 2, 1).unwrap())
///     .calculate()
///     .unwrap();
///
/// assert_eq!(result.horizon.total_nights, 730);
/// assert_eq!(result.window.total_nights, 364);
/// assert_eq!(result.window.mother_percentage, Decimal::from(50));
/// ```
#[derive(Debug, Clone)]
pub struct CareCalculator<'a> {
    order: ValidatedOrder,
    anchor: NaiveDate,
    state_code: String,
    state: Option<AustralianState>,
    calendar: &'a SchoolCalendar,
    window: Option<ReportingWindow>,
    as_of: Option<NaiveDate>,
}

impl<'a> CareCalculator<'a> {
    /// Validates `order` and prepares a calculation.
    ///
    /// The state code is only required to be known when an exception refers
    /// to school holidays.
    ///
    /// # Errors
    ///
    /// - `MalformedOrder` if the order fails validation
    /// - `UnknownJurisdiction` if school holidays are needed for an
    ///   unrecognised state, or one without term dates
    pub fn new(
        order: &CourtOrderJson,
        anchor: NaiveDate,
        state: &str,
        calendar: &'a SchoolCalendar,
    ) -> EngineResult<Self> {
        let order = ValidatedOrder::new(order)?;
        let parsed = state.parse::<AustralianState>().ok();

        if order.needs_school_calendar() {
            match parsed {
                Some(known) if calendar.supports(known) => {}
                _ => {
                    warn!(state, "no school terms for state");
                    return Err(EngineError::UnknownJurisdiction {
                        code: state.trim().to_string(),
                    });
                }
            }
        }

        Ok(Self {
            order,
            anchor,
            state_code: parsed.map_or_else(|| state.trim().to_string(), |s| s.code().to_string()),
            state: parsed,
            calendar,
            window: None,
            as_of: None,
        })
    }

    /// Sets an explicit reporting window.
    pub fn with_window(mut self, window: ReportingWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Sets the date the default trailing-year window ends on.
    pub fn as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }

    /// The projection horizon: the anchor up to 24 months later.
    pub fn horizon(&self) -> EngineResult<ReportingWindow> {
        let end = self
            .anchor
            .checked_add_months(Months::new(HORIZON_MONTHS))
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("horizon from {} overflows the calendar", self.anchor),
            })?;
        ReportingWindow::new(self.anchor, end)
    }

    /// The reporting window after clamping into the horizon.
    ///
    /// Falls back to the first twelve months of the horizon when the
    /// requested window lies entirely outside it.
    fn reporting_window(&self, horizon: &ReportingWindow) -> ReportingWindow {
        let requested = self.window.unwrap_or_else(|| {
            ReportingWindow::trailing_year(self.as_of.unwrap_or_else(|| Local::now().date_naive()))
        });
        let clamped = requested.clamp_to(horizon);
        if clamped.is_empty() {
            debug!(
                start = %requested.start,
                end = %requested.end,
                "reporting window outside horizon; using first year"
            );
            ReportingWindow::year_from(horizon.start).clamp_to(horizon)
        } else {
            clamped
        }
    }

    fn holidays(&self, horizon: &ReportingWindow) -> Vec<HolidayPeriod> {
        match self.state {
            Some(state) if self.order.needs_school_calendar() => {
                self.calendar.holidays_between(state, horizon.start, horizon.end)
            }
            _ => Vec::new(),
        }
    }

    /// Assigns every night of the horizon.
    pub fn project(&self) -> EngineResult<Vec<DayAssignment>> {
        let horizon = self.horizon()?;
        let phase_anchor = self.order.start_date().unwrap_or(self.anchor);
        let holidays = self.holidays(&horizon);
        debug!(
            start = %horizon.start,
            end = %horizon.end,
            %phase_anchor,
            holiday_blocks = holidays.len(),
            "projecting court order"
        );

        let mut assignments = Vec::with_capacity(horizon.nights().max(0) as usize);
        let mut date = horizon.start;
        while date < horizon.end {
            let base_owner = self.order.pattern().owner_on(date, phase_anchor);
            let holiday = holidays.iter().find(|p| p.contains(date));
            let claims: Vec<_> = self
                .order
                .exceptions()
                .iter()
                .filter_map(|rule| rule.claim(date, holiday))
                .collect();
            let night = resolve_night(base_owner, &claims);

            assignments.push(DayAssignment {
                date,
                owner: night.owner,
                source: night.source,
                label: night.label,
            });

            date = date
                .checked_add_days(Days::new(1))
                .ok_or_else(|| EngineError::CalculationError {
                    message: format!("date overflow after {date}"),
                })?;
        }
        Ok(assignments)
    }

    /// Runs the projection and aggregation.
    ///
    /// # Errors
    ///
    /// Returns `CalculationError` if the horizon cannot be represented.
    pub fn calculate(&self) -> EngineResult<CareCalculationResult> {
        let horizon_window = self.horizon()?;
        let assignments = self.project()?;
        let report_window = self.reporting_window(&horizon_window);

        let horizon = summarize(&assignments, &horizon_window);
        let window = summarize(&assignments, &report_window);
        let warnings = conflict_warnings(&assignments);
        let holiday_assignments = holiday_assignments(&assignments);

        info!(
            anchor = %self.anchor,
            state = %self.state_code,
            nights = horizon.total_nights,
            mother_percentage = %window.mother_percentage,
            father_percentage = %window.father_percentage,
            conflicts = horizon.conflict_nights,
            "completed care calculation"
        );

        Ok(CareCalculationResult {
            anchor: self.anchor,
            state: self.state_code.clone(),
            assignments,
            horizon,
            window,
            holiday_assignments,
            warnings,
        })
    }
}

/// One warning per contiguous run of conflicted nights.
fn conflict_warnings(assignments: &[DayAssignment]) -> Vec<CareWarning> {
    let mut runs: Vec<(Vec<NaiveDate>, Option<String>)> = Vec::new();
    let mut previous: Option<NaiveDate> = None;

    for assignment in assignments.iter().filter(|a| a.owner == NightOwner::Conflict) {
        let continues = previous.and_then(|d| d.succ_opt()) == Some(assignment.date);
        match runs.last_mut() {
            Some((dates, _)) if continues => dates.push(assignment.date),
            Some(_) | None => runs.push((vec![assignment.date], assignment.label.clone())),
        }
        previous = Some(assignment.date);
    }

    runs.into_iter()
        .filter_map(|(dates, label)| {
            let (first, last) = (*dates.first()?, *dates.last()?);
            let rules = label.unwrap_or_else(|| "exceptions".to_string());
            warn!(%first, %last, nights = dates.len(), rules = %rules, "ambiguous exception conflict");
            Some(CareWarning {
                code: "ambiguous_exception_conflict".to_string(),
                message: format!(
                    "Equally specific exceptions ({rules}) assign different parents from {first} to {last}; manual review required"
                ),
                severity: "high".to_string(),
                dates,
            })
        })
        .collect()
}

/// First owner of each labelled exception per calendar year.
fn holiday_assignments(assignments: &[DayAssignment]) -> Vec<HolidayAssignment> {
    let mut seen = HashSet::new();
    assignments
        .iter()
        .filter(|a| a.source != AssignmentSource::BasePattern)
        .filter_map(|a| {
            let label = a.label.as_ref()?;
            seen.insert((label.clone(), a.date.year())).then(|| HolidayAssignment {
                event: label.clone(),
                year: a.date.year(),
                care_with: a.owner,
            })
        })
        .collect()
}

/// Calculates care from an order with the built-in school calendar.
///
/// The reporting window is the twelve months ending today, clamped into the
/// horizon, so the result depends on the system clock. Use
/// [`CareCalculator::as_of`] or [`CareCalculator::with_window`] for a
/// reproducible window.
///
/// # Errors
///
/// Returns `MalformedOrder` for an invalid order and `UnknownJurisdiction`
/// when school holidays are needed for an unsupported state.
pub fn calculate_care_from_order(
    order: &CourtOrderJson,
    anchor: NaiveDate,
    state: &str,
) -> EngineResult<CareCalculationResult> {
    let calendar = SchoolCalendar::builtin()?;
    CareCalculator::new(order, anchor, state, &calendar)?.calculate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CareParent;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn order(json: &str) -> CourtOrderJson {
        CourtOrderJson::from_json_str(json).unwrap()
    }

    fn calculate(json: &str, anchor: NaiveDate, as_of: NaiveDate) -> CareCalculationResult {
        let calendar = SchoolCalendar::builtin().unwrap();
        CareCalculator::new(&order(json), anchor, "VIC", &calendar)
            .unwrap()
            .as_of(as_of)
            .calculate()
            .unwrap()
    }

    const WEEKENDS_WITH_FATHER: &str = r#"{
        "pattern": { "type": "fixed_weekday_split",
                     "mother": ["mon", "tue", "wed", "thu", "sun"], "father": ["fri", "sat"] }
    }"#;

    fn owner_on(result: &CareCalculationResult, day: NaiveDate) -> NightOwner {
        result
            .assignments
            .iter()
            .find(|a| a.date == day)
            .map(|a| a.owner)
            .unwrap()
    }

    #[test]
    fn test_horizon_is_24_months() {
        let result = calculate(WEEKENDS_WITH_FATHER, date(2026, 2, 2), date(2027, 2, 2));
        assert_eq!(result.assignments.len(), 730);
        assert_eq!(result.assignments.first().unwrap().date, date(2026, 2, 2));
        assert_eq!(result.assignments.last().unwrap().date, date(2028, 2, 1));

        // Spans 29 February 2028
        let leap = calculate(WEEKENDS_WITH_FATHER, date(2026, 6, 1), date(2027, 6, 1));
        assert_eq!(leap.assignments.len(), 731);
    }

    #[test]
    fn test_weekends_pattern_percentages() {
        let result = calculate(WEEKENDS_WITH_FATHER, date(2026, 2, 2), date(2027, 2, 1));
        // 52 full weeks
        assert_eq!(result.window.total_nights, 364);
        assert_eq!(result.window.father_nights, 104);
        assert_eq!(result.window.father_percentage, Decimal::new(286, 1));
        assert_eq!(result.window.mother_percentage, Decimal::new(714, 1));
        assert!(result.warnings.is_empty());
        assert!(result.holiday_assignments.is_empty());
    }

    #[test]
    fn test_night_counts_are_conserved() {
        let result = calculate(WEEKENDS_WITH_FATHER, date(2026, 2, 2), date(2027, 2, 1));
        let h = &result.horizon;
        assert_eq!(h.mother_nights + h.father_nights + h.conflict_nights, h.total_nights);
        assert_eq!(h.total_nights as usize, result.assignments.len());
    }

    #[test]
    fn test_date_range_overrides_annual_dates_and_base() {
        let json = r#"{
            "pattern": { "type": "fixed_weekday_split",
                         "mother": ["mon", "tue", "wed", "thu", "fri", "sat", "sun"] },
            "exceptions": [
                { "type": "annual_dates", "month": 12, "start_day": 24, "end_day": 26,
                  "parent_rule": { "type": "fixed", "parent": "father" }, "label": "Christmas" },
                { "type": "date_range", "start": "2026-12-25", "end": "2026-12-25", "parent": "mother", "label": "Trip" }
            ]
        }"#;
        let result = calculate(json, date(2026, 2, 2), date(2027, 2, 1));

        assert_eq!(owner_on(&result, date(2026, 12, 24)), NightOwner::Father);
        assert_eq!(owner_on(&result, date(2026, 12, 25)), NightOwner::Mother);
        assert_eq!(owner_on(&result, date(2026, 12, 26)), NightOwner::Father);
        assert_eq!(owner_on(&result, date(2027, 12, 25)), NightOwner::Father);
        assert_eq!(result.window.father_nights, 2);
    }

    #[test]
    fn test_school_holidays_override_base_pattern() {
        let json = r#"{
            "pattern": { "type": "fixed_weekday_split",
                         "mother": ["mon", "tue", "wed", "thu", "fri", "sat", "sun"] },
            "exceptions": [
                { "type": "school_holidays", "blocks": ["term_1"],
                  "split": { "type": "whole", "parent_rule": { "type": "alternating_years", "even_years": "father" } } }
            ]
        }"#;
        let result = calculate(json, date(2026, 2, 2), date(2027, 2, 1));

        // VIC term 1 holidays 2026: 3 to 19 April (17 nights)
        assert_eq!(owner_on(&result, date(2026, 4, 3)), NightOwner::Father);
        assert_eq!(owner_on(&result, date(2026, 4, 20)), NightOwner::Mother);
        assert_eq!(owner_on(&result, date(2027, 4, 10)), NightOwner::Mother);
        assert_eq!(result.window.father_nights, 17);

        assert_eq!(
            result.holiday_assignments[0],
            HolidayAssignment {
                event: "Term 1 Holidays".to_string(),
                year: 2026,
                care_with: NightOwner::Father,
            }
        );
        assert_eq!(result.holiday_assignments[1].year, 2027);
        assert_eq!(result.holiday_assignments[1].care_with, NightOwner::Mother);
    }

    #[test]
    fn test_conflicting_date_ranges_flagged() {
        let json = r#"{
            "pattern": { "type": "fixed_weekday_split",
                         "mother": ["mon", "tue", "wed", "thu", "fri", "sat", "sun"] },
            "exceptions": [
                { "type": "date_range", "start": "2026-07-01", "end": "2026-07-05", "parent": "father" },
                { "type": "date_range", "start": "2026-07-04", "end": "2026-07-06", "parent": "mother" },
                { "type": "date_range", "start": "2026-09-01", "end": "2026-09-01", "parent": "father" },
                { "type": "date_range", "start": "2026-09-01", "end": "2026-09-01", "parent": "mother" }
            ]
        }"#;
        let result = calculate(json, date(2026, 2, 2), date(2027, 2, 1));

        assert_eq!(owner_on(&result, date(2026, 7, 3)), NightOwner::Father);
        assert_eq!(owner_on(&result, date(2026, 7, 4)), NightOwner::Conflict);
        assert_eq!(owner_on(&result, date(2026, 7, 6)), NightOwner::Mother);
        assert_eq!(result.window.conflict_nights, 3);
        assert!(result.requires_review());

        assert_eq!(result.warnings.len(), 2);
        assert_eq!(result.warnings[0].code, "ambiguous_exception_conflict");
        assert_eq!(result.warnings[0].dates, vec![date(2026, 7, 4), date(2026, 7, 5)]);
        assert_eq!(result.warnings[1].dates, vec![date(2026, 9, 1)]);
    }

    #[test]
    fn test_start_date_sets_phase() {
        let json = r#"{
            "start_date": "2026-02-09",
            "pattern": { "type": "weekly_alternating",
                         "week_a": { "father": ["mon", "tue", "wed", "thu", "fri", "sat", "sun"] } }
        }"#;
        let result = calculate(json, date(2026, 2, 2), date(2027, 2, 1));
        assert_eq!(owner_on(&result, date(2026, 2, 2)), NightOwner::Mother);
        assert_eq!(owner_on(&result, date(2026, 2, 9)), NightOwner::Father);
    }

    #[test]
    fn test_explicit_window_is_clamped() {
        let calendar = SchoolCalendar::builtin().unwrap();
        let window = ReportingWindow::new(date(2025, 1, 1), date(2026, 3, 2)).unwrap();
        let result = CareCalculator::new(&order(WEEKENDS_WITH_FATHER), date(2026, 2, 2), "VIC", &calendar)
            .unwrap()
            .with_window(window)
            .calculate()
            .unwrap();
        assert_eq!(result.window.start, date(2026, 2, 2));
        assert_eq!(result.window.total_nights, 28);
        assert_eq!(result.window.father_nights, 8);
    }

    #[test]
    fn test_window_outside_horizon_uses_first_year() {
        let result = calculate(WEEKENDS_WITH_FATHER, date(2026, 2, 2), date(2025, 1, 1));
        assert_eq!(result.window.start, date(2026, 2, 2));
        assert_eq!(result.window.end, date(2027, 2, 2));
    }

    #[test]
    fn test_unknown_state_only_matters_for_school_holidays() {
        let calendar = SchoolCalendar::builtin().unwrap();
        let plain = CareCalculator::new(&order(WEEKENDS_WITH_FATHER), date(2026, 2, 2), "ZZ", &calendar);
        assert_eq!(plain.unwrap().as_of(date(2027, 2, 1)).calculate().unwrap().state, "ZZ");

        let holidays = order(
            r#"{
                "pattern": { "type": "fixed_weekday_split",
                             "mother": ["mon", "tue", "wed", "thu", "fri", "sat", "sun"] },
                "exceptions": [
                    { "type": "school_holidays", "blocks": ["summer"],
                      "split": { "type": "whole", "parent_rule": { "type": "fixed", "parent": "father" } } }
                ]
            }"#,
        );
        match CareCalculator::new(&holidays, date(2026, 2, 2), "ZZ", &calendar) {
            Err(EngineError::UnknownJurisdiction { code }) => assert_eq!(code, "ZZ"),
            other => panic!("Expected UnknownJurisdiction, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_order_is_rejected_before_projection() {
        let calendar = SchoolCalendar::builtin().unwrap();
        let bad = order(r#"{ "pattern": { "type": "fixed_weekday_split", "mother": ["mon"] } }"#);
        assert!(matches!(
            CareCalculator::new(&bad, date(2026, 2, 2), "VIC", &calendar),
            Err(EngineError::MalformedOrder { .. })
        ));
    }

    #[test]
    fn test_custom_cycle_wraps_to_previous_cycle() {
        let result = calculate(
            r#"{
                "pattern": { "type": "custom_recurrence", "cycle_length_days": 14, "primary_parent": "father",
                             "entries": [ { "day_number": 4, "overnight_care_owner": "father" },
                                          { "day_number": 11, "overnight_care_owner": "mother" } ] }
            }"#,
            date(2026, 3, 2),
            date(2027, 3, 1),
        );

        assert_eq!(owner_on(&result, date(2026, 3, 2)), NightOwner::Mother);
        assert_eq!(owner_on(&result, date(2026, 3, 5)), NightOwner::Father);
        // 26 full cycles
        assert_eq!(result.window.total_nights, 364);
        assert_eq!(result.window.father_nights, 182);
        assert_eq!(result.window.father_percentage, Decimal::new(500, 1));
    }

    #[test]
    fn test_as_of_makes_window_reproducible() {
        let first = calculate(WEEKENDS_WITH_FATHER, date(2026, 2, 2), date(2027, 2, 1));
        let second = calculate(WEEKENDS_WITH_FATHER, date(2026, 2, 2), date(2027, 2, 1));
        assert_eq!(first, second);
        assert_eq!(first.window.start, date(2026, 2, 2));
        assert_eq!(first.window.end, date(2027, 2, 1));
    }

    #[test]
    fn test_summary_feeds_child_care() {
        use crate::models::ChildCare;

        let result = calculate(WEEKENDS_WITH_FATHER, date(2026, 2, 2), date(2027, 2, 1));
        let care = ChildCare::from_care_summary(&result.window, CareParent::Father).unwrap();
        assert_eq!(care.parent_a, Decimal::new(286, 1));
        assert!(care.validate("care").is_ok());
    }
}
