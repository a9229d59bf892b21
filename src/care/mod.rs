//! Court order care calendar calculator.
//!
//! Turns a parsed parenting order into a night-by-night care calendar and the
//! care percentages the formula engine consumes. Orders are validated in
//! full before projection; school holiday exceptions use the per-state term
//! dates in [`SchoolCalendar`].

mod calculator;
mod exceptions;
mod order;
mod pattern;
mod school_holidays;
mod window;

pub use calculator::{CareCalculator, HORIZON_MONTHS, calculate_care_from_order};
pub use exceptions::{ExceptionMatch, ExceptionRule, ResolvedNight, holiday_owner, resolve_night};
pub use order::{ValidatedOrder, parse_weekday};
pub use pattern::{BasePattern, MAX_CYCLE_DAYS, WeekSplit};
pub use school_holidays::{AustralianState, HolidayPeriod, SchoolCalendar, TERMS_PER_YEAR};
pub use window::{ReportingWindow, summarize};
