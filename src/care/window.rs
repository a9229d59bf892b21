//! Reporting windows and night aggregation.

use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{CareSummary, DayAssignment, NightOwner};

/// Nights in a standard year, for the nights-per-year averages.
const NIGHTS_PER_YEAR: u32 = 365;

/// A half-open range of nights, `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingWindow {
    /// First night counted.
    pub start: NaiveDate,
    /// Day after the last night counted.
    pub end: NaiveDate,
}

impl ReportingWindow {
    /// Creates a window.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `end` is not after `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        if end <= start {
            return Err(EngineError::validation(
                "window",
                format!("window end {end} must be after start {start}"),
            ));
        }
        Ok(Self { start, end })
    }

    /// The twelve months of nights ending the night before `as_of`.
    pub fn trailing_year(as_of: NaiveDate) -> Self {
        let start = as_of.checked_sub_months(Months::new(12)).unwrap_or(as_of);
        Self { start, end: as_of }
    }

    /// The twelve months of nights starting on `start`.
    pub fn year_from(start: NaiveDate) -> Self {
        let end = start.checked_add_months(Months::new(12)).unwrap_or(start);
        Self { start, end }
    }

    /// Nights in the window.
    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Returns true if the window holds no nights.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Returns true if the night beginning `date` is in the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// The part of this window inside `bounds`; empty if they do not overlap.
    pub fn clamp_to(&self, bounds: &ReportingWindow) -> Self {
        let start = self.start.max(bounds.start);
        let end = self.end.min(bounds.end).max(start);
        Self { start, end }
    }
}

fn share(nights: u32, total: u32, scale: u32) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(nights) * Decimal::from(scale) / Decimal::from(total))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Counts nights by owner within `window`.
///
/// # Example
///
/// ```
/// use child_support_engine::care::{ReportingWindow, summarize};
/// use child_support_engine::models::{AssignmentSource, DayAssignment, NightOwner};
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
/// let nights: Vec<DayAssignment> = (0..3)
///     .map(|i| DayAssignment {
///         date: start + chrono::Duration::days(i),
///         owner: if i == 0 { NightOwner::Father } else { NightOwner::Mother },
///         source: AssignmentSource::BasePattern,
///         label: None,
///     })
///     .collect();
///
/// let window = ReportingWindow::new(start, start + chrono::Duration::days(3)).unwrap();
/// let summary = summarize(&nights, &window);
/// assert_eq!(summary.mother_nights, 2);
/// assert_eq!(summary.mother_percentage.to_string(), "66.7");
/// assert_eq!(summary.father_percentage.to_string(), "33.3");
/// ```
pub fn summarize(assignments: &[DayAssignment], window: &ReportingWindow) -> CareSummary {
    let (mut mother, mut father, mut conflict) = (0u32, 0u32, 0u32);
    for assignment in assignments.iter().filter(|a| window.contains(a.date)) {
        match assignment.owner {
            NightOwner::Mother => mother += 1,
            NightOwner::Father => father += 1,
            NightOwner::Conflict => conflict += 1,
        }
    }
    let total = mother + father + conflict;

    CareSummary {
        start: window.start,
        end: window.end,
        total_nights: total,
        mother_nights: mother,
        father_nights: father,
        conflict_nights: conflict,
        mother_percentage: share(mother, total, 100),
        father_percentage: share(father, total, 100),
        conflict_percentage: share(conflict, total, 100),
        mother_nights_per_year: share(mother, total, NIGHTS_PER_YEAR),
        father_nights_per_year: share(father, total, NIGHTS_PER_YEAR),
    }
}
