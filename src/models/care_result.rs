//! Care calendar result models.
//!
//! A [`CareCalculationResult`] holds the night-by-night projection of a
//! court order together with the aggregated care percentages.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CareParent;

/// Who holds care for one night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NightOwner {
    /// The mother.
    Mother,
    /// The father.
    Father,
    /// Two equally specific exceptions disagree; needs manual review.
    Conflict,
}

impl From<CareParent> for NightOwner {
    fn from(parent: CareParent) -> Self {
        match parent {
            CareParent::Mother => NightOwner::Mother,
            CareParent::Father => NightOwner::Father,
        }
    }
}

impl NightOwner {
    /// Returns the parent, or `None` for a conflicted night.
    pub fn parent(self) -> Option<CareParent> {
        match self {
            NightOwner::Mother => Some(CareParent::Mother),
            NightOwner::Father => Some(CareParent::Father),
            NightOwner::Conflict => None,
        }
    }
}

/// The rule that decided a night.
///
/// Variants are ordered from least to most specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentSource {
    /// The recurring base pattern.
    BasePattern,
    /// A school holiday rule.
    SchoolHolidays,
    /// An annual special occasion.
    AnnualDates,
    /// An explicit one-off date range.
    DateRange,
}

/// The assignment of a single night.
///
/// `date` is the evening the night begins; the owner is the parent the child
/// wakes with the following morning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAssignment {
    /// Evening the night begins.
    pub date: NaiveDate,
    /// Who holds the night.
    pub owner: NightOwner,
    /// Which rule decided it.
    pub source: AssignmentSource,
    /// Label of the deciding exception, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Night counts and percentages over a date range.
///
/// Percentages are rounded to one decimal place, half away from zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareSummary {
    /// First night counted.
    pub start: NaiveDate,
    /// Day after the last night counted.
    pub end: NaiveDate,
    /// Nights in the range.
    pub total_nights: u32,
    /// Nights with the mother.
    pub mother_nights: u32,
    /// Nights with the father.
    pub father_nights: u32,
    /// Conflicted nights.
    pub conflict_nights: u32,
    /// Mother's share of nights.
    pub mother_percentage: Decimal,
    /// Father's share of nights.
    pub father_percentage: Decimal,
    /// Conflicted share of nights.
    pub conflict_percentage: Decimal,
    /// Mother's nights scaled to a 365-night year.
    pub mother_nights_per_year: Decimal,
    /// Father's nights scaled to a 365-night year.
    pub father_nights_per_year: Decimal,
}

impl CareSummary {
    /// Returns the care percentage of one parent.
    pub fn percentage_for(&self, parent: CareParent) -> Decimal {
        match parent {
            CareParent::Mother => self.mother_percentage,
            CareParent::Father => self.father_percentage,
        }
    }

    /// Returns true if any night in the range is conflicted.
    pub fn has_conflicts(&self) -> bool {
        self.conflict_nights > 0
    }
}

/// First owner of a labelled exception in a calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayAssignment {
    /// Exception label, e.g. "Christmas" or "Summer Holidays".
    pub event: String,
    /// Calendar year of the first night.
    pub year: i32,
    /// Who holds the first night.
    pub care_with: NightOwner,
}

/// A non-fatal issue found while projecting an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
    /// Nights affected.
    pub dates: Vec<NaiveDate>,
}

/// The full output of a care calendar calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareCalculationResult {
    /// Anchor the horizon starts on.
    pub anchor: NaiveDate,
    /// State or territory used for school holidays.
    pub state: String,
    /// Every night of the horizon, in date order.
    pub assignments: Vec<DayAssignment>,
    /// Totals over the whole horizon.
    pub horizon: CareSummary,
    /// Totals over the reporting window.
    pub window: CareSummary,
    /// First owner per labelled exception and year.
    pub holiday_assignments: Vec<HolidayAssignment>,
    /// Conflicts and other findings needing review.
    pub warnings: Vec<CareWarning>,
}

impl CareCalculationResult {
    /// Returns true if the result needs manual review before use.
    pub fn requires_review(&self) -> bool {
        !self.warnings.is_empty()
    }
}
