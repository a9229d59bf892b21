//! Child and care arrangement models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CareParent, CareSummary};
use crate::error::{EngineError, EngineResult};

/// Care totals may differ from 100% by this many percentage points.
pub const CARE_TOTAL_TOLERANCE: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// The period a night count is expressed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarePeriod {
    /// Nights per week.
    Week,
    /// Nights per fortnight.
    Fortnight,
    /// Nights per year.
    Year,
}

impl CarePeriod {
    /// Number of nights in the period.
    pub fn nights(self) -> u32 {
        match self {
            CarePeriod::Week => 7,
            CarePeriod::Fortnight => 14,
            CarePeriod::Year => 365,
        }
    }
}

/// Care percentages for one child.
///
/// `parent_a + parent_b` is 100, or `parent_a + parent_b + non_parent_carer`
/// is 100 when a non-parent carer holds the remaining nights.
///
/// # Example
///
/// ```
/// use child_support_engine::models::{CarePeriod, ChildCare};
/// use rust_decimal::Decimal;
///
/// let care = ChildCare::from_nights(2, 5, CarePeriod::Week).unwrap();
/// assert_eq!(care.parent_a.round_dp(1), Decimal::new(286, 1));
/// assert!(care.validate("children[0].care").is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildCare {
    /// Parent A's care percentage.
    pub parent_a: Decimal,
    /// Parent B's care percentage.
    pub parent_b: Decimal,
    /// A non-parent carer's care percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_parent_carer: Option<Decimal>,
}

impl ChildCare {
    /// Creates care from declared percentages.
    pub fn percentages(parent_a: Decimal, parent_b: Decimal) -> Self {
        Self {
            parent_a,
            parent_b,
            non_parent_carer: None,
        }
    }

    /// Creates care from night counts over a period.
    pub fn from_nights(parent_a: u32, parent_b: u32, period: CarePeriod) -> EngineResult<Self> {
        let nights = period.nights();
        if parent_a + parent_b > nights {
            return Err(EngineError::validation(
                "care",
                format!(
                    "{} nights exceed the {} nights in a {:?}",
                    parent_a + parent_b,
                    nights,
                    period
                ),
            ));
        }
        let to_percentage =
            |n: u32| Decimal::from(n) * Decimal::ONE_HUNDRED / Decimal::from(nights);
        Ok(Self::percentages(to_percentage(parent_a), to_percentage(parent_b)))
    }

    /// Creates care from a projected court order.
    ///
    /// `parent_a_is` names the order parent who is parent A in the assessment.
    /// Summaries containing conflicted nights are rejected until resolved.
    pub fn from_care_summary(summary: &CareSummary, parent_a_is: CareParent) -> EngineResult<Self> {
        if summary.has_conflicts() {
            return Err(EngineError::validation(
                "care",
                format!(
                    "care summary has {} conflicted nights awaiting review",
                    summary.conflict_nights
                ),
            ));
        }
        Ok(Self::percentages(
            summary.percentage_for(parent_a_is),
            summary.percentage_for(parent_a_is.other()),
        ))
    }

    /// Adds a non-parent carer's percentage.
    pub fn with_non_parent_carer(mut self, percentage: Decimal) -> Self {
        self.non_parent_carer = Some(percentage);
        self
    }

    /// Checks every value is within 0..=100 and the total is 100.
    pub fn validate(&self, field: &str) -> EngineResult<()> {
        let values = [
            ("parent_a", Some(self.parent_a)),
            ("parent_b", Some(self.parent_b)),
            ("non_parent_carer", self.non_parent_carer),
        ];
        for (name, value) in values {
            let Some(value) = value else { continue };
            if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
                return Err(EngineError::validation(
                    format!("{field}.{name}"),
                    format!("care of {value}% is outside 0-100%"),
                ));
            }
        }

        let total = self.parent_a + self.parent_b + self.non_parent_carer.unwrap_or_default();
        if (total - Decimal::ONE_HUNDRED).abs() > CARE_TOTAL_TOLERANCE {
            return Err(EngineError::validation(
                field,
                format!("care percentages total {total}%, expected 100%"),
            ));
        }
        Ok(())
    }
}

/// A child in the assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    /// Age in whole years.
    pub age: u8,
    /// Care arrangement.
    pub care: ChildCare,
}

impl Child {
    /// Creates a child.
    pub fn new(age: u8, care: ChildCare) -> Self {
        Self { age, care }
    }

    /// True if the child is in the 13 and over bracket.
    pub fn is_over_13(&self) -> bool {
        self.age >= 13
    }
}
