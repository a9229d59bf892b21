//! Multi-case adjustment (Step 8).
//!
//! A parent with children in other child support cases has part of their
//! income set aside for those children (the multi-case allowance) and their
//! liability for each child in this case limited by a multi-case cap.

use std::fmt::Debug;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::CostOfChildrenTable;

use super::cost_of_children::cost_for_ages;

/// Strategy for apportioning a parent's income across their cases.
pub trait MultiCaseStrategy: Debug + Send + Sync {
    /// Short identifier used in audit steps.
    fn name(&self) -> &'static str;

    /// Amount deducted from the parent's income for their other cases.
    ///
    /// `income` is the parent's adjusted taxable income less the self-support
    /// amount.
    fn allowance(
        &self,
        table: &CostOfChildrenTable,
        income: Decimal,
        case_ages: &[u8],
        other_case_ages: &[u8],
    ) -> Decimal;

    /// Cost of one child in this case used for the multi-case cap.
    ///
    /// `income` is the parent's income after the relevant dependant amount.
    fn cap_cost(
        &self,
        table: &CostOfChildrenTable,
        income: Decimal,
        case_ages: &[u8],
        other_case_ages: &[u8],
        child_age: u8,
    ) -> Decimal;
}

/// Apportions by treating every child as if they were the same age.
///
/// A child's share is the cost of all the parent's children at that child's
/// age, divided by the number of children.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameAgeApportionment;

impl SameAgeApportionment {
    fn per_child_cost(
        table: &CostOfChildrenTable,
        income: Decimal,
        total_children: usize,
        age: u8,
    ) -> Decimal {
        if total_children == 0 || income <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let same_age = vec![age; total_children];
        cost_for_ages(table, &same_age, income).total / Decimal::from(total_children)
    }
}

impl MultiCaseStrategy for SameAgeApportionment {
    fn name(&self) -> &'static str {
        "same_age_apportionment"
    }

    fn allowance(
        &self,
        table: &CostOfChildrenTable,
        income: Decimal,
        case_ages: &[u8],
        other_case_ages: &[u8],
    ) -> Decimal {
        let total_children = case_ages.len() + other_case_ages.len();
        other_case_ages
            .iter()
            .map(|&age| Self::per_child_cost(table, income, total_children, age))
            .sum::<Decimal>()
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }

    fn cap_cost(
        &self,
        table: &CostOfChildrenTable,
        income: Decimal,
        case_ages: &[u8],
        other_case_ages: &[u8],
        child_age: u8,
    ) -> Decimal {
        let total_children = case_ages.len() + other_case_ages.len();
        Self::per_child_cost(table, income, total_children, child_age)
    }
}

/// Multi-case cap for one child: `cap_cost x (100 - cost%) / 100`, never negative.
///
/// Rounded to the nearest dollar.
pub fn multi_case_cap(cap_cost: Decimal, cost_percentage: Decimal) -> Decimal {
    let share = (Decimal::ONE_HUNDRED - cost_percentage).max(Decimal::ZERO) / Decimal::ONE_HUNDRED;
    (cap_cost * share).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
