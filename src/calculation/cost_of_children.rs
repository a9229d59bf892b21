//! Cost of children calculation (Step 4).
//!
//! The cost is looked up in the year's income-banded table by combined child
//! support income, age group and number of children, then apportioned across
//! the children.

use rust_decimal::Decimal;

use crate::config::{COST_BAND_COUNT, CostBand, CostOfChildrenTable};
use crate::models::{AgeGroup, AuditStep, CostBandInfo};

/// Children aged this and over are in the older bracket.
pub const OLDER_BRACKET_AGE: u8 = 13;

/// Child counts above this use the three-or-more table.
pub const MAX_COUNTED_CHILDREN: usize = 3;

/// Representative age of an under-13 virtual child.
pub const VIRTUAL_UNDER_13_AGE: u8 = 6;

/// Representative age of a 13-and-over virtual child.
pub const VIRTUAL_OVER_13_AGE: u8 = 14;

/// A table lookup for a group of children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostLookup {
    /// Total cost of the group.
    pub total: Decimal,
    /// Where the lookup landed.
    pub band: CostBandInfo,
}

/// The result of the cost of children step.
#[derive(Debug, Clone)]
pub struct CostOfChildrenResult {
    /// Total cost of the assessed children.
    pub total: Decimal,
    /// Each child's share, in input order.
    pub per_child: Vec<Decimal>,
    /// Where the lookup landed.
    pub band: CostBandInfo,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Determines the age group of a set of children.
///
/// A single child is never mixed.
pub fn age_group(ages: &[u8]) -> AgeGroup {
    let older = ages.iter().filter(|&&age| age >= OLDER_BRACKET_AGE).count();
    if older == 0 {
        AgeGroup::Under13
    } else if older == ages.len() {
        AgeGroup::Over13
    } else {
        AgeGroup::Mixed
    }
}

fn band_parameters(table: &CostOfChildrenTable, group: AgeGroup, count: usize) -> &CostBand {
    let single = match group {
        AgeGroup::Under13 => &table.under_13,
        AgeGroup::Over13 => &table.over_13,
        AgeGroup::Mixed => {
            return if count >= MAX_COUNTED_CHILDREN {
                &table.mixed.three_or_more
            } else {
                &table.mixed.two_children
            };
        }
    };
    match count {
        0 | 1 => &single.one_child,
        2 => &single.two_children,
        _ => &single.three_or_more,
    }
}

/// Looks up the cost of a group of children at a given income.
///
/// An empty group costs nothing.
///
/// # Example
///
/// ```
/// use child_support_engine::calculation::cost_for_ages;
/// use child_support_engine::config::RateTables;
/// use rust_decimal::Decimal;
///
/// let tables = RateTables::builtin().unwrap();
/// let table = &tables.get(2026).unwrap().cost_of_children;
///
/// // One child aged 10 at $67,908: 7,917 + (67,908 - 46,569) x 0.15
/// let lookup = cost_for_ages(table, &[10], Decimal::from(67_908));
/// assert_eq!(lookup.total, Decimal::new(1111785, 2));
/// assert_eq!(lookup.band.band_index, 1);
/// ```
pub fn cost_for_ages(table: &CostOfChildrenTable, ages: &[u8], income: Decimal) -> CostLookup {
    let group = age_group(ages);
    let count = ages.len().min(MAX_COUNTED_CHILDREN);
    let params = band_parameters(table, group, count);
    let thresholds = &table.band_thresholds;
    let income = income.max(Decimal::ZERO);

    let band_index = thresholds
        .iter()
        .position(|&threshold| income <= threshold)
        .unwrap_or(thresholds.len());
    let band_start = match band_index {
        0 => Decimal::ZERO,
        i => thresholds[i - 1],
    };

    let (total, base, rate, band_end) = if ages.is_empty() {
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, thresholds.get(band_index).copied())
    } else if band_index >= COST_BAND_COUNT {
        (params.max, params.max, Decimal::ZERO, None)
    } else {
        let base = params.bases[band_index];
        let rate = params.percentages[band_index];
        let total = (base + (income - band_start) * rate).min(params.max);
        (total, base, rate, Some(thresholds[band_index]))
    };

    CostLookup {
        total,
        band: CostBandInfo {
            age_group: group,
            child_count: count as u8,
            band_index,
            band_start,
            band_end,
            base,
            rate,
        },
    }
}

/// Splits a group's total cost across its children.
///
/// Each child's weight is the cost of the same number of children all in
/// that child's bracket; uniform groups split equally. The last child absorbs
/// any rounding remainder so the shares sum to `total`.
pub fn apportion_cost(
    table: &CostOfChildrenTable,
    ages: &[u8],
    income: Decimal,
    total: Decimal,
) -> Vec<Decimal> {
    if ages.is_empty() {
        return Vec::new();
    }

    let weights: Vec<Decimal> = match age_group(ages) {
        AgeGroup::Mixed => {
            let count = ages.len();
            let under = cost_for_ages(table, &vec![0; count], income).total;
            let over = cost_for_ages(table, &vec![OLDER_BRACKET_AGE; count], income).total;
            ages.iter()
                .map(|&age| if age >= OLDER_BRACKET_AGE { over } else { under })
                .collect()
        }
        _ => vec![Decimal::ONE; ages.len()],
    };
    let weight_sum: Decimal = weights.iter().copied().sum();

    let mut shares: Vec<Decimal> = if weight_sum.is_zero() {
        let count = Decimal::from(ages.len());
        ages.iter().map(|_| (total / count).round_dp(2)).collect()
    } else {
        weights
            .iter()
            .map(|weight| (total * weight / weight_sum).round_dp(2))
            .collect()
    };

    let assigned: Decimal = shares[..shares.len() - 1].iter().copied().sum();
    if let Some(last) = shares.last_mut() {
        *last = total - assigned;
    }
    shares
}

/// Calculates the cost of the assessed children at the combined income.
///
/// # Arguments
///
/// * `table` - The year's cost of children table
/// * `ages` - Ages of the assessed children
/// * `combined_income` - Combined child support income
/// * `step_number` - The step number for audit trail sequencing
pub fn calculate_cost_of_children(
    table: &CostOfChildrenTable,
    ages: &[u8],
    combined_income: Decimal,
    step_number: u32,
) -> CostOfChildrenResult {
    let lookup = cost_for_ages(table, ages, combined_income);
    let per_child = apportion_cost(table, ages, combined_income, lookup.total);
    let band = lookup.band;

    let band_description = match band.band_end {
        Some(end) if band.rate > Decimal::ZERO => format!(
            "${} + (${} - ${}) x {} (band {} ending ${})",
            band.base.normalize(),
            combined_income.normalize(),
            band.band_start.normalize(),
            band.rate.normalize(),
            band.band_index + 1,
            end.normalize()
        ),
        _ => format!("maximum ${}", band.base.normalize()),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "cost_of_children".to_string(),
        rule_name: "Cost of Children".to_string(),
        clause_ref: "s 55D".to_string(),
        input: serde_json::json!({
            "combined_child_support_income": combined_income.normalize().to_string(),
            "ages": ages,
            "age_group": band.age_group,
            "child_count": band.child_count,
        }),
        output: serde_json::json!({
            "total_cost": lookup.total.normalize().to_string(),
            "per_child": per_child.iter().map(|c| c.normalize().to_string()).collect::<Vec<_>>(),
            "band_index": band.band_index,
        }),
        reasoning: format!(
            "Cost of {} children ({:?}): {} = ${}",
            ages.len(),
            band.age_group,
            band_description,
            lookup.total.normalize()
        ),
    };

    CostOfChildrenResult {
        total: lookup.total,
        per_child,
        band,
        audit_step,
    }
}

/// Ages of the virtual children standing in for relevant dependants.
pub fn virtual_dependent_ages(under_13: u8, over_13: u8) -> Vec<u8> {
    std::iter::repeat_n(VIRTUAL_UNDER_13_AGE, usize::from(under_13))
        .chain(std::iter::repeat_n(VIRTUAL_OVER_13_AGE, usize::from(over_13)))
        .collect()
}
