//! Care percentage to cost percentage conversion (Step 5).
//!
//! Care is rounded first (below 50% down, 50% and above up) and then
//! converted through the year's [`CareCostTable`].

use rust_decimal::Decimal;

use crate::config::CareCostTable;
use crate::models::AuditStep;

/// Care below this is less than regular care.
pub const REGULAR_CARE_THRESHOLD: Decimal = Decimal::from_parts(14, 0, 0, false, 0);

/// Care at or above this is shared care; also the non-parent carer minimum.
pub const SHARED_CARE_THRESHOLD: Decimal = Decimal::from_parts(35, 0, 0, false, 0);

/// Care at or above this is primary care; exempts a parent from the minimum rate.
pub const PRIMARY_CARE_THRESHOLD: Decimal = Decimal::from_parts(65, 0, 0, false, 0);

const ROUNDING_PIVOT: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// The result of converting one carer's care percentage.
#[derive(Debug, Clone)]
pub struct CostPercentageResult {
    /// Care after rounding.
    pub rounded_care: Decimal,
    /// Cost percentage from the table.
    pub cost_percentage: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Rounds a care percentage: below 50 down to a whole number, 50 and above up.
///
/// # Example
///
/// ```
/// use child_support_engine::calculation::round_care_percentage;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_care_percentage(Decimal::new(349, 1)), Decimal::from(34));
/// assert_eq!(round_care_percentage(Decimal::new(501, 1)), Decimal::from(51));
/// ```
pub fn round_care_percentage(care: Decimal) -> Decimal {
    if care < ROUNDING_PIVOT {
        care.floor()
    } else {
        care.ceil()
    }
}

/// Resolves a rounded care percentage to its cost percentage.
///
/// Uses the last bucket whose lower bound does not exceed `rounded_care`.
///
/// # Example
///
/// ```
/// use child_support_engine::calculation::cost_percentage_for_care;
/// use child_support_engine::config::RateTables;
/// use rust_decimal::Decimal;
///
/// let tables = RateTables::builtin().unwrap();
/// let table = &tables.get(2026).unwrap().care_cost_buckets;
/// assert_eq!(cost_percentage_for_care(table, Decimal::from(13)), Decimal::ZERO);
/// assert_eq!(cost_percentage_for_care(table, Decimal::from(14)), Decimal::from(24));
/// assert_eq!(cost_percentage_for_care(table, Decimal::from(50)), Decimal::from(69));
/// ```
pub fn cost_percentage_for_care(table: &CareCostTable, rounded_care: Decimal) -> Decimal {
    table
        .buckets()
        .iter()
        .rev()
        .find(|bucket| bucket.from_care <= rounded_care)
        .map(|bucket| bucket.base_cost + bucket.per_point * (rounded_care - bucket.from_care))
        .unwrap_or(Decimal::ZERO)
}

/// Describes the care level a rounded percentage falls in.
pub fn care_level(rounded_care: Decimal) -> &'static str {
    if rounded_care < REGULAR_CARE_THRESHOLD {
        "below regular care"
    } else if rounded_care < SHARED_CARE_THRESHOLD {
        "regular care"
    } else if rounded_care <= PRIMARY_CARE_THRESHOLD {
        "shared care"
    } else if rounded_care < Decimal::from(87) {
        "primary care"
    } else {
        "above primary care"
    }
}

/// Rounds a carer's care percentage and converts it to a cost percentage.
///
/// # Arguments
///
/// * `care` - Care percentage as supplied
/// * `table` - The year's care to cost table
/// * `carer` - Label for the audit step (e.g. "parent_a")
/// * `child_index` - Index of the child in the assessment
/// * `step_number` - The step number for audit trail sequencing
pub fn calculate_cost_percentage(
    care: Decimal,
    table: &CareCostTable,
    carer: &str,
    child_index: usize,
    step_number: u32,
) -> CostPercentageResult {
    let rounded_care = round_care_percentage(care);
    let cost_percentage = cost_percentage_for_care(table, rounded_care);

    let audit_step = AuditStep {
        step_number,
        rule_id: "cost_percentage".to_string(),
        rule_name: "Cost Percentage".to_string(),
        clause_ref: "s 55C".to_string(),
        input: serde_json::json!({
            "child_index": child_index,
            "carer": carer,
            "care_percentage": care.normalize().to_string(),
        }),
        output: serde_json::json!({
            "rounded_care": rounded_care.normalize().to_string(),
            "cost_percentage": cost_percentage.normalize().to_string(),
        }),
        reasoning: format!(
            "Child {} {}: {}% care rounds to {}% ({}), cost percentage {}%",
            child_index,
            carer,
            care.normalize(),
            rounded_care.normalize(),
            care_level(rounded_care),
            cost_percentage.normalize()
        ),
    };

    CostPercentageResult {
        rounded_care,
        cost_percentage,
        audit_step,
    }
}
