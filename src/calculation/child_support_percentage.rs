//! Child support percentage calculation (Step 6).

use rust_decimal::Decimal;

use crate::models::AuditStep;

/// The result of the child support percentage step for one child.
#[derive(Debug, Clone)]
pub struct ChildSupportPercentageResult {
    /// Parent A's income percentage less cost percentage.
    pub parent_a: Decimal,
    /// Parent B's income percentage less cost percentage.
    pub parent_b: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates both parents' child support percentages for one child.
///
/// A positive percentage means the parent's share of the cost exceeds the
/// share they meet through care.
///
/// # Example
///
/// ```
/// use child_support_engine::calculation::calculate_child_support_percentage;
/// use rust_decimal::Decimal;
///
/// let result = calculate_child_support_percentage(
///     0, Decimal::from(70), Decimal::from(24), Decimal::from(30), Decimal::from(76), 5,
/// );
/// assert_eq!(result.parent_a, Decimal::from(46));
/// assert_eq!(result.parent_b, Decimal::from(-46));
/// ```
pub fn calculate_child_support_percentage(
    child_index: usize,
    income_percentage_a: Decimal,
    cost_percentage_a: Decimal,
    income_percentage_b: Decimal,
    cost_percentage_b: Decimal,
    step_number: u32,
) -> ChildSupportPercentageResult {
    let parent_a = income_percentage_a - cost_percentage_a;
    let parent_b = income_percentage_b - cost_percentage_b;

    let liable = match (parent_a > Decimal::ZERO, parent_b > Decimal::ZERO) {
        (true, _) => "parent A",
        (_, true) => "parent B",
        _ => "neither parent",
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "child_support_percentage".to_string(),
        rule_name: "Child Support Percentage".to_string(),
        clause_ref: "s 55E".to_string(),
        input: serde_json::json!({
            "child_index": child_index,
            "parent_a_income_percentage": income_percentage_a.normalize().to_string(),
            "parent_a_cost_percentage": cost_percentage_a.normalize().to_string(),
            "parent_b_income_percentage": income_percentage_b.normalize().to_string(),
            "parent_b_cost_percentage": cost_percentage_b.normalize().to_string(),
        }),
        output: serde_json::json!({
            "parent_a_child_support_percentage": parent_a.normalize().to_string(),
            "parent_b_child_support_percentage": parent_b.normalize().to_string(),
        }),
        reasoning: format!(
            "Child {}: parent A {}%, parent B {}%; {} has a positive percentage",
            child_index,
            parent_a.round_dp(2).normalize(),
            parent_b.round_dp(2).normalize(),
            liable
        ),
    };

    ChildSupportPercentageResult {
        parent_a,
        parent_b,
        audit_step,
    }
}
