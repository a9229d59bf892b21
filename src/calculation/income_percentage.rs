//! Combined income and income percentage calculation (Steps 2 and 3).

use rust_decimal::Decimal;

use crate::models::AuditStep;

/// The result of the income percentage step.
#[derive(Debug, Clone)]
pub struct IncomePercentageResult {
    /// Sum of both parents' child support income.
    pub combined_income: Decimal,
    /// Parent A's share of the combined income.
    pub parent_a: Decimal,
    /// Parent B's share of the combined income.
    pub parent_b: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates each parent's share of the combined child support income.
///
/// When the combined income is zero both shares are zero.
///
/// # Example
///
/// ```
/// use child_support_engine::calculation::calculate_income_percentages;
/// use rust_decimal::Decimal;
///
/// let result = calculate_income_percentages(Decimal::from(75_000), Decimal::from(25_000), 3);
/// assert_eq!(result.combined_income, Decimal::from(100_000));
/// assert_eq!(result.parent_a, Decimal::from(75));
/// assert_eq!(result.parent_b, Decimal::from(25));
/// ```
pub fn calculate_income_percentages(
    income_a: Decimal,
    income_b: Decimal,
    step_number: u32,
) -> IncomePercentageResult {
    let combined_income = income_a + income_b;

    let (parent_a, parent_b) = if combined_income.is_zero() {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        let parent_a = income_a * Decimal::ONE_HUNDRED / combined_income;
        (parent_a, Decimal::ONE_HUNDRED - parent_a)
    };

    let reasoning = if combined_income.is_zero() {
        "Combined child support income is $0; both income percentages are 0%".to_string()
    } else {
        format!(
            "Combined income ${}: parent A {}%, parent B {}%",
            combined_income.normalize(),
            parent_a.round_dp(2).normalize(),
            parent_b.round_dp(2).normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "income_percentage".to_string(),
        rule_name: "Income Percentage".to_string(),
        clause_ref: "s 55B".to_string(),
        input: serde_json::json!({
            "parent_a_child_support_income": income_a.normalize().to_string(),
            "parent_b_child_support_income": income_b.normalize().to_string(),
        }),
        output: serde_json::json!({
            "combined_child_support_income": combined_income.normalize().to_string(),
            "parent_a_income_percentage": parent_a.normalize().to_string(),
            "parent_b_income_percentage": parent_b.normalize().to_string(),
        }),
        reasoning,
    };

    IncomePercentageResult {
        combined_income,
        parent_a,
        parent_b,
        audit_step,
    }
}
