//! Child support income calculation (Steps 1 and 2).
//!
//! A parent's child support income is their adjusted taxable income less the
//! self-support amount, the relevant dependant amount and the multi-case
//! allowance, floored at zero.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::YearRates;
use crate::models::{AuditStep, ParentFinancials};

use super::cost_of_children::{cost_for_ages, virtual_dependent_ages};
use super::multi_case::MultiCaseStrategy;

/// The result of a parent's child support income calculation.
#[derive(Debug, Clone)]
pub struct ChildSupportIncomeResult {
    /// Taxable income plus add-backs.
    pub adjusted_taxable_income: Decimal,
    /// Self-support amount deducted.
    pub self_support_amount: Decimal,
    /// Cost of the parent's relevant dependants.
    pub relevant_dependent_amount: Decimal,
    /// Allowance for the parent's other cases.
    pub multi_case_allowance: Decimal,
    /// Income after the self-support and relevant dependant amounts; used for the multi-case cap.
    pub preliminary_income: Decimal,
    /// Child support income.
    pub child_support_income: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates one parent's child support income.
///
/// # Arguments
///
/// * `parent` - The parent's financial circumstances
/// * `label` - Which parent this is, for the audit trail
/// * `case_ages` - Ages of the children in this assessment
/// * `rates` - Rates for the assessment year
/// * `strategy` - Multi-case apportionment strategy
/// * `step_number` - The step number for audit trail sequencing
///
/// # Example
///
/// ```
/// use child_support_engine::calculation::{SameAgeApportionment, calculate_child_support_income};
/// use child_support_engine::config::RateTables;
/// use child_support_engine::models::ParentFinancials;
/// use rust_decimal::Decimal;
///
/// let tables = RateTables::builtin().unwrap();
/// let rates = tables.get(2026).unwrap();
/// let parent = ParentFinancials::new(Decimal::from(80_000));
///
/// let result = calculate_child_support_income(
///     &parent, "parent_a", &[10], rates, &SameAgeApportionment, 1,
/// );
/// assert_eq!(result.child_support_income, Decimal::from(48_954));
/// ```
pub fn calculate_child_support_income(
    parent: &ParentFinancials,
    label: &str,
    case_ages: &[u8],
    rates: &YearRates,
    strategy: &dyn MultiCaseStrategy,
    step_number: u32,
) -> ChildSupportIncomeResult {
    let table = &rates.cost_of_children;
    let adjusted_taxable_income = parent.adjusted_taxable_income();
    let self_support_amount = rates.self_support_amount;
    let income_after_ssa = (adjusted_taxable_income - self_support_amount).max(Decimal::ZERO);

    let dependants = parent.relevant_dependents;
    let dependant_ages = virtual_dependent_ages(dependants.under_13, dependants.over_13);
    let relevant_dependent_amount = cost_for_ages(table, &dependant_ages, income_after_ssa)
        .total
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    let other_case_ages: Vec<u8> = parent.other_case_children().collect();
    let multi_case_allowance = strategy.allowance(table, income_after_ssa, case_ages, &other_case_ages);

    let preliminary_income = (income_after_ssa - relevant_dependent_amount).max(Decimal::ZERO);
    let child_support_income = (preliminary_income - multi_case_allowance).max(Decimal::ZERO);

    tracing::debug!(
        parent = label,
        ati = %adjusted_taxable_income,
        csi = %child_support_income,
        "calculated child support income"
    );

    let audit_step = AuditStep {
        step_number,
        rule_id: "child_support_income".to_string(),
        rule_name: "Child Support Income".to_string(),
        clause_ref: "s 43".to_string(),
        input: serde_json::json!({
            "parent": label,
            "taxable_income": parent.taxable_income.normalize().to_string(),
            "adjusted_taxable_income": adjusted_taxable_income.normalize().to_string(),
            "self_support_amount": self_support_amount.normalize().to_string(),
            "relevant_dependents": {
                "under_13": dependants.under_13,
                "over_13": dependants.over_13,
            },
            "other_case_children": other_case_ages,
            "multi_case_strategy": strategy.name(),
        }),
        output: serde_json::json!({
            "relevant_dependent_amount": relevant_dependent_amount.normalize().to_string(),
            "multi_case_allowance": multi_case_allowance.normalize().to_string(),
            "child_support_income": child_support_income.normalize().to_string(),
        }),
        reasoning: format!(
            "{}: max(0, ${} - ${} SSA - ${} dependants - ${} multi-case) = ${}",
            label,
            adjusted_taxable_income.normalize(),
            self_support_amount.normalize(),
            relevant_dependent_amount.normalize(),
            multi_case_allowance.normalize(),
            child_support_income.normalize()
        ),
    };

    ChildSupportIncomeResult {
        adjusted_taxable_income,
        self_support_amount,
        relevant_dependent_amount,
        multi_case_allowance,
        preliminary_income,
        child_support_income,
        audit_step,
    }
}
