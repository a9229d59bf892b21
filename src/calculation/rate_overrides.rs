//! Rate rules that replace or adjust the formula liability.
//!
//! Evaluated per parent before netting, in this order:
//! - income support rate for a parent on income support with ATI below the SSA
//! - Fixed Annual Rate for a parent who has not lodged and earns below the PPS maximum
//! - Minimum Annual Rate for a small but positive formula liability

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::YearRates;
use crate::models::{AppliedRate, AuditStep, IncomeStatus, ParentFinancials, RateFlags};

use super::annual_rate::round_cents;
use super::care_cost::{PRIMARY_CARE_THRESHOLD, REGULAR_CARE_THRESHOLD, SHARED_CARE_THRESHOLD};

/// Most cases or children a per-case or per-child rate is paid in full for.
pub const RATE_CASE_LIMIT: usize = 3;

/// A parent's position going into the rate rules.
#[derive(Debug, Clone, Copy)]
pub struct ParentRateInput<'a> {
    /// The parent's circumstances.
    pub parent: &'a ParentFinancials,
    /// Which parent this is, for the audit trail.
    pub label: &'a str,
    /// The parent's rounded care for each child.
    pub rounded_care: &'a [Decimal],
    /// The parent's formula liability for each child.
    pub formula_liabilities: &'a [Decimal],
}

/// The result of applying the rate rules to one parent.
#[derive(Debug, Clone)]
pub struct RateOverrideResult {
    /// Final liability for each child.
    pub liabilities: Vec<Decimal>,
    /// The rate that produced the liabilities.
    pub applied_rate: AppliedRate,
    /// Rules considered.
    pub flags: RateFlags,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Scales a per-case rate when the parent has more than three cases.
///
/// Rounded to the nearest dollar.
pub fn per_case_rate(rate: Decimal, case_count: usize) -> Decimal {
    if case_count <= RATE_CASE_LIMIT {
        return rate;
    }
    (rate * Decimal::from(RATE_CASE_LIMIT) / Decimal::from(case_count))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Splits an amount across children in proportion to weights.
///
/// Equal weights are used when every weight is zero. The last child absorbs
/// any rounding remainder.
pub fn apportion(amount: Decimal, weights: &[Decimal]) -> Vec<Decimal> {
    if weights.is_empty() {
        return Vec::new();
    }
    let weight_sum: Decimal = weights.iter().copied().sum();
    let mut shares: Vec<Decimal> = if weight_sum.is_zero() {
        let count = Decimal::from(weights.len());
        weights.iter().map(|_| round_cents(amount / count)).collect()
    } else {
        weights
            .iter()
            .map(|w| round_cents(amount * w / weight_sum))
            .collect()
    };
    let assigned: Decimal = shares[..shares.len() - 1].iter().copied().sum();
    if let Some(last) = shares.last_mut() {
        *last = amount - assigned;
    }
    shares
}

/// True if the parent qualifies for the income support rate.
pub fn qualifies_for_income_support_rate(parent: &ParentFinancials, rates: &YearRates) -> bool {
    parent.receives_income_support && parent.adjusted_taxable_income() < rates.self_support_amount
}

/// True if the parent qualifies for the Fixed Annual Rate.
pub fn qualifies_for_fixed_annual_rate(parent: &ParentFinancials, rates: &YearRates) -> bool {
    parent.income_status == IncomeStatus::NotLodged
        && !parent.receives_income_support
        && parent.adjusted_taxable_income() < rates.max_parenting_payment_single
}

/// Why a parent is exempt from the Minimum Annual Rate, if they are.
pub fn minimum_rate_exemption(parent: &ParentFinancials, rounded_care: &[Decimal]) -> Option<&'static str> {
    if rounded_care.iter().any(|&care| care >= PRIMARY_CARE_THRESHOLD) {
        Some("parent has at least 65% care of a child")
    } else if parent.cases_at_minimum_rate() >= RATE_CASE_LIMIT {
        Some("parent already pays the minimum rate in three or more other cases")
    } else {
        None
    }
}

/// Applies the rate rules to one parent's formula liabilities.
///
/// # Arguments
///
/// * `input` - The parent's circumstances, care and formula liabilities
/// * `rates` - Rates for the assessment year
/// * `step_number` - The step number for audit trail sequencing
pub fn apply_rate_overrides(
    input: ParentRateInput<'_>,
    rates: &YearRates,
    step_number: u32,
) -> RateOverrideResult {
    let parent = input.parent;
    let formula_total: Decimal = input.formula_liabilities.iter().copied().sum();
    let child_count = input.formula_liabilities.len();
    let mut flags = RateFlags::default();

    let (liabilities, applied_rate, reasoning) = if qualifies_for_income_support_rate(parent, rates) {
        let rate = per_case_rate(rates.income_support_rate_per_case, parent.case_count());
        if input.rounded_care.iter().any(|&care| care >= REGULAR_CARE_THRESHOLD) {
            flags.income_support_negated = true;
            (
                vec![Decimal::ZERO; child_count],
                AppliedRate::Nil,
                format!(
                    "{}: income support rate of ${} negated by at least 14% care of a child",
                    input.label,
                    rate.normalize()
                ),
            )
        } else {
            flags.income_support_rate = true;
            (
                apportion(rate, &vec![Decimal::ONE; child_count]),
                AppliedRate::IncomeSupportRate,
                format!(
                    "{}: on income support with ATI below the self-support amount; ${} for the case",
                    input.label,
                    rate.normalize()
                ),
            )
        }
    } else if qualifies_for_fixed_annual_rate(parent, rates) {
        flags.fixed_annual_rate = true;
        let mut remaining = RATE_CASE_LIMIT;
        let liabilities = input
            .rounded_care
            .iter()
            .zip(input.formula_liabilities)
            .map(|(&care, &formula)| {
                if care < SHARED_CARE_THRESHOLD && remaining > 0 {
                    remaining -= 1;
                    rates.fixed_annual_rate
                } else {
                    formula
                }
            })
            .collect::<Vec<_>>();
        let far_children = RATE_CASE_LIMIT - remaining;
        (
            liabilities,
            AppliedRate::FixedAnnualRate,
            format!(
                "{}: return not lodged and ATI below ${}; fixed annual rate of ${} for {} children",
                input.label,
                rates.max_parenting_payment_single.normalize(),
                rates.fixed_annual_rate.normalize(),
                far_children
            ),
        )
    } else if formula_total > Decimal::ZERO {
        let minimum = per_case_rate(rates.minimum_annual_rate, parent.case_count());
        match minimum_rate_exemption(parent, input.rounded_care) {
            _ if formula_total >= minimum => (
                input.formula_liabilities.to_vec(),
                AppliedRate::Formula,
                format!(
                    "{}: formula liability ${} is at least the minimum annual rate",
                    input.label,
                    formula_total.normalize()
                ),
            ),
            Some(reason) => {
                flags.minimum_rate_exempt = true;
                (
                    input.formula_liabilities.to_vec(),
                    AppliedRate::Formula,
                    format!(
                        "{}: formula liability ${} kept; exempt from the minimum annual rate because {}",
                        input.label,
                        formula_total.normalize(),
                        reason
                    ),
                )
            }
            None => {
                flags.minimum_annual_rate = true;
                (
                    apportion(minimum, input.formula_liabilities),
                    AppliedRate::MinimumAnnualRate,
                    format!(
                        "{}: formula liability ${} raised to the minimum annual rate of ${}",
                        input.label,
                        formula_total.normalize(),
                        minimum.normalize()
                    ),
                )
            }
        }
    } else {
        (
            vec![Decimal::ZERO; child_count],
            AppliedRate::Nil,
            format!("{}: no formula liability", input.label),
        )
    };

    let final_total: Decimal = liabilities.iter().copied().sum();

    let audit_step = AuditStep {
        step_number,
        rule_id: "rate_rules".to_string(),
        rule_name: "Rate Rules".to_string(),
        clause_ref: "ss 66-66B".to_string(),
        input: serde_json::json!({
            "parent": input.label,
            "formula_total": formula_total.normalize().to_string(),
            "receives_income_support": parent.receives_income_support,
            "income_status": parent.income_status,
            "case_count": parent.case_count(),
        }),
        output: serde_json::json!({
            "applied_rate": applied_rate,
            "final_total": final_total.normalize().to_string(),
            "flags": flags,
        }),
        reasoning,
    };

    RateOverrideResult {
        liabilities,
        applied_rate,
        flags,
        audit_step,
    }
}
