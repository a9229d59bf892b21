//! Family Tax Benefit impact estimates.
//!
//! Child support received reduces FTB Part A under the maintenance income
//! test; child support paid is deducted from the payer's income for the
//! FTB Part B income test.

use rust_decimal::Decimal;

use crate::config::FamilyTaxBenefitLimits;
use crate::models::{AuditStep, FtbImpact, PartBEligibility, Payer, PaymentSummary};

use super::annual_rate::round_cents;

/// Estimated annual FTB Part A reduction from child support received.
///
/// # Example
///
/// ```
/// use child_support_engine::calculation::part_a_reduction;
/// use child_support_engine::config::RateTables;
/// use rust_decimal::Decimal;
///
/// let tables = RateTables::builtin().unwrap();
/// let limits = &tables.get(2026).unwrap().family_tax_benefit;
///
/// // (10,000 - (2,003.85 + 667.95)) x 0.5
/// let reduction = part_a_reduction(Decimal::from(10_000), 2, Decimal::from(60_000), limits);
/// assert_eq!(reduction, Decimal::new(366410, 2));
/// ```
pub fn part_a_reduction(
    child_support_received: Decimal,
    child_count: usize,
    receiver_income: Decimal,
    limits: &FamilyTaxBenefitLimits,
) -> Decimal {
    if receiver_income > limits.part_a_cutoff_estimate {
        return Decimal::ZERO;
    }
    let extra_children = Decimal::from(child_count.saturating_sub(1));
    let free_area = limits.mifa_base + limits.mifa_additional_child * extra_children;
    round_cents(((child_support_received - free_area) * limits.maintenance_taper).max(Decimal::ZERO))
}

/// FTB Part B eligibility of the payer after deducting child support paid.
pub fn part_b_eligibility(
    child_support_paid: Decimal,
    payer_income: Decimal,
    limits: &FamilyTaxBenefitLimits,
) -> PartBEligibility {
    let adjusted_income = payer_income - child_support_paid;
    let limit = limits.part_b_primary_limit;
    if adjusted_income >= limit {
        PartBEligibility::Ineligible
    } else if payer_income > limit {
        PartBEligibility::EligibleViaDeduction
    } else {
        PartBEligibility::Eligible
    }
}

/// The result of the FTB impact step.
#[derive(Debug, Clone)]
pub struct FtbImpactResult {
    /// The estimated impact.
    pub impact: FtbImpact,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Estimates the FTB effects of the net payment.
///
/// # Arguments
///
/// * `payment` - The netted payment
/// * `income_a` - Parent A's adjusted taxable income
/// * `income_b` - Parent B's adjusted taxable income
/// * `child_count` - Children in the assessment
/// * `limits` - FTB limits for the year
/// * `step_number` - The step number for audit trail sequencing
pub fn calculate_ftb_impact(
    payment: &PaymentSummary,
    income_a: Decimal,
    income_b: Decimal,
    child_count: usize,
    limits: &FamilyTaxBenefitLimits,
    step_number: u32,
) -> FtbImpactResult {
    let (payer_income, receiver_income) = match payment.payer {
        Payer::ParentA => (Some(income_a), Some(income_b)),
        Payer::ParentB => (Some(income_b), Some(income_a)),
        Payer::Neither => (None, None),
    };

    let receiver_part_a_reduction = receiver_income
        .map(|income| part_a_reduction(payment.annual_amount, child_count, income, limits))
        .unwrap_or(Decimal::ZERO);
    let payer_part_b =
        payer_income.map(|income| part_b_eligibility(payment.annual_amount, income, limits));

    let impact = FtbImpact {
        receiver_part_a_reduction,
        payer_part_b,
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "ftb_impact".to_string(),
        rule_name: "Family Tax Benefit Impact".to_string(),
        clause_ref: "FTB maintenance income test".to_string(),
        input: serde_json::json!({
            "payer": payment.payer,
            "annual_amount": payment.annual_amount.normalize().to_string(),
            "child_count": child_count,
        }),
        output: serde_json::json!({
            "receiver_part_a_reduction": receiver_part_a_reduction.normalize().to_string(),
            "payer_part_b": payer_part_b,
        }),
        reasoning: match payer_part_b {
            Some(part_b) => format!(
                "Receiver loses an estimated ${} of FTB Part A; payer Part B eligibility: {:?}",
                receiver_part_a_reduction.normalize(),
                part_b
            ),
            None => "No child support is paid between the parents; no FTB impact".to_string(),
        },
    };

    FtbImpactResult { impact, audit_step }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateTables;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn limits() -> FamilyTaxBenefitLimits {
        RateTables::builtin()
            .unwrap()
            .get(2026)
            .unwrap()
            .family_tax_benefit
            .clone()
    }

    fn payment(payer: Payer, amount: &str) -> PaymentSummary {
        PaymentSummary {
            payer,
            receiver: payer.counterpart(),
            annual_amount: dec(amount),
            parent_a_total: dec(amount),
            parent_b_total: Decimal::ZERO,
            payments_to_non_parent_carer: Decimal::ZERO,
        }
    }

    #[test]
    fn test_part_a_reduction_below_free_area_is_zero() {
        assert_eq!(part_a_reduction(dec("1500"), 1, dec("50000"), &limits()), Decimal::ZERO);
    }

    #[test]
    fn test_part_a_reduction_zero_above_cutoff() {
        assert_eq!(part_a_reduction(dec("20000"), 1, dec("150000"), &limits()), Decimal::ZERO);
    }

    #[test]
    fn test_part_a_reduction_one_child() {
        // (8,000 - 2,003.85) x 0.5
        assert_eq!(part_a_reduction(dec("8000"), 1, dec("50000"), &limits()), dec("2998.08"));
    }

    #[test]
    fn test_part_b_eligible_via_deduction() {
        assert_eq!(
            part_b_eligibility(dec("15000"), dec("130000"), &limits()),
            PartBEligibility::EligibleViaDeduction
        );
    }

    #[test]
    fn test_part_b_eligible() {
        assert_eq!(
            part_b_eligibility(dec("5000"), dec("100000"), &limits()),
            PartBEligibility::Eligible
        );
    }

    #[test]
    fn test_part_b_ineligible() {
        assert_eq!(
            part_b_eligibility(dec("5000"), dec("200000"), &limits()),
            PartBEligibility::Ineligible
        );
    }

    #[test]
    fn test_ftb_impact_uses_receiver_income() {
        let result = calculate_ftb_impact(&payment(Payer::ParentA, "8000"), dec("80000"), dec("50000"), 1, &limits(), 9);
        assert_eq!(result.impact.receiver_part_a_reduction, dec("2998.08"));
        assert_eq!(result.impact.payer_part_b, Some(PartBEligibility::Eligible));
    }

    #[test]
    fn test_ftb_impact_without_payment() {
        let result = calculate_ftb_impact(&payment(Payer::Neither, "0"), dec("80000"), dec("80000"), 1, &limits(), 9);
        assert_eq!(result.impact.receiver_part_a_reduction, Decimal::ZERO);
        assert_eq!(result.impact.payer_part_b, None);
    }
}
