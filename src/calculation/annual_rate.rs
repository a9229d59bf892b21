//! Annual rate calculation (Step 7).
//!
//! Each parent with a positive child support percentage is liable for that
//! share of the child's cost. Liabilities may be paid in part to a non-parent
//! carer; the remainder is netted between the parents.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{AuditStep, Payer, PaymentSummary};

use super::care_cost::SHARED_CARE_THRESHOLD;

/// Rounds a dollar amount to cents, half away from zero.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// A parent's formula liability for one child.
///
/// Zero unless the child support percentage is positive.
///
/// # Example
///
/// ```
/// use child_support_engine::calculation::child_liability;
/// use rust_decimal::Decimal;
///
/// let liability = child_liability(Decimal::new(4625, 2), Decimal::from(12_000));
/// assert_eq!(liability, Decimal::from(5_550));
/// assert_eq!(child_liability(Decimal::from(-10), Decimal::from(12_000)), Decimal::ZERO);
/// ```
pub fn child_liability(child_support_percentage: Decimal, cost_of_child: Decimal) -> Decimal {
    if child_support_percentage <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_cents(child_support_percentage / Decimal::ONE_HUNDRED * cost_of_child)
}

/// A carer who may receive a payer's liability for one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recipient {
    /// Care after rounding.
    pub rounded_care: Decimal,
    /// Cost percentage from the care table.
    pub cost_percentage: Decimal,
}

/// Splits a liability between the other parent and a non-parent carer.
///
/// Returns `(to_other_parent, to_non_parent_carer)`. When the carer has at
/// least 35% care the liability is shared, by cost percentage, among the
/// carers with at least 35% care; otherwise the other parent receives it all.
pub fn split_liability(
    liability: Decimal,
    other_parent: Recipient,
    non_parent_carer: Option<Recipient>,
) -> (Decimal, Decimal) {
    let Some(carer) = non_parent_carer.filter(|c| c.rounded_care >= SHARED_CARE_THRESHOLD) else {
        return (liability, Decimal::ZERO);
    };

    let parent_weight = if other_parent.rounded_care >= SHARED_CARE_THRESHOLD {
        other_parent.cost_percentage
    } else {
        Decimal::ZERO
    };
    let total_weight = parent_weight + carer.cost_percentage;
    if total_weight.is_zero() {
        return (Decimal::ZERO, liability);
    }

    let to_carer = round_cents(liability * carer.cost_percentage / total_weight);
    (liability - to_carer, to_carer)
}

/// The result of netting the parents' liabilities.
#[derive(Debug, Clone)]
pub struct NetPaymentResult {
    /// The payment summary.
    pub payment: PaymentSummary,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Nets the parents' liabilities to each other.
///
/// # Arguments
///
/// * `parent_a_total` - Parent A's liability payable to parent B
/// * `parent_b_total` - Parent B's liability payable to parent A
/// * `payments_to_non_parent_carer` - Amounts paid to non-parent carers, outside the netting
/// * `step_number` - The step number for audit trail sequencing
///
/// # Example
///
/// ```
/// use child_support_engine::calculation::net_liabilities;
/// use child_support_engine::models::Payer;
/// use rust_decimal::Decimal;
///
/// let result = net_liabilities(Decimal::from(9_000), Decimal::from(2_500), Decimal::ZERO, 12);
/// assert_eq!(result.payment.payer, Payer::ParentA);
/// assert_eq!(result.payment.annual_amount, Decimal::from(6_500));
/// ```
pub fn net_liabilities(
    parent_a_total: Decimal,
    parent_b_total: Decimal,
    payments_to_non_parent_carer: Decimal,
    step_number: u32,
) -> NetPaymentResult {
    let (payer, annual_amount) = match parent_a_total.cmp(&parent_b_total) {
        std::cmp::Ordering::Greater => (Payer::ParentA, parent_a_total - parent_b_total),
        std::cmp::Ordering::Less => (Payer::ParentB, parent_b_total - parent_a_total),
        std::cmp::Ordering::Equal => (Payer::Neither, Decimal::ZERO),
    };

    let reasoning = match payer {
        Payer::Neither => format!(
            "Liabilities are equal (${}); no payment between the parents",
            parent_a_total.normalize()
        ),
        _ => format!(
            "|${} - ${}| = ${} payable by {:?}",
            parent_a_total.normalize(),
            parent_b_total.normalize(),
            annual_amount.normalize(),
            payer
        ),
    };

    let payment = PaymentSummary {
        payer,
        receiver: payer.counterpart(),
        annual_amount,
        parent_a_total,
        parent_b_total,
        payments_to_non_parent_carer,
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "net_liability".to_string(),
        rule_name: "Annual Rate Netting".to_string(),
        clause_ref: "s 55F".to_string(),
        input: serde_json::json!({
            "parent_a_total": parent_a_total.normalize().to_string(),
            "parent_b_total": parent_b_total.normalize().to_string(),
            "payments_to_non_parent_carer": payments_to_non_parent_carer.normalize().to_string(),
        }),
        output: serde_json::json!({
            "payer": payer,
            "annual_amount": annual_amount.normalize().to_string(),
        }),
        reasoning,
    };

    NetPaymentResult {
        payment,
        audit_step,
    }
}
