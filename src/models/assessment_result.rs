//! Assessment result models for the child support formula engine.
//!
//! This module contains the [`CalculationResult`] type and its associated
//! structures that capture every intermediate value of an assessment, the
//! final payment and an audit trace of each formula step.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A party to a child support payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payer {
    /// Parent A.
    ParentA,
    /// Parent B.
    ParentB,
    /// Nobody; the liabilities cancel out.
    Neither,
}

impl Payer {
    /// The other side of the payment.
    pub fn counterpart(self) -> Self {
        match self {
            Payer::ParentA => Payer::ParentB,
            Payer::ParentB => Payer::ParentA,
            Payer::Neither => Payer::Neither,
        }
    }
}

/// The rate that determined a parent's final liability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppliedRate {
    /// The 8-step formula.
    Formula,
    /// Raised to the Minimum Annual Rate.
    MinimumAnnualRate,
    /// Fixed Annual Rate for an unlodged return.
    FixedAnnualRate,
    /// Income support rate per case.
    IncomeSupportRate,
    /// No liability.
    Nil,
}

/// Which rate rules were considered for a parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateFlags {
    /// Income support rate applied.
    pub income_support_rate: bool,
    /// Income support rate negated by the parent's own care.
    pub income_support_negated: bool,
    /// Fixed Annual Rate applied.
    pub fixed_annual_rate: bool,
    /// Raised to the Minimum Annual Rate.
    pub minimum_annual_rate: bool,
    /// Exempt from the Minimum Annual Rate.
    pub minimum_rate_exempt: bool,
    /// A multi-case cap reduced at least one child's liability.
    pub multi_case_cap_applied: bool,
}

/// Age bracket of the assessed children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    /// Every child 0 to 12.
    Under13,
    /// Every child 13 and over.
    Over13,
    /// Both brackets present.
    Mixed,
}

/// Per-parent outcome of an assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentResult {
    /// Taxable income plus add-backs.
    pub adjusted_taxable_income: Decimal,
    /// Self-support amount deducted.
    pub self_support_amount: Decimal,
    /// Deduction for the parent's relevant dependants.
    pub relevant_dependent_amount: Decimal,
    /// Deduction for the parent's other cases.
    pub multi_case_allowance: Decimal,
    /// Child support income after all deductions.
    pub child_support_income: Decimal,
    /// Share of combined child support income.
    pub income_percentage: Decimal,
    /// Sum of the formula liabilities before rate rules.
    pub formula_total: Decimal,
    /// Sum of the final liabilities after rate rules.
    pub final_total: Decimal,
    /// Rate that produced `final_total`.
    pub applied_rate: AppliedRate,
    /// Rate rules considered.
    pub flags: RateFlags,
}

/// One parent's figures for one child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildParentResult {
    /// Care percentage as supplied.
    pub care: Decimal,
    /// Care percentage after rounding.
    pub rounded_care: Decimal,
    /// Cost percentage from the care table.
    pub cost_percentage: Decimal,
    /// Income percentage less cost percentage.
    pub child_support_percentage: Decimal,
    /// Liability from the formula, after any multi-case cap.
    pub formula_liability: Decimal,
    /// Multi-case cap for this child, if the parent has other cases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_case_cap: Option<Decimal>,
    /// True if the cap reduced the liability.
    pub capped: bool,
    /// Liability after rate rules.
    pub final_liability: Decimal,
    /// Portion of `final_liability` paid to a non-parent carer.
    pub paid_to_non_parent_carer: Decimal,
}

/// A non-parent carer's figures for one child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonParentCarerResult {
    /// Care percentage as supplied.
    pub care: Decimal,
    /// Care percentage after rounding.
    pub rounded_care: Decimal,
    /// Cost percentage from the care table.
    pub cost_percentage: Decimal,
    /// True if the carer has at least 35% care and can receive payments.
    pub eligible: bool,
    /// Total paid to the carer for this child.
    pub payment_received: Decimal,
}

/// Per-child outcome of an assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildResult {
    /// Position in the input list.
    pub index: usize,
    /// Age in whole years.
    pub age: u8,
    /// This child's share of the cost of children.
    pub cost_of_child: Decimal,
    /// Parent A's figures.
    pub parent_a: ChildParentResult,
    /// Parent B's figures.
    pub parent_b: ChildParentResult,
    /// Non-parent carer's figures, if one has care.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_parent_carer: Option<NonParentCarerResult>,
    /// True if the child turns 18 within the assessment.
    pub turning_18: bool,
}

/// Where the income band lookup landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBandInfo {
    /// Age bracket of the children.
    pub age_group: AgeGroup,
    /// Children counted, capped at 3.
    pub child_count: u8,
    /// Zero-based band; one past the last band when above every threshold.
    pub band_index: usize,
    /// Combined income at which the band starts.
    pub band_start: Decimal,
    /// Combined income at which the band ends; `None` above the last band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band_end: Option<Decimal>,
    /// Cost at the start of the band.
    pub base: Decimal,
    /// Marginal rate inside the band.
    pub rate: Decimal,
}

/// The net payment between the parents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSummary {
    /// Who pays.
    pub payer: Payer,
    /// Who receives.
    pub receiver: Payer,
    /// Net annual amount paid between the parents.
    pub annual_amount: Decimal,
    /// Parent A's liability payable to parent B.
    pub parent_a_total: Decimal,
    /// Parent B's liability payable to parent A.
    pub parent_b_total: Decimal,
    /// Total paid to non-parent carers, outside the netting.
    pub payments_to_non_parent_carer: Decimal,
}

/// FTB Part B eligibility of the paying parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartBEligibility {
    /// Child support paid brings the income under the limit.
    EligibleViaDeduction,
    /// Already under the limit.
    Eligible,
    /// Over the limit even after the deduction.
    Ineligible,
}

/// Estimated Family Tax Benefit effects of the payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtbImpact {
    /// Estimated annual FTB Part A reduction for the receiver.
    pub receiver_part_a_reduction: Decimal,
    /// FTB Part B eligibility of the payer; `None` when nobody pays.
    pub payer_part_b: Option<PartBEligibility>,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the legislation for this rule.
    pub clause_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate potential issues that don't prevent calculation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for an assessment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

impl AuditTrace {
    /// Appends a step, renumbering it to follow the previous one.
    pub fn push_step(&mut self, mut step: AuditStep) {
        step.step_number = self.steps.len() as u32 + 1;
        self.steps.push(step);
    }

    /// Appends a warning.
    pub fn warn(
        &mut self,
        code: impl Into<String>,
        message: impl Into<String>,
        severity: impl Into<String>,
    ) {
        self.warnings.push(AuditWarning {
            code: code.into(),
            message: message.into(),
            severity: severity.into(),
        });
    }
}

/// The complete result of a child support assessment.
///
/// The value contains no timestamp or identifier: the same input always
/// produces an identical result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Assessment year of the rates used.
    pub assessment_year: u16,
    /// Parent A's outcome.
    pub parent_a: ParentResult,
    /// Parent B's outcome.
    pub parent_b: ParentResult,
    /// Sum of both parents' child support income.
    pub combined_child_support_income: Decimal,
    /// Total cost of the assessed children.
    pub total_cost_of_children: Decimal,
    /// Income band used for the cost of children.
    pub cost_band: CostBandInfo,
    /// Per-child outcomes in input order.
    pub children: Vec<ChildResult>,
    /// Net payment.
    pub payment: PaymentSummary,
    /// Rate that decided the payer's liability.
    pub rate_applied: AppliedRate,
    /// Estimated Family Tax Benefit effects.
    pub ftb: FtbImpact,
    /// Every step of the calculation.
    pub audit_trace: AuditTrace,
}
