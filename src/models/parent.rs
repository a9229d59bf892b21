//! Parent financial model and related types.
//!
//! This module defines [`ParentFinancials`], the per-parent input to the
//! formula engine, together with the dependants and other cases that reduce
//! a parent's child support income.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether the parent's tax return has been lodged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeStatus {
    /// Income is assessed from a lodged return.
    #[default]
    Lodged,
    /// No return lodged; the fixed annual rate may apply.
    NotLodged,
}

/// Children living with the parent who are not part of any child support case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevantDependents {
    /// Dependants aged 0 to 12.
    #[serde(default)]
    pub under_13: u8,
    /// Dependants aged 13 to 17.
    #[serde(default)]
    pub over_13: u8,
}

impl RelevantDependents {
    /// Total number of dependants.
    pub fn total(&self) -> u8 {
        self.under_13.saturating_add(self.over_13)
    }
}

/// Another child support case the parent is liable in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherCase {
    /// Ages of the children in that case.
    pub children_ages: Vec<u8>,
    /// True if the parent already pays the minimum annual rate in that case.
    #[serde(default)]
    pub at_minimum_rate: bool,
}

/// A parent's income and circumstances for one assessment.
///
/// # Example
///
/// ```
/// use child_support_engine::models::ParentFinancials;
/// use rust_decimal::Decimal;
///
/// let parent = ParentFinancials::new(Decimal::from(80_000))
///     .with_reportable_fringe_benefits(Decimal::from(2_000));
/// assert_eq!(parent.adjusted_taxable_income(), Decimal::from(82_000));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentFinancials {
    /// Taxable income for the assessment year.
    pub taxable_income: Decimal,
    /// Reportable fringe benefits.
    #[serde(default)]
    pub reportable_fringe_benefits: Decimal,
    /// Reportable superannuation contributions.
    #[serde(default)]
    pub reportable_super_contributions: Decimal,
    /// Net investment losses, tax-free pensions and similar add-backs.
    #[serde(default)]
    pub other_add_backs: Decimal,
    /// Dependants living with the parent.
    #[serde(default)]
    pub relevant_dependents: RelevantDependents,
    /// The parent's other child support cases.
    #[serde(default)]
    pub other_cases: Vec<OtherCase>,
    /// True if the parent receives an income support payment.
    #[serde(default)]
    pub receives_income_support: bool,
    /// Tax lodgement status.
    #[serde(default)]
    pub income_status: IncomeStatus,
}

impl ParentFinancials {
    /// Creates a parent with the given taxable income and no other circumstances.
    pub fn new(taxable_income: Decimal) -> Self {
        Self {
            taxable_income,
            reportable_fringe_benefits: Decimal::ZERO,
            reportable_super_contributions: Decimal::ZERO,
            other_add_backs: Decimal::ZERO,
            relevant_dependents: RelevantDependents::default(),
            other_cases: Vec::new(),
            receives_income_support: false,
            income_status: IncomeStatus::Lodged,
        }
    }

    /// Sets reportable fringe benefits.
    pub fn with_reportable_fringe_benefits(mut self, amount: Decimal) -> Self {
        self.reportable_fringe_benefits = amount;
        self
    }

    /// Sets reportable superannuation contributions.
    pub fn with_reportable_super_contributions(mut self, amount: Decimal) -> Self {
        self.reportable_super_contributions = amount;
        self
    }

    /// Sets other add-backs.
    pub fn with_other_add_backs(mut self, amount: Decimal) -> Self {
        self.other_add_backs = amount;
        self
    }

    /// Sets the relevant dependants.
    pub fn with_relevant_dependents(mut self, under_13: u8, over_13: u8) -> Self {
        self.relevant_dependents = RelevantDependents { under_13, over_13 };
        self
    }

    /// Adds another child support case.
    pub fn with_other_case(mut self, case: OtherCase) -> Self {
        self.other_cases.push(case);
        self
    }

    /// Marks the parent as receiving income support.
    pub fn with_income_support(mut self) -> Self {
        self.receives_income_support = true;
        self
    }

    /// Sets the tax lodgement status.
    pub fn with_income_status(mut self, status: IncomeStatus) -> Self {
        self.income_status = status;
        self
    }

    /// Taxable income plus every add-back.
    pub fn adjusted_taxable_income(&self) -> Decimal {
        self.taxable_income
            + self.reportable_fringe_benefits
            + self.reportable_super_contributions
            + self.other_add_backs
    }

    /// Ages of every child in the parent's other cases.
    pub fn other_case_children(&self) -> impl Iterator<Item = u8> + '_ {
        self.other_cases
            .iter()
            .flat_map(|case| case.children_ages.iter().copied())
    }

    /// Number of cases including this one.
    pub fn case_count(&self) -> usize {
        self.other_cases.len() + 1
    }

    /// Number of other cases already at the minimum annual rate.
    pub fn cases_at_minimum_rate(&self) -> usize {
        self.other_cases
            .iter()
            .filter(|case| case.at_minimum_rate)
            .count()
    }
}
