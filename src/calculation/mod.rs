//! Calculation logic for the child support formula.
//!
//! Each step of the assessment lives in its own module and returns its values
//! together with an audit step. [`AssessmentEngine`] runs them in order:
//! child support income, income percentages, cost of children, cost
//! percentages, child support percentages, annual rates with the multi-case
//! cap, the rate rules, non-parent carer payments, netting and the Family Tax
//! Benefit estimate.

mod annual_rate;
mod assessment;
mod care_cost;
mod child_support_income;
mod child_support_percentage;
mod cost_of_children;
mod ftb;
mod income_percentage;
mod multi_case;
mod rate_overrides;

pub use annual_rate::{
    NetPaymentResult, Recipient, child_liability, net_liabilities, round_cents, split_liability,
};
pub use assessment::{ADULT_AGE, AssessmentEngine, compute_assessment};
pub use care_cost::{
    CostPercentageResult, PRIMARY_CARE_THRESHOLD, REGULAR_CARE_THRESHOLD, SHARED_CARE_THRESHOLD,
    calculate_cost_percentage, care_level, cost_percentage_for_care, round_care_percentage,
};
pub use child_support_income::{ChildSupportIncomeResult, calculate_child_support_income};
pub use child_support_percentage::{
    ChildSupportPercentageResult, calculate_child_support_percentage,
};
pub use cost_of_children::{
    CostLookup, CostOfChildrenResult, MAX_COUNTED_CHILDREN, OLDER_BRACKET_AGE, age_group,
    apportion_cost, calculate_cost_of_children, cost_for_ages, virtual_dependent_ages,
};
pub use ftb::{FtbImpactResult, calculate_ftb_impact, part_a_reduction, part_b_eligibility};
pub use income_percentage::{IncomePercentageResult, calculate_income_percentages};
pub use multi_case::{MultiCaseStrategy, SameAgeApportionment, multi_case_cap};
pub use rate_overrides::{
    ParentRateInput, RATE_CASE_LIMIT, RateOverrideResult, apply_rate_overrides, apportion,
    minimum_rate_exemption, per_case_rate, qualifies_for_fixed_annual_rate,
    qualifies_for_income_support_rate,
};
