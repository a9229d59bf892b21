//! The child support assessment pipeline.
//!
//! [`AssessmentEngine`] runs the eight formula steps, the rate rules, the
//! non-parent carer split, netting and the FTB estimate, recording an audit
//! step for each.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::config::{RateTables, YearRates};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AppliedRate, AuditStep, AuditTrace, CalculationResult, Child, ChildParentResult, ChildResult,
    NonParentCarerResult, ParentFinancials, ParentResult, Payer, RateFlags,
};

use super::annual_rate::{Recipient, child_liability, net_liabilities, split_liability};
use super::care_cost::{SHARED_CARE_THRESHOLD, calculate_cost_percentage};
use super::child_support_income::{ChildSupportIncomeResult, calculate_child_support_income};
use super::child_support_percentage::calculate_child_support_percentage;
use super::cost_of_children::calculate_cost_of_children;
use super::ftb::calculate_ftb_impact;
use super::income_percentage::calculate_income_percentages;
use super::multi_case::{MultiCaseStrategy, SameAgeApportionment, multi_case_cap};
use super::rate_overrides::{ParentRateInput, RateOverrideResult, apply_rate_overrides};

/// Children must be younger than this to be assessed.
pub const ADULT_AGE: u8 = 18;

/// Computes child support assessments against injected rate tables.
///
/// The engine holds no per-call state and can be shared across threads.
///
/// # Example
///
/// ```
/// use child_support_engine::calculation::AssessmentEngine;
/// use child_support_engine::config::RateTables;
/// use child_support_engine::models::{Child, ChildCare, ParentFinancials, Payer};
/// use rust_decimal::Decimal;
///
/// let engine = AssessmentEngine::new(RateTables::builtin().unwrap());
/// let parent_a = ParentFinancials::new(Decimal::from(80_000));
/// let parent_b = ParentFinancials::new(Decimal::from(50_000));
/// let children = vec![Child::new(10, ChildCare::percentages(Decimal::ZERO, Decimal::ONE_HUNDRED))];
///
/// let result = engine.compute_assessment(&parent_a, &parent_b, &children, 2026).unwrap();
/// assert_eq!(result.payment.payer, Payer::ParentA);
/// assert_eq!(result.combined_child_support_income, Decimal::from(67_908));
/// ```
#[derive(Debug)]
pub struct AssessmentEngine {
    tables: Arc<RateTables>,
    multi_case: Box<dyn MultiCaseStrategy>,
}

/// Per-child intermediate values, before rate rules.
struct ChildWorking {
    rounded_a: Decimal,
    rounded_b: Decimal,
    cost_pct_a: Decimal,
    cost_pct_b: Decimal,
    cs_pct_a: Decimal,
    cs_pct_b: Decimal,
    formula_a: Decimal,
    formula_b: Decimal,
    cap_a: Option<Decimal>,
    cap_b: Option<Decimal>,
    capped_a: bool,
    capped_b: bool,
    non_parent_carer: Option<Recipient>,
}

fn next_step(trace: &AuditTrace) -> u32 {
    trace.steps.len() as u32 + 1
}

fn reject(field: impl Into<String>, message: impl Into<String>) -> EngineError {
    let error = EngineError::validation(field, message);
    warn!(error = %error, "rejected assessment input");
    error
}

fn validate_parent(parent: &ParentFinancials, label: &str) -> EngineResult<()> {
    let amounts = [
        ("taxable_income", parent.taxable_income),
        ("reportable_fringe_benefits", parent.reportable_fringe_benefits),
        ("reportable_super_contributions", parent.reportable_super_contributions),
        ("other_add_backs", parent.other_add_backs),
    ];
    for (name, value) in amounts {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(reject(format!("{label}.{name}"), "must not be negative"));
        }
    }

    for (index, case) in parent.other_cases.iter().enumerate() {
        let field = format!("{label}.other_cases[{index}]");
        if case.children_ages.is_empty() {
            return Err(reject(field, "case has no children"));
        }
        if let Some(age) = case.children_ages.iter().find(|&&age| age >= ADULT_AGE) {
            return Err(reject(field, format!("child aged {age} is not a child")));
        }
    }
    Ok(())
}

fn validate_children(children: &[Child]) -> EngineResult<()> {
    if children.is_empty() {
        return Err(reject("children", "at least one child is required"));
    }
    for (index, child) in children.iter().enumerate() {
        let field = format!("children[{index}]");
        if child.age >= ADULT_AGE {
            return Err(reject(
                format!("{field}.age"),
                format!("child aged {} is 18 or over", child.age),
            ));
        }
        child.care.validate(&format!("{field}.care")).inspect_err(|error| {
            warn!(error = %error, "rejected assessment input");
        })?;
    }
    Ok(())
}

impl AssessmentEngine {
    /// Creates an engine using the same-age multi-case apportionment.
    pub fn new(tables: Arc<RateTables>) -> Self {
        Self {
            tables,
            multi_case: Box::new(SameAgeApportionment),
        }
    }

    /// Replaces the multi-case apportionment strategy.
    pub fn with_multi_case_strategy(mut self, strategy: Box<dyn MultiCaseStrategy>) -> Self {
        self.multi_case = strategy;
        self
    }

    /// Returns the rate tables in use.
    pub fn tables(&self) -> &RateTables {
        &self.tables
    }

    /// Computes a full assessment.
    ///
    /// # Errors
    ///
    /// - `Validation` for negative incomes, an empty or adult child list,
    ///   care outside 0-100% or care totals other than 100%
    /// - `UnsupportedYear` if no rate table is loaded for `year`
    pub fn compute_assessment(
        &self,
        parent_a: &ParentFinancials,
        parent_b: &ParentFinancials,
        children: &[Child],
        year: u16,
    ) -> EngineResult<CalculationResult> {
        validate_parent(parent_a, "parent_a")?;
        validate_parent(parent_b, "parent_b")?;
        validate_children(children)?;
        let rates = self.tables.get(year)?;

        let mut trace = AuditTrace::default();
        let ages: Vec<u8> = children.iter().map(|c| c.age).collect();
        let strategy = self.multi_case.as_ref();

        // Steps 1-3
        let csi_a = calculate_child_support_income(
            parent_a, "parent_a", &ages, rates, strategy, next_step(&trace),
        );
        trace.push_step(csi_a.audit_step.clone());
        let csi_b = calculate_child_support_income(
            parent_b, "parent_b", &ages, rates, strategy, next_step(&trace),
        );
        trace.push_step(csi_b.audit_step.clone());

        let income = calculate_income_percentages(
            csi_a.child_support_income,
            csi_b.child_support_income,
            next_step(&trace),
        );
        trace.push_step(income.audit_step.clone());
        if income.combined_income.is_zero() {
            trace.warn(
                "zero_combined_income",
                "Combined child support income is $0; only the rate rules can produce a liability",
                "low",
            );
        }

        // Step 4
        let cost = calculate_cost_of_children(
            &rates.cost_of_children,
            &ages,
            income.combined_income,
            next_step(&trace),
        );
        trace.push_step(cost.audit_step.clone());
        debug!(total = %cost.total, band = cost.band.band_index, "calculated cost of children");

        // Steps 5-8 per child
        let mut working = Vec::with_capacity(children.len());
        for (index, child) in children.iter().enumerate() {
            let cost_of_child = cost.per_child[index];
            let carer_a = calculate_cost_percentage(
                child.care.parent_a,
                &rates.care_cost_buckets,
                "parent_a",
                index,
                next_step(&trace),
            );
            trace.push_step(carer_a.audit_step.clone());
            let carer_b = calculate_cost_percentage(
                child.care.parent_b,
                &rates.care_cost_buckets,
                "parent_b",
                index,
                next_step(&trace),
            );
            trace.push_step(carer_b.audit_step.clone());
            let non_parent_carer = match child.care.non_parent_carer {
                Some(care) => {
                    let carer = calculate_cost_percentage(
                        care,
                        &rates.care_cost_buckets,
                        "non_parent_carer",
                        index,
                        next_step(&trace),
                    );
                    trace.push_step(carer.audit_step.clone());
                    Some(Recipient {
                        rounded_care: carer.rounded_care,
                        cost_percentage: carer.cost_percentage,
                    })
                }
                None => None,
            };

            let cs = calculate_child_support_percentage(
                index,
                income.parent_a,
                carer_a.cost_percentage,
                income.parent_b,
                carer_b.cost_percentage,
                next_step(&trace),
            );
            trace.push_step(cs.audit_step.clone());

            let (formula_a, cap_a, capped_a) = self.capped_liability(
                parent_a, &csi_a, &ages, child.age, cs.parent_a, carer_a.cost_percentage,
                cost_of_child, rates,
            );
            let (formula_b, cap_b, capped_b) = self.capped_liability(
                parent_b, &csi_b, &ages, child.age, cs.parent_b, carer_b.cost_percentage,
                cost_of_child, rates,
            );
            trace.push_step(liability_step(
                index, cost_of_child, (formula_a, capped_a), (formula_b, capped_b), next_step(&trace),
            ));

            if child.age == ADULT_AGE - 1 {
                trace.warn(
                    "turning_18",
                    format!("Child {index} is 17 and may turn 18 during the assessment"),
                    "low",
                );
            }

            working.push(ChildWorking {
                rounded_a: carer_a.rounded_care,
                rounded_b: carer_b.rounded_care,
                cost_pct_a: carer_a.cost_percentage,
                cost_pct_b: carer_b.cost_percentage,
                cs_pct_a: cs.parent_a,
                cs_pct_b: cs.parent_b,
                formula_a,
                formula_b,
                cap_a,
                cap_b,
                capped_a,
                capped_b,
                non_parent_carer,
            });
        }

        // Rate rules
        let rounded_a: Vec<Decimal> = working.iter().map(|w| w.rounded_a).collect();
        let rounded_b: Vec<Decimal> = working.iter().map(|w| w.rounded_b).collect();
        let formula_a: Vec<Decimal> = working.iter().map(|w| w.formula_a).collect();
        let formula_b: Vec<Decimal> = working.iter().map(|w| w.formula_b).collect();

        let rate_a = apply_rate_overrides(
            ParentRateInput {
                parent: parent_a,
                label: "parent_a",
                rounded_care: &rounded_a,
                formula_liabilities: &formula_a,
            },
            rates,
            next_step(&trace),
        );
        trace.push_step(rate_a.audit_step.clone());
        let rate_b = apply_rate_overrides(
            ParentRateInput {
                parent: parent_b,
                label: "parent_b",
                rounded_care: &rounded_b,
                formula_liabilities: &formula_b,
            },
            rates,
            next_step(&trace),
        );
        trace.push_step(rate_b.audit_step.clone());

        // Non-parent carer split
        let mut child_results = Vec::with_capacity(children.len());
        let mut total_a_to_b = Decimal::ZERO;
        let mut total_b_to_a = Decimal::ZERO;
        let mut total_to_carers = Decimal::ZERO;
        for (index, (child, w)) in children.iter().zip(&working).enumerate() {
            let final_a = rate_a.liabilities[index];
            let final_b = rate_b.liabilities[index];
            let recipient_a = Recipient {
                rounded_care: w.rounded_a,
                cost_percentage: w.cost_pct_a,
            };
            let recipient_b = Recipient {
                rounded_care: w.rounded_b,
                cost_percentage: w.cost_pct_b,
            };
            let (a_to_b, a_to_carer) = split_liability(final_a, recipient_b, w.non_parent_carer);
            let (b_to_a, b_to_carer) = split_liability(final_b, recipient_a, w.non_parent_carer);
            total_a_to_b += a_to_b;
            total_b_to_a += b_to_a;
            total_to_carers += a_to_carer + b_to_carer;

            let non_parent_carer = match (child.care.non_parent_carer, w.non_parent_carer) {
                (Some(care), Some(carer)) => Some(NonParentCarerResult {
                    care,
                    rounded_care: carer.rounded_care,
                    cost_percentage: carer.cost_percentage,
                    eligible: carer.rounded_care >= SHARED_CARE_THRESHOLD,
                    payment_received: a_to_carer + b_to_carer,
                }),
                _ => None,
            };

            child_results.push(ChildResult {
                index,
                age: child.age,
                cost_of_child: cost.per_child[index],
                parent_a: ChildParentResult {
                    care: child.care.parent_a,
                    rounded_care: w.rounded_a,
                    cost_percentage: w.cost_pct_a,
                    child_support_percentage: w.cs_pct_a,
                    formula_liability: w.formula_a,
                    multi_case_cap: w.cap_a,
                    capped: w.capped_a,
                    final_liability: final_a,
                    paid_to_non_parent_carer: a_to_carer,
                },
                parent_b: ChildParentResult {
                    care: child.care.parent_b,
                    rounded_care: w.rounded_b,
                    cost_percentage: w.cost_pct_b,
                    child_support_percentage: w.cs_pct_b,
                    formula_liability: w.formula_b,
                    multi_case_cap: w.cap_b,
                    capped: w.capped_b,
                    final_liability: final_b,
                    paid_to_non_parent_carer: b_to_carer,
                },
                non_parent_carer,
                turning_18: child.age == ADULT_AGE - 1,
            });
        }
        if total_to_carers > Decimal::ZERO {
            trace.push_step(AuditStep {
                step_number: next_step(&trace),
                rule_id: "non_parent_carer".to_string(),
                rule_name: "Payments to Non-Parent Carer".to_string(),
                clause_ref: "s 55F".to_string(),
                input: serde_json::json!({
                    "children_with_eligible_carer": child_results
                        .iter()
                        .filter(|c| c.non_parent_carer.as_ref().is_some_and(|n| n.eligible))
                        .map(|c| c.index)
                        .collect::<Vec<_>>(),
                }),
                output: serde_json::json!({
                    "payments_to_non_parent_carer": total_to_carers.normalize().to_string(),
                }),
                reasoning: format!(
                    "${} of the parents' liabilities is payable to the non-parent carer",
                    total_to_carers.normalize()
                ),
            });
        }

        // Netting
        let net = net_liabilities(total_a_to_b, total_b_to_a, total_to_carers, next_step(&trace));
        trace.push_step(net.audit_step.clone());
        let payment = net.payment;

        // FTB
        let ftb = calculate_ftb_impact(
            &payment,
            csi_a.adjusted_taxable_income,
            csi_b.adjusted_taxable_income,
            children.len(),
            &rates.family_tax_benefit,
            next_step(&trace),
        );
        trace.push_step(ftb.audit_step.clone());

        let parent_a_result = parent_result(&csi_a, income.parent_a, &child_results, true, &rate_a);
        let parent_b_result = parent_result(&csi_b, income.parent_b, &child_results, false, &rate_b);

        let rate_applied = match payment.payer {
            Payer::ParentA => parent_a_result.applied_rate,
            Payer::ParentB => parent_b_result.applied_rate,
            Payer::Neither
                if parent_a_result.final_total.is_zero() && parent_b_result.final_total.is_zero() => AppliedRate::Nil,
            Payer::Neither => AppliedRate::Formula,
        };

        info!(
            year,
            payer = ?payment.payer,
            annual_amount = %payment.annual_amount,
            combined_income = %income.combined_income,
            children = children.len(),
            "completed child support assessment"
        );

        Ok(CalculationResult {
            assessment_year: rates.assessment_year,
            parent_a: parent_a_result,
            parent_b: parent_b_result,
            combined_child_support_income: income.combined_income,
            total_cost_of_children: cost.total,
            cost_band: cost.band,
            children: child_results,
            payment,
            rate_applied,
            ftb: ftb.impact,
            audit_trace: trace,
        })
    }

    /// Formula liability for one parent and child after the multi-case cap.
    ///
    /// Returns the liability, the cap if the parent has other cases, and
    /// whether the cap reduced the liability.
    #[allow(clippy::too_many_arguments)]
    fn capped_liability(
        &self,
        parent: &ParentFinancials,
        income: &ChildSupportIncomeResult,
        case_ages: &[u8],
        child_age: u8,
        child_support_percentage: Decimal,
        cost_percentage: Decimal,
        cost_of_child: Decimal,
        rates: &YearRates,
    ) -> (Decimal, Option<Decimal>, bool) {
        let liability = child_liability(child_support_percentage, cost_of_child);
        if parent.other_cases.is_empty() {
            return (liability, None, false);
        }
        let other_ages: Vec<u8> = parent.other_case_children().collect();
        let cap_cost = self.multi_case.cap_cost(
            &rates.cost_of_children,
            income.preliminary_income,
            case_ages,
            &other_ages,
            child_age,
        );
        let cap = multi_case_cap(cap_cost, cost_percentage);
        if liability > cap {
            debug!(liability = %liability, cap = %cap, "multi-case cap applied");
            (cap, Some(cap), true)
        } else {
            (liability, Some(cap), false)
        }
    }
}

fn liability_step(
    child_index: usize,
    cost_of_child: Decimal,
    (liability_a, capped_a): (Decimal, bool),
    (liability_b, capped_b): (Decimal, bool),
    step_number: u32,
) -> AuditStep {
    let describe = |liability: Decimal, capped: bool| {
        if capped {
            format!("${} (multi-case cap)", liability.normalize())
        } else {
            format!("${}", liability.normalize())
        }
    };
    AuditStep {
        step_number,
        rule_id: "annual_rate".to_string(),
        rule_name: "Annual Rate".to_string(),
        clause_ref: "s 55F".to_string(),
        input: serde_json::json!({
            "child_index": child_index,
            "cost_of_child": cost_of_child.normalize().to_string(),
        }),
        output: serde_json::json!({
            "parent_a_liability": liability_a.normalize().to_string(),
            "parent_a_capped": capped_a,
            "parent_b_liability": liability_b.normalize().to_string(),
            "parent_b_capped": capped_b,
        }),
        reasoning: format!(
            "Child {}: parent A {}, parent B {}",
            child_index,
            describe(liability_a, capped_a),
            describe(liability_b, capped_b)
        ),
    }
}

fn figures(child: &ChildResult, is_parent_a: bool) -> &ChildParentResult {
    if is_parent_a { &child.parent_a } else { &child.parent_b }
}

fn parent_result(
    income: &ChildSupportIncomeResult,
    income_percentage: Decimal,
    children: &[ChildResult],
    is_parent_a: bool,
    rate: &RateOverrideResult,
) -> ParentResult {
    let formula_total: Decimal = children
        .iter()
        .map(|c| figures(c, is_parent_a).formula_liability)
        .sum();
    let final_total: Decimal = children
        .iter()
        .map(|c| figures(c, is_parent_a).final_liability)
        .sum();
    let flags = RateFlags {
        multi_case_cap_applied: children.iter().any(|c| figures(c, is_parent_a).capped),
        ..rate.flags
    };

    ParentResult {
        adjusted_taxable_income: income.adjusted_taxable_income,
        self_support_amount: income.self_support_amount,
        relevant_dependent_amount: income.relevant_dependent_amount,
        multi_case_allowance: income.multi_case_allowance,
        child_support_income: income.child_support_income,
        income_percentage,
        formula_total,
        final_total,
        applied_rate: rate.applied_rate,
        flags,
    }
}

/// Computes an assessment against the built-in rate tables.
///
/// # Example
///
/// ```
/// use child_support_engine::calculation::compute_assessment;
/// use child_support_engine::models::{Child, ChildCare, ParentFinancials, Payer};
/// use rust_decimal::Decimal;
///
/// let parent = ParentFinancials::new(Decimal::from(90_000));
/// let children = vec![Child::new(8, ChildCare::percentages(Decimal::from(50), Decimal::from(50)))];
///
/// let result = compute_assessment(&parent, &parent, &children, 2026).unwrap();
/// assert_eq!(result.payment.payer, Payer::Neither);
/// assert_eq!(result.payment.annual_amount, Decimal::ZERO);
/// ```
pub fn compute_assessment(
    parent_a: &ParentFinancials,
    parent_b: &ParentFinancials,
    children: &[Child],
    year: u16,
) -> EngineResult<CalculationResult> {
    AssessmentEngine::new(RateTables::builtin()?).compute_assessment(parent_a, parent_b, children, year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChildCare, IncomeStatus, OtherCase, PartBEligibility};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn engine() -> AssessmentEngine {
        AssessmentEngine::new(RateTables::builtin().unwrap())
    }

    fn child(age: u8, care_a: &str, care_b: &str) -> Child {
        Child::new(age, ChildCare::percentages(dec(care_a), dec(care_b)))
    }

    fn assess(a: &ParentFinancials, b: &ParentFinancials, children: &[Child]) -> CalculationResult {
        engine().compute_assessment(a, b, children, 2026).unwrap()
    }

    #[test]
    fn test_basic_sole_care_assessment() {
        let a = ParentFinancials::new(dec("80000"));
        let b = ParentFinancials::new(dec("50000"));
        let result = assess(&a, &b, &[child(10, "0", "100")]);

        assert_eq!(result.parent_a.child_support_income, dec("48954"));
        assert_eq!(result.parent_b.child_support_income, dec("18954"));
        assert_eq!(result.combined_child_support_income, dec("67908"));
        assert_eq!(result.total_cost_of_children, dec("11117.85"));
        assert_eq!(result.payment.payer, Payer::ParentA);
        assert_eq!(result.payment.receiver, Payer::ParentB);
        assert_eq!(result.payment.annual_amount, dec("8014.71"));
        assert_eq!(result.rate_applied, AppliedRate::Formula);
    }

    #[test]
    fn test_parent_totals_sum_child_liabilities() {
        let a = ParentFinancials::new(dec("100000"));
        let b = ParentFinancials::new(dec("50000"));
        let result = assess(&a, &b, &[child(6, "50", "50"), child(9, "50", "50")]);

        let formula_a: Decimal = result.children.iter().map(|c| c.parent_a.formula_liability).sum();
        let final_b: Decimal = result.children.iter().map(|c| c.parent_b.final_liability).sum();
        assert_eq!(result.parent_a.formula_total, formula_a);
        assert_eq!(result.parent_b.final_total, final_b);
        assert!(result.parent_a.final_total > Decimal::ZERO);
        assert_eq!(result.parent_b.final_total, Decimal::ZERO);
        assert!(!result.parent_a.flags.multi_case_cap_applied);
    }

    #[test]
    fn test_audit_trace_is_sequential() {
        let a = ParentFinancials::new(dec("80000"));
        let b = ParentFinancials::new(dec("50000"));
        let result = assess(&a, &b, &[child(10, "0", "100")]);

        for (i, step) in result.audit_trace.steps.iter().enumerate() {
            assert_eq!(step.step_number, i as u32 + 1);
        }
        let rules: Vec<&str> = result.audit_trace.steps.iter().map(|s| s.rule_id.as_str()).collect();
        assert_eq!(rules.first(), Some(&"child_support_income"));
        assert!(rules.contains(&"cost_of_children"));
        assert!(rules.contains(&"net_liability"));
        assert_eq!(rules.last(), Some(&"ftb_impact"));
    }

    #[test]
    fn test_equal_income_equal_care_is_zero() {
        let parent = ParentFinancials::new(dec("70000"));
        let result = assess(&parent, &parent, &[child(6, "50", "50"), child(9, "50", "50")]);

        assert_eq!(result.payment.payer, Payer::Neither);
        assert_eq!(result.payment.annual_amount, Decimal::ZERO);
        assert_eq!(result.rate_applied, AppliedRate::Nil);
        assert_eq!(result.ftb.payer_part_b, None);
    }

    #[test]
    fn test_shared_care_higher_earner_pays() {
        let a = ParentFinancials::new(dec("100000"));
        let b = ParentFinancials::new(dec("50000"));
        let result = assess(&a, &b, &[child(6, "50", "50"), child(9, "50", "50")]);

        assert_eq!(result.payment.payer, Payer::ParentA);
        assert!(result.payment.annual_amount > Decimal::ZERO);
        assert_eq!(result.children[0].parent_a.cost_percentage, dec("69"));
    }

    #[test]
    fn test_zero_combined_income() {
        let a = ParentFinancials::new(dec("20000"));
        let b = ParentFinancials::new(dec("25000"));
        let result = assess(&a, &b, &[child(4, "0", "100")]);

        assert_eq!(result.combined_child_support_income, Decimal::ZERO);
        assert_eq!(result.total_cost_of_children, Decimal::ZERO);
        assert_eq!(result.payment.payer, Payer::Neither);
        assert!(result.audit_trace.warnings.iter().any(|w| w.code == "zero_combined_income"));
    }

    #[test]
    fn test_income_support_rate_applies_with_zero_income() {
        let a = ParentFinancials::new(dec("15000")).with_income_support();
        let b = ParentFinancials::new(dec("25000"));
        let result = assess(&a, &b, &[child(4, "0", "100")]);

        assert_eq!(result.payment.payer, Payer::ParentA);
        assert_eq!(result.payment.annual_amount, dec("551"));
        assert_eq!(result.rate_applied, AppliedRate::IncomeSupportRate);
        assert!(result.parent_a.flags.income_support_rate);
    }

    #[test]
    fn test_fixed_annual_rate_for_unlodged_return() {
        let a = ParentFinancials::new(dec("10000")).with_income_status(IncomeStatus::NotLodged);
        let b = ParentFinancials::new(dec("60000"));
        let result = assess(&a, &b, &[child(4, "0", "100"), child(7, "0", "100")]);

        assert_eq!(result.rate_applied, AppliedRate::FixedAnnualRate);
        assert_eq!(result.payment.annual_amount, dec("3650"));
    }

    #[test]
    fn test_minimum_annual_rate_raises_small_liability() {
        // Parent A has $32,046 ATI: CSI $1,000
        let a = ParentFinancials::new(dec("32046"));
        let b = ParentFinancials::new(dec("200000"));
        let result = assess(&a, &b, &[child(4, "0", "100")]);

        assert!(result.parent_a.formula_total > Decimal::ZERO);
        assert!(result.parent_a.formula_total < dec("551"));
        assert_eq!(result.parent_a.final_total, dec("551"));
        assert_eq!(result.parent_a.applied_rate, AppliedRate::MinimumAnnualRate);
    }

    #[test]
    fn test_non_parent_carer_receives_payments() {
        let a = ParentFinancials::new(dec("90000"));
        let b = ParentFinancials::new(dec("60000"));
        let care = ChildCare::percentages(dec("0"), dec("0")).with_non_parent_carer(dec("100"));
        let result = assess(&a, &b, &[Child::new(11, care)]);

        let total_liability = result.parent_a.final_total + result.parent_b.final_total;
        assert!(total_liability > Decimal::ZERO);
        assert_eq!(result.payment.payments_to_non_parent_carer, total_liability);
        assert_eq!(result.payment.payer, Payer::Neither);
        let carer = result.children[0].non_parent_carer.as_ref().unwrap();
        assert!(carer.eligible);
        assert_eq!(carer.payment_received, total_liability);
    }

    #[test]
    fn test_multi_case_allowance_and_cap() {
        let a = ParentFinancials::new(dec("120000")).with_other_case(OtherCase {
            children_ages: vec![3, 5],
            at_minimum_rate: false,
        });
        let b = ParentFinancials::new(dec("30000"));
        let result = assess(&a, &b, &[child(8, "0", "100")]);

        assert!(result.parent_a.multi_case_allowance > Decimal::ZERO);
        let cap = result.children[0].parent_a.multi_case_cap.unwrap();
        assert!(result.children[0].parent_a.formula_liability <= cap);
    }

    #[test]
    fn test_turning_18_flagged() {
        let a = ParentFinancials::new(dec("80000"));
        let b = ParentFinancials::new(dec("50000"));
        let result = assess(&a, &b, &[child(17, "0", "100")]);

        assert!(result.children[0].turning_18);
        assert!(result.audit_trace.warnings.iter().any(|w| w.code == "turning_18"));
    }

    #[test]
    fn test_ftb_part_b_for_payer() {
        let a = ParentFinancials::new(dec("80000"));
        let b = ParentFinancials::new(dec("50000"));
        let result = assess(&a, &b, &[child(10, "0", "100")]);
        assert_eq!(result.ftb.payer_part_b, Some(PartBEligibility::Eligible));
    }

    #[test]
    fn test_rejects_empty_children() {
        let parent = ParentFinancials::new(dec("50000"));
        let result = engine().compute_assessment(&parent, &parent, &[], 2026);
        assert!(matches!(result, Err(EngineError::Validation { .. })));
    }

    #[test]
    fn test_rejects_adult_child() {
        let parent = ParentFinancials::new(dec("50000"));
        let result = engine().compute_assessment(&parent, &parent, &[child(18, "0", "100")], 2026);
        match result {
            Err(EngineError::Validation { field, .. }) => assert_eq!(field, "children[0].age"),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_negative_income() {
        let a = ParentFinancials::new(dec("-1"));
        let b = ParentFinancials::new(dec("50000"));
        let result = engine().compute_assessment(&a, &b, &[child(5, "0", "100")], 2026);
        match result {
            Err(EngineError::Validation { field, .. }) => assert_eq!(field, "parent_a.taxable_income"),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_care_total() {
        let parent = ParentFinancials::new(dec("50000"));
        let result = engine().compute_assessment(&parent, &parent, &[child(5, "30", "30")], 2026);
        assert!(matches!(result, Err(EngineError::Validation { .. })));
    }

    #[test]
    fn test_unknown_year_is_unsupported() {
        let parent = ParentFinancials::new(dec("50000"));
        let result = engine().compute_assessment(&parent, &parent, &[child(5, "0", "100")], 2031);
        assert!(matches!(result, Err(EngineError::UnsupportedYear { year: 2031 })));
    }

    #[test]
    fn test_free_function_matches_engine() {
        let a = ParentFinancials::new(dec("80000"));
        let b = ParentFinancials::new(dec("50000"));
        let children = [child(10, "0", "100")];
        assert_eq!(
            compute_assessment(&a, &b, &children, 2026).unwrap(),
            assess(&a, &b, &children)
        );
    }
}
