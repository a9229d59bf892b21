//! Configuration types for the child support reference data.
//!
//! This module contains the strongly-typed structures deserialized from the
//! YAML files under `config/`: one rate file per assessment year and the
//! school term calendar used by the care calculator.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Number of income bands in every cost of children table.
pub const COST_BAND_COUNT: usize = 5;

/// Income-banded cost parameters for one age group and child count.
///
/// Within band `i` the cost is `bases[i] + (income - band_start) * percentages[i]`,
/// capped at `max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CostBand {
    /// Marginal rate applied to income inside each band.
    pub percentages: Vec<Decimal>,
    /// Cost already accumulated at the start of each band.
    pub bases: Vec<Decimal>,
    /// Cost for income above the last band threshold.
    pub max: Decimal,
}

/// Cost parameters for children of a single age group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgeGroupCosts {
    /// One child.
    pub one_child: CostBand,
    /// Two children.
    pub two_children: CostBand,
    /// Three or more children.
    pub three_or_more: CostBand,
}

/// Cost parameters for sibling groups spanning both age brackets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MixedAgeCosts {
    /// Two children of different age brackets.
    pub two_children: CostBand,
    /// Three or more children spanning both brackets.
    pub three_or_more: CostBand,
}

/// The published cost of children table for one assessment year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CostOfChildrenTable {
    /// Upper bound of each income band, ascending.
    pub band_thresholds: Vec<Decimal>,
    /// Children aged 0 to 12.
    pub under_13: AgeGroupCosts,
    /// Children aged 13 and over.
    pub over_13: AgeGroupCosts,
    /// Sibling groups with children in both brackets.
    pub mixed: MixedAgeCosts,
}

/// One bucket of the care percentage to cost percentage conversion.
///
/// A care percentage `c` with `c >= from_care` (and below the next bucket's
/// `from_care`) converts to `base_cost + per_point * (c - from_care)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CareCostBucket {
    /// Inclusive lower bound of the bucket.
    pub from_care: Decimal,
    /// Cost percentage at the lower bound.
    pub base_cost: Decimal,
    /// Cost percentage added per care point above the lower bound.
    pub per_point: Decimal,
}

/// Ordered care-to-cost buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CareCostTable {
    buckets: Vec<CareCostBucket>,
}

impl CareCostTable {
    /// Creates a table from buckets ordered by `from_care`.
    pub fn new(buckets: Vec<CareCostBucket>) -> EngineResult<Self> {
        let table = Self { buckets };
        table.validate()?;
        Ok(table)
    }

    /// Returns the buckets in ascending order.
    pub fn buckets(&self) -> &[CareCostBucket] {
        &self.buckets
    }

    /// Checks the table starts at 0, ascends, and never decreases across an edge.
    pub fn validate(&self) -> EngineResult<()> {
        let first = self
            .buckets
            .first()
            .ok_or_else(|| EngineError::invalid_config("care cost table has no buckets"))?;
        if first.from_care != Decimal::ZERO {
            return Err(EngineError::invalid_config(
                "first care cost bucket must start at 0% care",
            ));
        }

        for pair in self.buckets.windows(2) {
            let (current, next) = (pair[0], pair[1]);
            if next.from_care <= current.from_care {
                return Err(EngineError::invalid_config(format!(
                    "care cost buckets out of order at {}%",
                    next.from_care
                )));
            }
            if current.per_point.is_sign_negative() {
                return Err(EngineError::invalid_config(format!(
                    "care cost bucket at {}% has a negative slope",
                    current.from_care
                )));
            }
            let end_of_current =
                current.base_cost + current.per_point * (next.from_care - current.from_care);
            if end_of_current > next.base_cost {
                return Err(EngineError::invalid_config(format!(
                    "care cost table decreases at {}% care",
                    next.from_care
                )));
            }
        }
        Ok(())
    }
}

/// Family Tax Benefit limits used for the FTB impact flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FamilyTaxBenefitLimits {
    /// Income above which FTB Part A is assumed to be nil.
    pub part_a_cutoff_estimate: Decimal,
    /// FTB Part B primary earner income limit.
    pub part_b_primary_limit: Decimal,
    /// Maintenance Income Free Area for the first child.
    pub mifa_base: Decimal,
    /// Maintenance Income Free Area added for each further child.
    pub mifa_additional_child: Decimal,
    /// Part A reduction per dollar of child support above the free area.
    pub maintenance_taper: Decimal,
}

/// Every rate published for one assessment year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YearRates {
    /// The assessment year these rates apply to.
    pub assessment_year: u16,
    /// Self-support amount deducted from each parent's ATI.
    pub self_support_amount: Decimal,
    /// Maximum Parenting Payment (single) rate, the FAR income threshold.
    pub max_parenting_payment_single: Decimal,
    /// Minimum Annual Rate.
    pub minimum_annual_rate: Decimal,
    /// Fixed Annual Rate, per child.
    pub fixed_annual_rate: Decimal,
    /// Annual rate per case for a parent on income support.
    pub income_support_rate_per_case: Decimal,
    /// Cost of children table.
    pub cost_of_children: CostOfChildrenTable,
    /// Care to cost conversion table.
    pub care_cost_buckets: CareCostTable,
    /// Family Tax Benefit limits.
    pub family_tax_benefit: FamilyTaxBenefitLimits,
}

impl YearRates {
    /// Validates the internal consistency of the year's tables.
    pub fn validate(&self) -> EngineResult<()> {
        let year = self.assessment_year;
        let table = &self.cost_of_children;

        if table.band_thresholds.len() != COST_BAND_COUNT {
            return Err(EngineError::invalid_config(format!(
                "{year}: expected {COST_BAND_COUNT} band thresholds, found {}",
                table.band_thresholds.len()
            )));
        }
        if table.band_thresholds.windows(2).any(|w| w[1] <= w[0]) {
            return Err(EngineError::invalid_config(format!(
                "{year}: band thresholds must ascend"
            )));
        }

        let bands = [
            ("under_13.one_child", &table.under_13.one_child),
            ("under_13.two_children", &table.under_13.two_children),
            ("under_13.three_or_more", &table.under_13.three_or_more),
            ("over_13.one_child", &table.over_13.one_child),
            ("over_13.two_children", &table.over_13.two_children),
            ("over_13.three_or_more", &table.over_13.three_or_more),
            ("mixed.two_children", &table.mixed.two_children),
            ("mixed.three_or_more", &table.mixed.three_or_more),
        ];
        for (name, band) in bands {
            if band.percentages.len() != COST_BAND_COUNT || band.bases.len() != COST_BAND_COUNT {
                return Err(EngineError::invalid_config(format!(
                    "{year}: {name} must list {COST_BAND_COUNT} percentages and bases"
                )));
            }
        }

        let amounts = [
            ("self_support_amount", self.self_support_amount),
            ("minimum_annual_rate", self.minimum_annual_rate),
            ("fixed_annual_rate", self.fixed_annual_rate),
            ("income_support_rate_per_case", self.income_support_rate_per_case),
        ];
        if let Some((name, _)) = amounts.iter().find(|(_, v)| v.is_sign_negative()) {
            return Err(EngineError::invalid_config(format!(
                "{year}: {name} must not be negative"
            )));
        }

        self.care_cost_buckets.validate()
    }
}

/// Year-keyed, immutable collection of rate tables.
///
/// Lookups never fall back to a neighbouring year.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTables {
    years: BTreeMap<u16, YearRates>,
}

impl RateTables {
    /// Creates the collection, validating every year and rejecting duplicates.
    pub fn new(rates: Vec<YearRates>) -> EngineResult<Self> {
        let mut years = BTreeMap::new();
        for year_rates in rates {
            year_rates.validate()?;
            let year = year_rates.assessment_year;
            if years.insert(year, year_rates).is_some() {
                return Err(EngineError::invalid_config(format!(
                    "duplicate rate table for assessment year {year}"
                )));
            }
        }
        if years.is_empty() {
            return Err(EngineError::invalid_config("no rate tables supplied"));
        }
        Ok(Self { years })
    }

    /// Returns the rates for an assessment year.
    pub fn get(&self, year: u16) -> EngineResult<&YearRates> {
        self.years
            .get(&year)
            .ok_or(EngineError::UnsupportedYear { year })
    }

    /// Returns the loaded assessment years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = u16> + '_ {
        self.years.keys().copied()
    }
}

/// Start and end (inclusive) of one school term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TermDates {
    /// First day of term.
    pub start: NaiveDate,
    /// Last day of term.
    pub end: NaiveDate,
}

/// School term calendar file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchoolTermsConfig {
    /// The calendar year the listed terms belong to.
    pub base_year: i32,
    /// Length of the summer holiday block following the last term.
    pub summer_holiday_days: u32,
    /// Terms per state/territory code, in calendar order.
    pub states: BTreeMap<String, Vec<TermDates>>,
}
