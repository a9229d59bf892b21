//! Reference data for the child support engine.
//!
//! Rate tables are versioned by assessment year and loaded from YAML, either
//! from the copies embedded in the crate or from a directory on disk.
//!
//! # Example
//!
//! ```no_run
//! use child_support_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config").unwrap();
//! let rates = config.rates_for(2026).unwrap();
//! println!("Minimum annual rate: ${}", rates.minimum_annual_rate);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AgeGroupCosts, COST_BAND_COUNT, CareCostBucket, CareCostTable, CostBand, CostOfChildrenTable,
    FamilyTaxBenefitLimits, MixedAgeCosts, RateTables, SchoolTermsConfig, TermDates, YearRates,
};
