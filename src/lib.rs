//! Australian Child Support Formula Engine
//!
//! This crate computes annual child support under the eight-step basic
//! formula, including the multi-case adjustment, the minimum, fixed and
//! income support rates, non-parent carer payments and an estimate of the
//! Family Tax Benefit effects. It also projects parenting court orders into
//! nightly care calendars to derive the care percentages the formula uses.
//!
//! Rate tables and school term dates are reference data loaded from YAML;
//! see [`config`].

#![warn(missing_docs)]

pub mod calculation;
pub mod care;
pub mod config;
pub mod error;
pub mod models;
