//! Court order validation.
//!
//! A [`ValidatedOrder`] is built from a raw [`CourtOrderJson`] and is the
//! only form the care calculator accepts. Every structural problem is found
//! here, before any night is projected.

use chrono::{NaiveDate, Weekday};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::CourtOrderJson;

use super::exceptions::ExceptionRule;
use super::pattern::BasePattern;

/// Parses a weekday name.
///
/// Accepts full names, three-letter forms and the common short aliases, in
/// any case.
///
/// # Example
///
/// ```
/// use child_support_engine::care::parse_weekday;
/// use chrono::Weekday;
///
/// assert_eq!(parse_weekday("THURS").unwrap(), Weekday::Thu);
/// assert_eq!(parse_weekday("su").unwrap(), Weekday::Sun);
/// assert!(parse_weekday("funday").is_err());
/// ```
pub fn parse_weekday(name: &str) -> EngineResult<Weekday> {
    let weekday = match name.trim().to_ascii_lowercase().as_str() {
        "monday" | "mon" | "mo" => Weekday::Mon,
        "tuesday" | "tue" | "tues" | "tu" => Weekday::Tue,
        "wednesday" | "wed" | "we" => Weekday::Wed,
        "thursday" | "thu" | "thur" | "thurs" | "th" => Weekday::Thu,
        "friday" | "fri" | "fr" => Weekday::Fri,
        "saturday" | "sat" | "sa" => Weekday::Sat,
        "sunday" | "sun" | "su" => Weekday::Sun,
        _ => {
            return Err(EngineError::malformed(format!(
                "unrecognised weekday name '{name}'"
            )));
        }
    };
    Ok(weekday)
}

/// A court order that has passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOrder {
    start_date: Option<NaiveDate>,
    pattern: BasePattern,
    exceptions: Vec<ExceptionRule>,
}

impl ValidatedOrder {
    /// Validates a raw order.
    ///
    /// # Errors
    ///
    /// Returns `MalformedOrder` describing the first problem found in the
    /// pattern or, prefixed with its position, in an exception.
    pub fn new(order: &CourtOrderJson) -> EngineResult<Self> {
        let pattern = BasePattern::from_json(&order.pattern).inspect_err(|error| {
            warn!(error = %error, "rejected court order pattern");
        })?;

        let exceptions = order
            .exceptions
            .iter()
            .enumerate()
            .map(|(index, exception)| {
                ExceptionRule::from_json(exception).map_err(|error| {
                    let error = match error {
                        EngineError::MalformedOrder { message } => {
                            EngineError::malformed(format!("exceptions[{index}]: {message}"))
                        }
                        other => other,
                    };
                    warn!(error = %error, "rejected court order exception");
                    error
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        debug!(
            period_days = pattern.period_days(),
            exceptions = exceptions.len(),
            "validated court order"
        );

        Ok(Self {
            start_date: order.start_date,
            pattern,
            exceptions,
        })
    }

    /// Parses and validates an order from JSON text.
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        Self::new(&CourtOrderJson::from_json_str(json)?)
    }

    /// The order's own start date, if given.
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    /// The base pattern.
    pub fn pattern(&self) -> &BasePattern {
        &self.pattern
    }

    /// Exceptions in order of appearance.
    pub fn exceptions(&self) -> &[ExceptionRule] {
        &self.exceptions
    }

    /// Returns true if any exception depends on school term dates.
    pub fn needs_school_calendar(&self) -> bool {
        self.exceptions
            .iter()
            .any(|e| matches!(e, ExceptionRule::SchoolHolidays { .. }))
    }
}
