//! Error types for the child support engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the formula engine, the care calendar calculator and
//! the reference data loader can report.

use thiserror::Error;

/// The main error type for the child support engine.
///
/// All fallible operations return this error type. Ambiguous court order
/// exceptions are not errors; they are reported as warnings on the care
/// calculation result.
///
/// # Example
///
/// ```
/// use child_support_engine::error::EngineError;
///
/// let error = EngineError::UnsupportedYear { year: 2031 };
/// assert_eq!(error.to_string(), "No rate table available for assessment year 2031");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A numeric or structural input was missing or out of range.
    #[error("Invalid input '{field}': {message}")]
    Validation {
        /// The input field that failed validation.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A court order could not be resolved to a deterministic schedule.
    #[error("Malformed court order: {message}")]
    MalformedOrder {
        /// A description of the structural problem.
        message: String,
    },

    /// A state or territory code was not recognised.
    #[error("Unknown state or territory: {code}")]
    UnknownJurisdiction {
        /// The code that was supplied.
        code: String,
    },

    /// No reference rate table is loaded for the requested year.
    #[error("No rate table available for assessment year {year}")]
    UnsupportedYear {
        /// The requested assessment year.
        year: u16,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but is internally inconsistent.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// A description of the inconsistency.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        EngineError::MalformedOrder {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        EngineError::InvalidConfig {
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_displays_field_and_message() {
        let error = EngineError::validation("parent_a.taxable_income", "must not be negative");
        assert_eq!(
            error.to_string(),
            "Invalid input 'parent_a.taxable_income': must not be negative"
        );
    }

    #[test]
    fn test_malformed_order_displays_message() {
        let error = EngineError::malformed("pattern does not cover Sunday");
        assert_eq!(
            error.to_string(),
            "Malformed court order: pattern does not cover Sunday"
        );
    }

    #[test]
    fn test_unknown_jurisdiction_displays_code() {
        let error = EngineError::UnknownJurisdiction {
            code: "XYZ".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown state or territory: XYZ");
    }

    #[test]
    fn test_unsupported_year_displays_year() {
        let error = EngineError::UnsupportedYear { year: 2019 };
        assert_eq!(
            error.to_string(),
            "No rate table available for assessment year 2019"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/rates/2026.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/rates/2026.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_unsupported_year() -> EngineResult<()> {
            Err(EngineError::UnsupportedYear { year: 2000 })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_unsupported_year()?;
            Ok(())
        }

        assert!(matches!(
            propagates_error(),
            Err(EngineError::UnsupportedYear { year: 2000 })
        ));
    }
}
