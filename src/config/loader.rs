//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading rate tables and
//! school term calendars from YAML files, and the built-in copies of those
//! files embedded at compile time.

use std::fs;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use crate::care::SchoolCalendar;
use crate::error::{EngineError, EngineResult};

use super::types::{RateTables, SchoolTermsConfig, YearRates};

const BUILTIN_RATE_FILES: [(&str, &str); 2] = [
    (
        "config/rates/2025.yaml",
        include_str!("../../config/rates/2025.yaml"),
    ),
    (
        "config/rates/2026.yaml",
        include_str!("../../config/rates/2026.yaml"),
    ),
];

const BUILTIN_SCHOOL_TERMS: (&str, &str) = (
    "config/school_terms.yaml",
    include_str!("../../config/school_terms.yaml"),
);

static BUILTIN_RATES: LazyLock<Result<Arc<RateTables>, String>> = LazyLock::new(|| {
    let rates = BUILTIN_RATE_FILES
        .iter()
        .map(|(path, content)| parse_yaml::<YearRates>(content, path))
        .collect::<EngineResult<Vec<_>>>()
        .and_then(RateTables::new);
    rates.map(Arc::new).map_err(|e| e.to_string())
});

static BUILTIN_CALENDAR: LazyLock<Result<Arc<SchoolCalendar>, String>> = LazyLock::new(|| {
    let (path, content) = BUILTIN_SCHOOL_TERMS;
    parse_yaml::<SchoolTermsConfig>(content, path)
        .and_then(SchoolCalendar::from_config)
        .map(Arc::new)
        .map_err(|e| e.to_string())
});

fn parse_yaml<T: serde::de::DeserializeOwned>(content: &str, path: &str) -> EngineResult<T> {
    serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
        path: path.to_string(),
        message: e.to_string(),
    })
}

fn builtin<T>(cell: &LazyLock<Result<Arc<T>, String>>) -> EngineResult<Arc<T>> {
    match LazyLock::force(cell) {
        Ok(value) => Ok(Arc::clone(value)),
        Err(message) => Err(EngineError::invalid_config(message.clone())),
    }
}

impl RateTables {
    /// Returns the rate tables shipped with the crate.
    ///
    /// The embedded YAML is parsed once per process.
    ///
    /// # Example
    ///
    /// ```
    /// use child_support_engine::config::RateTables;
    ///
    /// let tables = RateTables::builtin().unwrap();
    /// let rates = tables.get(2026).unwrap();
    /// assert_eq!(rates.self_support_amount.to_string(), "31046");
    /// ```
    pub fn builtin() -> EngineResult<Arc<RateTables>> {
        builtin(&BUILTIN_RATES)
    }
}

impl SchoolCalendar {
    /// Returns the school term calendar shipped with the crate.
    pub fn builtin() -> EngineResult<Arc<SchoolCalendar>> {
        builtin(&BUILTIN_CALENDAR)
    }
}

/// Loads and provides access to the reference data.
///
/// The `ConfigLoader` reads YAML files from a directory so that republished
/// rates can be used without rebuilding the crate.
///
/// # Directory Structure
///
/// ```text
/// config/
/// ├── school_terms.yaml  # Term dates per state/territory
/// └── rates/
///     ├── 2025.yaml      # One file per assessment year
///     └── 2026.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use child_support_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config").unwrap();
/// let rates = loader.rates_for(2026).unwrap();
/// println!("Self-support amount: ${}", rates.self_support_amount);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    rates: Arc<RateTables>,
    school_calendar: Arc<SchoolCalendar>,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `school_terms.yaml` or the `rates` directory is missing
    /// - Any file contains invalid YAML
    /// - Any table fails validation
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let terms = Self::load_yaml::<SchoolTermsConfig>(&path.join("school_terms.yaml"))?;
        let school_calendar = SchoolCalendar::from_config(terms)?;

        let rates = RateTables::new(Self::load_rates(&path.join("rates"))?)?;

        tracing::info!(
            path = %path.display(),
            years = ?rates.years().collect::<Vec<_>>(),
            "loaded child support reference data"
        );

        Ok(Self {
            rates: Arc::new(rates),
            school_calendar: Arc::new(school_calendar),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        parse_yaml(&content, &path_str)
    }

    /// Loads all rate files from the rates directory.
    fn load_rates(rates_dir: &Path) -> EngineResult<Vec<YearRates>> {
        let rates_dir_str = rates_dir.display().to_string();

        let entries = fs::read_dir(rates_dir).map_err(|_| EngineError::ConfigNotFound {
            path: rates_dir_str.clone(),
        })?;

        let mut rates = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: rates_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                rates.push(Self::load_yaml::<YearRates>(&path)?);
            }
        }

        if rates.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rate files found)", rates_dir_str),
            });
        }

        Ok(rates)
    }

    /// Returns the loaded rate tables, shareable across engines.
    pub fn rate_tables(&self) -> Arc<RateTables> {
        Arc::clone(&self.rates)
    }

    /// Returns the loaded school term calendar.
    pub fn school_calendar(&self) -> Arc<SchoolCalendar> {
        Arc::clone(&self.school_calendar)
    }

    /// Gets the rates for one assessment year.
    pub fn rates_for(&self, year: u16) -> EngineResult<&YearRates> {
        self.rates.get(year)
    }
}
