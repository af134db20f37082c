//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading a benefit
//! scheme configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{PassCeilings, RatePeriod, RateTable, SchemeConfig, SchemeMetadata};

/// Loads and provides access to a scheme configuration.
///
/// # Directory Structure
///
/// ```text
/// config/carmf/
/// ├── scheme.yaml         # Scheme metadata, reform date, class thresholds
/// ├── pass.yaml           # PASS ceiling per year
/// └── rates/
///     └── 2024.yaml       # One rate period per file
/// ```
///
/// # Example
///
/// ```no_run
/// use ij_engine::config::{ConfigLoader, RateTier};
/// use ij_engine::models::ContributionClass;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/carmf").unwrap();
/// let date = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
/// if let Some(period) = loader.config().rate_table().find_by_date(date) {
///     println!("Daily rate: {} EUR", period.rate(ContributionClass::A, RateTier::One));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: SchemeConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML (`ConfigParseError`)
    /// - Rate periods overlap or are inverted (`InvalidConfig`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<SchemeMetadata>(&path.join("scheme.yaml"))?;
        let pass = Self::load_yaml::<PassCeilings>(&path.join("pass.yaml"))?;
        let rates = Self::load_rates(&path.join("rates"))?;

        let config = SchemeConfig::new(metadata, RateTable::new(rates)?, pass);

        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all rate files from the rates directory.
    fn load_rates(rates_dir: &Path) -> EngineResult<Vec<RatePeriod>> {
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
                rates.push(Self::load_yaml::<RatePeriod>(&path)?);
            }
        }

        if rates.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rate files found)", rates_dir_str),
            });
        }

        Ok(rates)
    }

    /// Returns the underlying scheme configuration.
    pub fn config(&self) -> &SchemeConfig {
        &self.config
    }

    /// Returns the scheme metadata.
    pub fn scheme(&self) -> &SchemeMetadata {
        self.config.scheme()
    }
}
