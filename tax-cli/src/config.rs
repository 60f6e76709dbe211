//! Optional TOML configuration file.
//!
//! ```toml
//! brackets = "data/tax_brackets.csv"
//! tax_year = 2025
//! strict = true
//! log_level = "debug"
//! log_file = "tax-estimate.log"
//!
//! [profile]
//! standard_deduction = 15000
//! pension_rate_percent = 9.3
//! pension_annual_cap = 8000
//! ```
//!
//! Every key is optional. Command-line flags take precedence over the file.
//! Relative paths are resolved against the directory holding the file.

use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{TaxProfile, lenient};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// The `[profile]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    #[serde(default, deserialize_with = "lenient")]
    pub standard_deduction: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub pension_rate_percent: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub pension_annual_cap: Option<Decimal>,
}

impl From<ProfileConfig> for TaxProfile {
    fn from(config: ProfileConfig) -> Self {
        TaxProfile {
            standard_deduction: config.standard_deduction,
            pension_rate_percent: config.pension_rate_percent,
            pension_annual_cap: config.pension_annual_cap,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub brackets: Option<PathBuf>,
    pub tax_year: Option<i32>,
    pub strict: Option<bool>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub profile: ProfileConfig,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(dir) = path.parent() {
            config.resolve_relative_to(dir);
        }
        Ok(config)
    }

    /// Rebases relative `brackets` and `log_file` paths onto `dir`.
    pub fn resolve_relative_to(
        &mut self,
        dir: &Path,
    ) {
        for path in [&mut self.brackets, &mut self.log_file].into_iter().flatten() {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
