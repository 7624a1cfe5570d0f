use crate::alerts::{DEFAULT_ALERTS_PATH, DEFAULT_INDENT};
use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration loaded from a TOML file
///
/// Every section and field is optional; anything left out falls back to its
/// default.
///
/// ```toml
/// [store]
/// path = "alerts.json"
/// indent = 4
///
/// [trends]
/// data_file = "trends.json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Alert store settings
    pub store: StoreConfig,
    /// Trend provider settings
    pub trends: TrendConfig,
}

/// Settings of the alert store
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Path of the JSON alert document
    pub path: PathBuf,
    /// Indentation width of the written JSON
    pub indent: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_ALERTS_PATH),
            indent: DEFAULT_INDENT,
        }
    }
}

/// Settings of the trend provider
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrendConfig {
    /// JSON file holding averaged and detailed readings, if any
    pub data_file: Option<PathBuf>,
}

impl Config {
    /// Load and validate configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file cannot be read,
    /// `ConfigError::TomlError` if it is not valid TOML for this schema, and
    /// `ConfigError::ValidationError` if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that all values are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "store.path must not be empty".to_string(),
            ));
        }
        if self.store.indent > 16 {
            return Err(ConfigError::ValidationError(format!(
                "store.indent must be at most 16, got {}",
                self.store.indent
            )));
        }
        if let Some(data_file) = &self.trends.data_file {
            if data_file.as_os_str().is_empty() {
                return Err(ConfigError::ValidationError(
                    "trends.data_file must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}
