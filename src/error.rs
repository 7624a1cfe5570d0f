use thiserror::Error;

/// Errors that can occur in the alert store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to persist alerts to {path}: {source}")]
    Persistence {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid alert at {hour}: field '{field}' is missing or has the wrong type")]
    Validation { hour: String, field: &'static str },

    #[error("Invalid alert at {hour}: expected a JSON object")]
    NotAnObject { hour: String },

    #[error("Alert document is corrupt: {0}")]
    Corrupt(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors that can occur when querying a trend provider
#[derive(Error, Debug)]
pub enum TrendError {
    #[error("Failed to read trend data: {0}")]
    ReadError(String),

    #[error("Failed to parse trend data: {0}")]
    ParseError(String),
}

/// Errors that can occur during configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Invalid configuration value: {0}")]
    ValidationError(String),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}
