/// Error types for the alert store
pub mod error;

/// Alert records, the persisted document and the merge-on-save store
pub mod alerts;

/// Storage backends the alert document is persisted to
pub mod storage;

/// Trend provider boundary and date lookups
pub mod trends;

/// Configuration management
pub mod config;

// Re-export commonly used types
pub use alerts::{AlertDocument, AlertRecord, AlertStore, AlertValue, AlertsByTime};
pub use error::{ConfigError, StoreError, TrendError};
