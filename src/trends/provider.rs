use crate::error::TrendError;
use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Metrics of one trend entry (e.g. `Date`, `Temperature`, `Humidity`, `CO2`)
pub type TrendMetrics = Map<String, Value>;

/// Detailed readings: date -> hour -> metrics
pub type DetailedData = BTreeMap<String, BTreeMap<String, TrendMetrics>>;

/// Trait for external sources of historical environmental readings
#[cfg_attr(test, mockall::automock)]
pub trait TrendProvider {
    /// Daily averaged readings, each entry carrying its `Date`
    fn averaged_trend(&self) -> Result<Vec<TrendMetrics>, TrendError>;

    /// Hourly readings grouped by date
    fn detailed_data(&self) -> Result<DetailedData, TrendError>;
}

/// On-disk layout read by [`JsonTrendProvider`]
#[derive(Debug, Default, Deserialize)]
struct TrendFile {
    #[serde(default)]
    averaged: Vec<TrendMetrics>,
    #[serde(default)]
    detailed: DetailedData,
}

/// Trend provider backed by a JSON file
///
/// The file is read on every query; nothing is cached.
///
/// ```json
/// {
///   "averaged": [{"Date": "2024-05-01", "Temperature": 21.4}],
///   "detailed": {"2024-05-01": {"08:00": {"Temperature": 19.8}}}
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JsonTrendProvider {
    path: PathBuf,
}

impl JsonTrendProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_file(&self) -> Result<TrendFile, TrendError> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            TrendError::ReadError(format!("{}: {}", self.path.display(), e))
        })?;
        let file: TrendFile = serde_json::from_str(&content).map_err(|e| {
            TrendError::ParseError(format!("{}: {}", self.path.display(), e))
        })?;
        debug!(
            "Read {} averaged and {} detailed trend days from {}",
            file.averaged.len(),
            file.detailed.len(),
            self.path.display()
        );
        Ok(file)
    }
}

impl TrendProvider for JsonTrendProvider {
    fn averaged_trend(&self) -> Result<Vec<TrendMetrics>, TrendError> {
        Ok(self.read_file()?.averaged)
    }

    fn detailed_data(&self) -> Result<DetailedData, TrendError> {
        Ok(self.read_file()?.detailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_json_provider_reads_both_sections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trends.json");
        fs::write(
            &path,
            json!({
                "averaged": [{"Date": "2024-05-01", "Temperature": 21.4}],
                "detailed": {"2024-05-01": {"08:00": {"Temperature": 19.8}}}
            })
            .to_string(),
        )
        .unwrap();

        let provider = JsonTrendProvider::new(&path);
        let averaged = provider.averaged_trend().unwrap();
        let detailed = provider.detailed_data().unwrap();

        assert_eq!(averaged.len(), 1);
        assert_eq!(averaged[0]["Temperature"], json!(21.4));
        assert_eq!(detailed["2024-05-01"]["08:00"]["Temperature"], json!(19.8));
    }

    #[test]
    fn test_json_provider_missing_sections_are_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trends.json");
        fs::write(&path, "{}").unwrap();

        let provider = JsonTrendProvider::new(&path);
        assert!(provider.averaged_trend().unwrap().is_empty());
        assert!(provider.detailed_data().unwrap().is_empty());
    }

    #[test]
    fn test_json_provider_errors() {
        let dir = tempdir().unwrap();
        let missing = JsonTrendProvider::new(dir.path().join("missing.json"));
        assert!(matches!(
            missing.averaged_trend(),
            Err(TrendError::ReadError(_))
        ));

        let path = dir.path().join("bad.json");
        fs::write(&path, "not json").unwrap();
        let bad = JsonTrendProvider::new(&path);
        assert!(matches!(bad.detailed_data(), Err(TrendError::ParseError(_))));
    }
}
