//! The alert document as persisted on disk
//!
//! The document has three top-level fields. `active_alerts` and `read_alerts`
//! belong to other writers and are only carried through; `alerts_by_time` is
//! the map the store actively maintains.

use crate::alerts::record::{AlertRecord, AlertsByTime};
use crate::error::StoreError;
use log::warn;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

pub const ACTIVE_ALERTS: &str = "active_alerts";
pub const READ_ALERTS: &str = "read_alerts";
pub const ALERTS_BY_TIME: &str = "alerts_by_time";

/// In-memory view of the alert document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlertDocument {
    /// Alerts currently active, owned by the surrounding application
    pub active_alerts: Vec<Value>,
    /// Alerts already acknowledged, owned by the surrounding application
    pub read_alerts: Vec<Value>,
    /// Alert definitions keyed by `HH:MM`
    pub alerts_by_time: AlertsByTime,
}

impl AlertDocument {
    /// Create the empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from a raw top-level JSON object
    ///
    /// Never fails. Missing fields get their empty default, fields of the
    /// wrong type are replaced by the default, and malformed alert records are
    /// left out of the in-memory view (they are still on disk and survive the
    /// next merge).
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let alerts_by_time = match map.get(ALERTS_BY_TIME) {
            None => AlertsByTime::new(),
            Some(Value::Object(entries)) => entries
                .iter()
                .filter_map(|(hour, raw)| match AlertRecord::from_json(hour, raw) {
                    Ok(record) => Some((hour.clone(), record)),
                    Err(e) => {
                        warn!("Skipping malformed alert: {}", e);
                        None
                    }
                })
                .collect(),
            Some(other) => {
                warn!(
                    "Field '{}' is not an object ({}), using an empty map",
                    ALERTS_BY_TIME,
                    json_type(other)
                );
                AlertsByTime::new()
            }
        };

        Self {
            active_alerts: list_field(map, ACTIVE_ALERTS),
            read_alerts: list_field(map, READ_ALERTS),
            alerts_by_time,
        }
    }

    /// Strictly check every alert record of a raw document
    ///
    /// # Returns
    ///
    /// The number of records checked
    ///
    /// # Errors
    ///
    /// Returns the first `StoreError::Validation` or `StoreError::NotAnObject`
    /// encountered, or `StoreError::Corrupt` if `alerts_by_time` is not an object.
    pub fn validate_map(map: &Map<String, Value>) -> Result<usize, StoreError> {
        match map.get(ALERTS_BY_TIME) {
            None => Ok(0),
            Some(Value::Object(entries)) => {
                for (hour, raw) in entries {
                    AlertRecord::from_json(hour, raw)?;
                }
                Ok(entries.len())
            }
            Some(other) => Err(StoreError::Corrupt(format!(
                "'{}' must be an object, found {}",
                ALERTS_BY_TIME,
                json_type(other)
            ))),
        }
    }

    /// Merge this document into the document found on disk
    ///
    /// The two lists are overwritten wholesale. `alerts_by_time` is merged key
    /// by key: hours held here replace or extend the on-disk map, hours only
    /// present on disk are kept. Any other top-level field on disk is untouched.
    pub fn merge_into(&self, on_disk: &mut Map<String, Value>) -> Result<(), serde_json::Error> {
        on_disk.insert(
            ACTIVE_ALERTS.to_string(),
            Value::Array(self.active_alerts.clone()),
        );
        on_disk.insert(
            READ_ALERTS.to_string(),
            Value::Array(self.read_alerts.clone()),
        );

        let by_time = on_disk
            .entry(ALERTS_BY_TIME)
            .or_insert_with(|| Value::Object(Map::new()));
        if !by_time.is_object() {
            warn!(
                "Replacing non-object '{}' ({}) on disk",
                ALERTS_BY_TIME,
                json_type(by_time)
            );
            *by_time = Value::Object(Map::new());
        }

        if let Value::Object(entries) = by_time {
            for (hour, record) in self.alerts_by_time.iter() {
                entries.insert(hour.to_string(), serde_json::to_value(record)?);
            }
        }
        Ok(())
    }

    /// Alerts whose `read` flag is false, in insertion order
    pub fn unread(&self) -> Vec<(&str, &AlertRecord)> {
        self.alerts_by_time
            .iter()
            .filter(|(_, record)| !record.read)
            .collect()
    }
}

/// Parse raw bytes into a top-level JSON object
pub fn parse_map(bytes: &[u8]) -> Result<Map<String, Value>, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Encode a top-level JSON object with the given indentation width
pub fn encode_map(map: &Map<String, Value>, indent: usize) -> Result<Vec<u8>, serde_json::Error> {
    let indent = " ".repeat(indent);
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    map.serialize(&mut serializer)?;
    Ok(buffer)
}

fn list_field(map: &Map<String, Value>, key: &str) -> Vec<Value> {
    match map.get(key) {
        None => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => {
            warn!(
                "Field '{}' is not a list ({}), using an empty list",
                key,
                json_type(other)
            );
            Vec::new()
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("Expected object, got {}", other),
        }
    }

    #[test]
    fn test_from_map_fills_missing_fields() {
        let doc = AlertDocument::from_map(&as_map(json!({"active_alerts": ["x"]})));

        assert_eq!(doc.active_alerts, vec![json!("x")]);
        assert!(doc.read_alerts.is_empty());
        assert!(doc.alerts_by_time.is_empty());
    }

    #[test]
    fn test_from_map_replaces_wrongly_typed_fields() {
        let doc = AlertDocument::from_map(&as_map(json!({
            "active_alerts": 5,
            "read_alerts": {"a": 1},
            "alerts_by_time": []
        })));

        assert_eq!(doc, AlertDocument::new());
    }

    #[test]
    fn test_from_map_skips_malformed_records() {
        let doc = AlertDocument::from_map(&as_map(json!({
            "alerts_by_time": {
                "07:00": {"Parameter": "Temperature", "Value": 30, "Message": "Too hot", "read": false},
                "08:00": {"Parameter": "Humidity"},
                "09:00": "not a record"
            }
        })));

        assert_eq!(doc.alerts_by_time.len(), 1);
        assert!(doc.alerts_by_time.contains_key("07:00"));
    }

    #[test]
    fn test_validate_map_reports_first_bad_record() {
        let map = as_map(json!({
            "alerts_by_time": {
                "07:00": {"Parameter": "Temperature", "Value": 30, "Message": "ok"},
                "08:00": {"Value": 1, "Message": "no parameter"}
            }
        }));

        match AlertDocument::validate_map(&map) {
            Err(StoreError::Validation { hour, field }) => {
                assert_eq!(hour, "08:00");
                assert_eq!(field, "Parameter");
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_map_counts_records() {
        let map = as_map(json!({
            "alerts_by_time": {
                "07:00": {"Parameter": "a", "Value": 1, "Message": "m"},
                "08:00": {"Parameter": "b", "Value": "x", "Message": "m", "read": true}
            }
        }));
        assert_eq!(AlertDocument::validate_map(&map).unwrap(), 2);
        assert_eq!(AlertDocument::validate_map(&Map::new()).unwrap(), 0);
    }

    #[test]
    fn test_merge_overwrites_lists_and_merges_map() {
        let mut on_disk = as_map(json!({
            "active_alerts": ["old"],
            "read_alerts": ["old"],
            "alerts_by_time": {
                "07:00": {"Parameter": "Temperature", "Value": 30, "Message": "disk", "read": true},
                "08:00": {"Parameter": "Humidity", "Value": 60, "Message": "disk only", "read": false}
            },
            "owner": "sensor-hub"
        }));

        let mut doc = AlertDocument::new();
        doc.active_alerts = vec![json!("new")];
        doc.alerts_by_time
            .insert("07:00", AlertRecord::new("Temperature", 31, "memory"));
        doc.alerts_by_time
            .insert("09:00", AlertRecord::new("CO2", 800, "added"));

        doc.merge_into(&mut on_disk).unwrap();

        assert_eq!(on_disk["active_alerts"], json!(["new"]));
        assert_eq!(on_disk["read_alerts"], json!([]));
        assert_eq!(on_disk["owner"], json!("sensor-hub"));

        let by_time = on_disk["alerts_by_time"].as_object().unwrap();
        assert_eq!(
            by_time.keys().collect::<Vec<_>>(),
            vec!["07:00", "08:00", "09:00"]
        );
        assert_eq!(by_time["07:00"]["Message"], json!("memory"));
        assert_eq!(by_time["07:00"]["read"], json!(false));
        assert_eq!(by_time["08:00"]["Message"], json!("disk only"));
    }

    #[test]
    fn test_merge_into_empty_map_produces_full_shape() {
        let mut on_disk = Map::new();
        AlertDocument::new().merge_into(&mut on_disk).unwrap();

        assert_eq!(
            Value::Object(on_disk),
            json!({"active_alerts": [], "read_alerts": [], "alerts_by_time": {}})
        );
    }

    #[test]
    fn test_encode_map_uses_requested_indent() {
        let map = as_map(json!({"active_alerts": []}));
        let encoded = String::from_utf8(encode_map(&map, 4).unwrap()).unwrap();
        assert_eq!(encoded, "{\n    \"active_alerts\": []\n}");
    }

    #[test]
    fn test_parse_map_rejects_non_objects() {
        assert!(parse_map(b"[1, 2, 3]").is_err());
        assert!(parse_map(b"{not json").is_err());
        assert!(parse_map(b"{}").unwrap().is_empty());
    }

    #[test]
    fn test_unread_filters_read_records() {
        let mut doc = AlertDocument::new();
        doc.alerts_by_time.insert("A", AlertRecord::new("p", 1, "unread"));
        let mut read = AlertRecord::new("p", 2, "read");
        read.read = true;
        doc.alerts_by_time.insert("B", read);

        let unread = doc.unread();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].0, "A");
    }
}
