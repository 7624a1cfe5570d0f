//! Alert records and the time-keyed collection that holds them
//!
//! An alert is attached to a time of day (`HH:MM`) and describes a threshold on
//! a monitored environmental parameter. The JSON field names (`Parameter`,
//! `Value`, `Message`, `read`) are part of the on-disk format and must not change.

use crate::error::StoreError;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Number, Value};
use std::fmt;

/// Threshold value of an alert
///
/// The store treats it as opaque: numbers and strings are both accepted and
/// written back exactly as they were given.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AlertValue {
    /// Numeric threshold (e.g. `30` or `412.5`)
    Number(Number),
    /// Free-form threshold (e.g. `"high"`)
    Text(String),
}

impl AlertValue {
    /// Interpret a raw command-line or form value
    ///
    /// Anything that parses as a JSON number is stored as a number, everything
    /// else is kept verbatim as text.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Number>(raw.trim()) {
            Ok(number) => AlertValue::Number(number),
            Err(_) => AlertValue::Text(raw.to_string()),
        }
    }
}

impl From<i32> for AlertValue {
    fn from(value: i32) -> Self {
        AlertValue::Number(value.into())
    }
}

impl From<i64> for AlertValue {
    fn from(value: i64) -> Self {
        AlertValue::Number(value.into())
    }
}

impl From<f64> for AlertValue {
    fn from(value: f64) -> Self {
        Number::from_f64(value)
            .map(AlertValue::Number)
            .unwrap_or_else(|| AlertValue::Text(value.to_string()))
    }
}

impl From<&str> for AlertValue {
    fn from(value: &str) -> Self {
        AlertValue::Text(value.to_string())
    }
}

impl From<String> for AlertValue {
    fn from(value: String) -> Self {
        AlertValue::Text(value)
    }
}

impl fmt::Display for AlertValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertValue::Number(n) => write!(f, "{}", n),
            AlertValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One alert definition attached to a trigger time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    /// Name of the monitored quantity (e.g. "Temperature")
    #[serde(rename = "Parameter")]
    pub parameter: String,
    /// Threshold value that triggers the alert
    #[serde(rename = "Value")]
    pub value: AlertValue,
    /// Human-readable description
    #[serde(rename = "Message")]
    pub message: String,
    /// Whether the alert has been acknowledged
    pub read: bool,
}

impl AlertRecord {
    /// Create a new, unread alert record
    pub fn new(
        parameter: impl Into<String>,
        value: impl Into<AlertValue>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            parameter: parameter.into(),
            value: value.into(),
            message: message.into(),
            read: false,
        }
    }

    /// Build a record from its raw JSON representation
    ///
    /// `Parameter`, `Value` and `Message` are required. `read` follows JSON
    /// truthiness: missing, `null`, `false`, `0`, `""`, `[]` and `{}` all count
    /// as unread. Unknown fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` naming the first required field that is
    /// missing or has the wrong type, or `StoreError::NotAnObject` if the record
    /// is not a JSON object at all.
    pub fn from_json(hour: &str, raw: &Value) -> Result<Self, StoreError> {
        let invalid = |field: &'static str| StoreError::Validation {
            hour: hour.to_string(),
            field,
        };

        let object = raw.as_object().ok_or_else(|| StoreError::NotAnObject {
            hour: hour.to_string(),
        })?;

        let parameter = object
            .get("Parameter")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("Parameter"))?;

        let value = match object.get("Value") {
            Some(Value::Number(n)) => AlertValue::Number(n.clone()),
            Some(Value::String(s)) => AlertValue::Text(s.clone()),
            _ => return Err(invalid("Value")),
        };

        let message = object
            .get("Message")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("Message"))?;

        Ok(Self {
            parameter: parameter.to_string(),
            value,
            message: message.to_string(),
            read: object.get("read").map_or(false, is_truthy),
        })
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}

/// Alerts keyed by hour, in insertion order
///
/// Inserting an existing hour replaces the record in place, a new hour is
/// appended at the end. Iteration order is insertion order, not chronological
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AlertsByTime(IndexMap<String, AlertRecord>);

impl AlertsByTime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the alert at `hour`, returning the previous record
    pub fn insert(&mut self, hour: impl Into<String>, record: AlertRecord) -> Option<AlertRecord> {
        self.0.insert(hour.into(), record)
    }

    pub fn get(&self, hour: &str) -> Option<&AlertRecord> {
        self.0.get(hour)
    }

    pub fn get_mut(&mut self, hour: &str) -> Option<&mut AlertRecord> {
        self.0.get_mut(hour)
    }

    pub fn contains_key(&self, hour: &str) -> bool {
        self.0.contains_key(hour)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(hour, record)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AlertRecord)> {
        self.0.iter().map(|(h, r)| (h.as_str(), r))
    }

    /// Hours in insertion order
    pub fn hours(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<(String, AlertRecord)> for AlertsByTime {
    fn from_iter<I: IntoIterator<Item = (String, AlertRecord)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
