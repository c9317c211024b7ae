//! Data Models Module
//!
//! This module defines the records IP Tracker works with: the free-form lookup
//! result returned by the service and the history entries kept per lookup.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Minimum number of characters a query must have before it is sent.
pub const MIN_QUERY_LEN: usize = 5;

/// Field added to a result when it is saved to disk.
pub const DATETIME_FIELD: &str = "datetime";

/// Metadata returned by the lookup service. The shape is whatever the
/// service sends; no schema is enforced.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct LookupResult {
    fields: Map<String, Value>,
}

impl LookupResult {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    /// Field name and rendered value pairs, in response order.
    pub fn rows(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.to_uppercase(), render_value(value)))
            .collect()
    }

    /// Flattens the result into one `[#] KEY : value` line per field.
    pub fn display_text(&self) -> String {
        self.rows()
            .iter()
            .map(|(key, value)| format!("[#] {} : {}\n", key, value))
            .collect()
    }
}

impl From<Map<String, Value>> for LookupResult {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

impl fmt::Display for LookupResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

/// Strings are shown bare, everything else as compact JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// One lookup in the history log.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoryRecord {
    #[serde(rename = "ip")]
    pub query: String,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
}

impl HistoryRecord {
    pub fn new(query: impl Into<String>, timestamp: f64) -> Self {
        Self {
            query: query.into(),
            timestamp,
        }
    }

    /// The timestamp as local wall-clock time, for display.
    pub fn datetime(&self) -> String {
        let millis = (self.timestamp * 1000.0) as i64;
        match chrono::DateTime::from_timestamp_millis(millis) {
            Some(utc) => utc
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            None => format!("{}", self.timestamp),
        }
    }
}

/// Current time in seconds since the epoch, with millisecond precision.
pub fn now_timestamp() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
