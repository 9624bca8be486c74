//! Record projection
//!
//! Converts schema-less stored documents into the fixed four-field shape
//! returned by every endpoint.

use serde_json::Value;

use crate::types::{ProjectedRecord, StoredRecord, SENTINEL};

/// Project a stored document onto title, company, location and summary.
///
/// Missing and `null` fields become [`SENTINEL`]. Strings are copied verbatim;
/// any other JSON value is rendered as compact JSON text.
pub fn project(record: &StoredRecord) -> ProjectedRecord {
    ProjectedRecord {
        title: field(record, "title"),
        company: field(record, "company"),
        location: field(record, "location"),
        summary: field(record, "summary"),
    }
}

fn field(record: &StoredRecord, key: &str) -> String {
    match record.get(key) {
        None | Some(Value::Null) => SENTINEL.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
