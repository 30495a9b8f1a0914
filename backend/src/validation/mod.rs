//! JSON Schema validation for persisted canonical records.
//!
//! The schema is embedded at compile time from
//! `schemas/canonical-records.json` and checked with JSON Schema Draft 7.
//! It pins the camelCase wire shape of [`Record`](crate::models::Record):
//! every field present, strings for text, numbers for the three metrics,
//! and a non-empty `dateKey` and `subject`.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use scorecard::validation::validate_records;
//!
//! let stored = json!([{ "dateKey": "2024-01" }]);
//! let errors = validate_records(&stored).unwrap_err();
//! assert!(!errors.is_empty());
//! ```

use serde_json::Value;

const RECORDS_SCHEMA: &str = include_str!("../../schemas/canonical-records.json");

/// Validate a JSON value against a schema.
///
/// Returns every validation error message on failure.
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn records_schema() -> Result<Value, Vec<String>> {
    serde_json::from_str(RECORDS_SCHEMA).map_err(|e| vec![format!("Invalid embedded schema: {}", e)])
}

/// Validate a stored record array.
pub fn validate_records(data: &Value) -> Result<(), Vec<String>> {
    validate(&records_schema()?, data)
}
