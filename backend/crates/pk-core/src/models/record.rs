use serde_json::{Map, Value};

/// A raw entity record as returned by the host, including formatted-value annotations.
pub type Record = Map<String, Value>;

/// Normalise a GUID for use as an index key: lower case, no braces.
pub fn normalize_id(id: &str) -> String {
    id.trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .to_lowercase()
}

/// The record's primary id, normalised.
pub fn record_id(record: &Record, primary_id_attribute: &str) -> Option<String> {
    record
        .get(primary_id_attribute)
        .and_then(Value::as_str)
        .map(normalize_id)
}

/// The id a lookup field points at. Lookups come back as `_<name>_value`.
pub fn lookup_value(record: &Record, lookup: &str) -> Option<String> {
    record
        .get(&format!("_{lookup}_value"))
        .or_else(|| record.get(lookup))
        .and_then(Value::as_str)
        .map(normalize_id)
}

/// A field value as plain text, for searching and display.
pub fn field_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
