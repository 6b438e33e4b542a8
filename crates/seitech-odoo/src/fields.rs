//! Accessors over raw ERP records.
//!
//! Odoo encodes "no value" as `false` for every field type, and many2one
//! fields as `[id, "display name"]`. These helpers read a field off a record
//! and return idiomatic Rust values.

use serde_json::Value;

pub fn many2one_id(record: &Value, field: &str) -> Option<i64> {
    match record.get(field)? {
        Value::Array(pair) => pair.first().and_then(Value::as_i64),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

pub fn many2one_name(record: &Value, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::Array(pair) => pair.get(1).and_then(Value::as_str).map(String::from),
        _ => None,
    }
}

/// String field, `None` for `false`, `null` and empty strings.
pub fn string(record: &Value, field: &str) -> Option<String> {
    record
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

pub fn string_or_empty(record: &Value, field: &str) -> String {
    string(record, field).unwrap_or_default()
}

pub fn i64_field(record: &Value, field: &str) -> i64 {
    record
        .get(field)
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .unwrap_or(0)
}

pub fn f64_field(record: &Value, field: &str) -> f64 {
    record.get(field).and_then(Value::as_f64).unwrap_or(0.0)
}

pub fn bool_field(record: &Value, field: &str) -> bool {
    record.get(field).and_then(Value::as_bool).unwrap_or(false)
}

/// List of ids from an x2many field.
pub fn ids(record: &Value, field: &str) -> Vec<i64> {
    record
        .get(field)
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default()
}

/// Base64 image field rendered as a data URL.
pub fn image_data_url(record: &Value, field: &str) -> Option<String> {
    string(record, field).map(|b64| format!("data:image/png;base64,{b64}"))
}

/// Replace `false` with `null` in every top-level field of a record.
pub fn nullify_false(record: Value) -> Value {
    match record {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| match v {
                    Value::Bool(false) => (k, Value::Null),
                    other => (k, other),
                })
                .collect(),
        ),
        other => other,
    }
}

/// Odoo datetimes are naive UTC strings: `YYYY-MM-DD HH:MM:SS`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_datetime(at: chrono::DateTime<chrono::Utc>) -> String {
    at.format(DATETIME_FORMAT).to_string()
}

pub fn parse_datetime(value: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .ok()
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

pub fn datetime_field(record: &Value, field: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    string(record, field).and_then(|s| parse_datetime(&s))
}
