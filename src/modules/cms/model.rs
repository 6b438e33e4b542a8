use std::collections::HashMap;

use serde_json::{Value, json};

use crate::utils::proxy::query_pairs;

pub const TESTIMONIAL_FILTERS: &[&str] = &["service_type", "featured", "course_id", "limit", "offset"];
pub const FAQ_FILTERS: &[&str] = &["category_slug", "featured", "search", "limit", "offset"];
pub const SERVICE_FILTERS: &[&str] = &[
    "category_slug",
    "category_id",
    "featured",
    "homepage",
    "limit",
    "offset",
];
pub const PARTNER_FILTERS: &[&str] = &["type", "featured"];
pub const TEAM_FILTERS: &[&str] = &["department", "featured", "instructors"];
pub const STATISTIC_FILTERS: &[&str] = &["location", "type"];

/// Query parameters forwarded to the ERP: only the allowed keys, non-empty,
/// in a stable order.
pub fn forwarded_filters(params: &HashMap<String, String>, allowed: &[&str]) -> Vec<(String, String)> {
    query_pairs(params)
        .into_iter()
        .filter(|(key, _)| allowed.contains(&key.as_str()))
        .collect()
}

/// A default listing wrapped the way the ERP paginates CMS collections.
pub fn paginated(key: &str, items: Vec<Value>, limit: i64) -> Value {
    let total = items.len();
    json!({
        key: items,
        "pagination": { "total": total, "limit": limit, "offset": 0 },
    })
}

/// Payload of an ERP CMS envelope, when it reports success.
pub fn envelope_data(body: &Value) -> Option<Value> {
    match body.get("success") {
        Some(Value::Bool(true)) => Some(body.get("data").cloned().unwrap_or(Value::Null)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwarded_filters_drop_unknown_keys() {
        let params = HashMap::from([
            ("featured".to_string(), "true".to_string()),
            ("limit".to_string(), "5".to_string()),
            ("utm_source".to_string(), "mail".to_string()),
            ("course_id".to_string(), String::new()),
        ]);
        assert_eq!(
            forwarded_filters(&params, TESTIMONIAL_FILTERS),
            vec![
                ("featured".to_string(), "true".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_paginated_defaults() {
        let body = paginated("faqs", vec![json!({ "id": 1 }), json!({ "id": 2 })], 10);
        assert_eq!(body["faqs"].as_array().unwrap().len(), 2);
        assert_eq!(body["pagination"], json!({ "total": 2, "limit": 10, "offset": 0 }));
    }

    #[test]
    fn test_envelope_data_requires_explicit_success() {
        assert_eq!(
            envelope_data(&json!({ "success": true, "data": [1] })),
            Some(json!([1]))
        );
        assert_eq!(envelope_data(&json!({ "success": false, "data": [1] })), None);
        assert_eq!(envelope_data(&json!({ "data": [1] })), None);
    }
}
