//! Relaying ERP REST controllers.
//!
//! Passthrough routes forward query strings to the ERP and hand its status
//! and JSON body back unchanged. When the ERP answers with something that is
//! not JSON the client gets a 502 envelope.

use std::collections::HashMap;
use std::fmt::Display;

use anyhow::anyhow;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;

use seitech_odoo::RestResponse;

use crate::metrics::track_demo_fallback;
use crate::utils::errors::AppError;

pub fn relay(response: RestResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    if response.is_json {
        (status, Json(response.body)).into_response()
    } else {
        AppError::new(
            StatusCode::BAD_GATEWAY,
            anyhow!("Invalid response from server"),
        )
        .into_response()
    }
}

/// Query parameters as sorted pairs, so forwarded URLs and cache keys are
/// stable.
pub fn query_pairs(params: &HashMap<String, String>) -> Vec<(String, String)> {
    let mut pairs: Vec<_> = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    pairs.sort();
    pairs
}

/// Log and count a route answering from demo data.
pub fn record_fallback(route: &'static str, error: impl Display) {
    warn!(route, error = %error, "ERP unavailable, serving demo data");
    track_demo_fallback(route);
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    #[test]
    fn test_query_pairs_sorted_and_compacted() {
        let params = HashMap::from([
            ("search".to_string(), "fire".to_string()),
            ("category".to_string(), String::new()),
            ("limit".to_string(), "10".to_string()),
        ]);
        assert_eq!(
            query_pairs(&params),
            vec![
                ("limit".to_string(), "10".to_string()),
                ("search".to_string(), "fire".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_relay_mirrors_status() {
        let response = relay(RestResponse {
            status: 404,
            body: json!({ "success": false, "message": "Course not found" }),
            is_json: true,
        });
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["message"], "Course not found");
    }

    #[test]
    fn test_relay_non_json_is_bad_gateway() {
        let response = relay(RestResponse {
            status: 200,
            body: Value::Null,
            is_json: false,
        });
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
