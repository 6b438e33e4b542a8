//! The JSON envelope returned by every API route.
//!
//! ```json
//! { "success": true, "data": { ... }, "message": "Item added to cart" }
//! ```
//!
//! Some routes carry sibling fields next to `data` (`pagination`, `total`,
//! `count`); [`ApiResponse::with_field`] adds them.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    status: StatusCode,
    success: bool,
    data: T,
    message: Option<String>,
    extra: Map<String, Value>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            success: true,
            data,
            message: None,
            extra: Map::new(),
        }
    }

    pub fn created(data: T) -> Self {
        Self::ok(data).with_status(StatusCode::CREATED)
    }

    /// A `success: false` envelope that still carries data (empty lists,
    /// zeroed stats) for routes whose clients render the payload regardless.
    pub fn failure(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status,
            success: false,
            data,
            message: Some(message.into()),
            extra: Map::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_field(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn to_value(&self) -> Value {
        let mut body = Map::new();
        body.insert("success".into(), Value::Bool(self.success));
        body.insert(
            "data".into(),
            serde_json::to_value(&self.data).unwrap_or(Value::Null),
        );
        if let Some(message) = &self.message {
            body.insert("message".into(), Value::String(message.clone()));
        }
        for (key, value) in &self.extra {
            body.insert(key.clone(), value.clone());
        }
        Value::Object(body)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.to_value())).into_response()
    }
}

/// OpenAPI shape of the success envelope.
#[derive(Serialize, ToSchema)]
pub struct Envelope {
    pub success: bool,
    #[schema(value_type = Object)]
    pub data: Value,
    pub message: Option<String>,
}

/// OpenAPI shape of the failure envelope.
#[derive(Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
    #[schema(value_type = Object, nullable)]
    pub data: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_envelope_omits_missing_message() {
        let body = ApiResponse::ok(vec![1, 2]).to_value();
        assert_eq!(body, json!({ "success": true, "data": [1, 2] }));
    }

    #[test]
    fn test_created_with_message() {
        let response = ApiResponse::created(json!({ "orderId": 7 })).with_message("Item added to cart");
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response.to_value();
        assert_eq!(body["message"], "Item added to cart");
        assert_eq!(body["data"]["orderId"], 7);
    }

    #[test]
    fn test_extra_fields_sit_beside_data() {
        let body = ApiResponse::ok(Vec::<u8>::new())
            .with_field("pagination", json!({ "total": 0, "limit": 10, "offset": 0 }))
            .to_value();
        assert_eq!(body["pagination"]["limit"], 10);
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_failure_keeps_data() {
        let response = ApiResponse::failure(StatusCode::OK, Vec::<u8>::new(), "CMS service unavailable");
        let body = response.to_value();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "CMS service unavailable");
    }
}
