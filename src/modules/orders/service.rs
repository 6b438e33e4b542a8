use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::{info, instrument, warn};

use seitech_core::ApiResponse;
use seitech_odoo::OdooClient;

use crate::modules::orders::model::CreateOrderRequest;
use crate::utils::url::encode_component;
use crate::utils::errors::AppError;

pub struct OrderService;

impl OrderService {
    /// Place an order with the ERP. Its decline is relayed with the ERP's
    /// status and error text.
    #[instrument(skip_all, fields(items = dto.items.len()))]
    pub async fn create(odoo: &OdooClient, dto: CreateOrderRequest) -> Result<Response, AppError> {
        let customer = dto
            .validate()
            .map_err(|msg| AppError::bad_request(anyhow::anyhow!(msg)))?;
        let payload = dto.erp_payload(customer);

        let response = odoo
            .rest_post("/api/orders", &payload, None)
            .await
            .map_err(|e| AppError::upstream(anyhow::Error::new(e).context("Internal server error")))?;

        if !response.envelope_success() || !response.is_json {
            warn!(status = response.status, "ERP declined order");
            let status = StatusCode::from_u16(response.status)
                .ok()
                .filter(|s| !s.is_success())
                .unwrap_or(StatusCode::BAD_REQUEST);
            let message = response
                .body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Failed to create order");
            return Ok(ApiResponse::failure(status, Value::Null, message).into_response());
        }

        let data = response.body.get("data").cloned().unwrap_or(Value::Null);
        info!(order = ?data.get("orderReference"), "Order placed");
        Ok(ApiResponse::ok(data).into_response())
    }

    /// Orders placed under an email address, relayed as the ERP returns them.
    #[instrument(skip(odoo))]
    pub async fn by_email(odoo: &OdooClient, email: &str) -> Result<Response, AppError> {
        let response = odoo
            .rest_get(&format!("/api/orders/by-email/{}", encode_component(email)), &[], None)
            .await
            .map_err(|e| AppError::upstream(anyhow::Error::new(e).context("Internal server error")))?;
        Ok(Json(response.body).into_response())
    }
}
