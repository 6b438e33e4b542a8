use anyhow::anyhow;
use axum::{
    extract::{Query, State},
    response::Response,
};
use tracing::instrument;

use crate::modules::orders::model::{CreateOrderRequest, OrderLookupQuery};
use crate::modules::orders::service::OrderService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::LenientJson;

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order placed with its enrollments"),
        (status = 400, description = "Customer email is required / No items in order"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Orders"
)]
#[instrument(skip_all)]
pub async fn create_order(
    State(state): State<AppState>,
    LenientJson(dto): LenientJson<CreateOrderRequest>,
) -> Result<Response, AppError> {
    OrderService::create(&state.odoo, dto).await
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(OrderLookupQuery),
    responses(
        (status = 200, description = "Orders for the email address, as returned by the ERP"),
        (status = 400, description = "Email is required")
    ),
    tag = "Orders"
)]
#[instrument(skip_all)]
pub async fn get_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderLookupQuery>,
) -> Result<Response, AppError> {
    let email = query
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AppError::bad_request(anyhow!("Email is required")))?;
    OrderService::by_email(&state.odoo, &email).await
}
