use axum::{Json, extract::State, extract::rejection::JsonRejection};
use tracing::instrument;

use seitech_core::ApiResponse;

use crate::middleware::auth::AuthUser;
use crate::modules::cart::model::{AddToCartRequest, Cart, CartUpdate, SyncCartRequest};
use crate::modules::cart::service::CartService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::checked_body;

/// Partner owning the cart; demo sessions have none and shop as guests.
fn cart_partner(auth_user: Option<&AuthUser>) -> Option<i64> {
    auth_user.and_then(|user| user.0.partner_id)
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses((status = 200, description = "Current cart; empty for guests", body = Cart)),
    tag = "Cart"
)]
#[instrument(skip_all)]
pub async fn get_cart(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
) -> Result<ApiResponse<Cart>, AppError> {
    let cart = match cart_partner(auth_user.as_ref()) {
        Some(partner_id) => CartService::get_cart(&state.odoo, partner_id).await?,
        None => Cart::empty(),
    };
    Ok(ApiResponse::ok(cart))
}

#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 201, description = "Item added to cart", body = CartUpdate),
        (status = 400, description = "Invalid request data or course product not configured"),
        (status = 401, description = "Please log in to add items to cart"),
        (status = 404, description = "Course not found")
    ),
    tag = "Cart"
)]
#[instrument(skip_all)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
    body: Result<Json<AddToCartRequest>, JsonRejection>,
) -> Result<ApiResponse<CartUpdate>, AppError> {
    let dto = checked_body(body, "Invalid request data")?;
    let partner_id = cart_partner(auth_user.as_ref())
        .ok_or_else(|| AppError::unauthorized("Please log in to add items to cart"))?;

    let update = CartService::add_item(&state.odoo, partner_id, dto).await?;
    Ok(ApiResponse::created(update).with_message("Item added to cart"))
}

#[utoipa::path(
    post,
    path = "/api/cart/sync",
    request_body = SyncCartRequest,
    responses(
        (status = 200, description = "Cart synced successfully", body = CartUpdate),
        (status = 400, description = "Invalid cart data"),
        (status = 401, description = "Please log in to sync cart")
    ),
    tag = "Cart"
)]
#[instrument(skip_all)]
pub async fn sync_cart(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
    body: Result<Json<SyncCartRequest>, JsonRejection>,
) -> Result<ApiResponse<CartUpdate>, AppError> {
    let dto = checked_body(body, "Invalid cart data")?;
    let partner_id = cart_partner(auth_user.as_ref())
        .ok_or_else(|| AppError::unauthorized("Please log in to sync cart"))?;

    let update = CartService::sync(&state.odoo, partner_id, dto).await?;
    Ok(ApiResponse::ok(update).with_message("Cart synced successfully"))
}
