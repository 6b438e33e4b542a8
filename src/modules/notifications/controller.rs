use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use serde_json::{Value, json};
use tracing::instrument;

use seitech_core::ApiResponse;

use crate::middleware::auth::AuthUser;
use crate::modules::notifications::model::{
    CreateNotificationRequest, Notification, NotificationPage, NotificationQuery, ReadAllResult,
};
use crate::modules::notifications::service::NotificationService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::checked_body;

#[utoipa::path(
    get,
    path = "/api/notifications",
    params(NotificationQuery),
    responses(
        (status = 200, description = "The user's notifications, newest first", body = NotificationPage),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Notifications",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_notifications(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<NotificationQuery>,
) -> Result<ApiResponse<NotificationPage>, AppError> {
    let page = NotificationService::list(&state.odoo, auth_user.odoo_uid()?, query).await?;
    Ok(ApiResponse::ok(page))
}

#[utoipa::path(
    post,
    path = "/api/notifications",
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification created"),
        (status = 400, description = "Missing required fields: notification_type, title, message"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Notifications",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip_all)]
pub async fn create_notification(
    State(state): State<AppState>,
    auth_user: AuthUser,
    body: Result<Json<CreateNotificationRequest>, JsonRejection>,
) -> Result<ApiResponse<Value>, AppError> {
    let dto = checked_body(body, "Missing required fields: notification_type, title, message")?;
    let id = NotificationService::create(&state.odoo, auth_user.odoo_uid()?, dto).await?;
    Ok(ApiResponse::created(json!({ "id": id })).with_message("Notification created"))
}

#[utoipa::path(
    get,
    path = "/api/notifications/{id}",
    params(("id" = i64, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification", body = Notification),
        (status = 404, description = "Notification not found")
    ),
    tag = "Notifications",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_notification(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Notification>, AppError> {
    let notification = NotificationService::get_owned(&state.odoo, auth_user.odoo_uid()?, id).await?;
    Ok(ApiResponse::ok(notification))
}

#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    params(("id" = i64, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification deleted"),
        (status = 404, description = "Notification not found")
    ),
    tag = "Notifications",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_notification(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Value>, AppError> {
    NotificationService::delete(&state.odoo, auth_user.odoo_uid()?, id).await?;
    Ok(ApiResponse::ok(Value::Null).with_message("Notification deleted"))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    params(("id" = i64, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked as read"),
        (status = 404, description = "Notification not found")
    ),
    tag = "Notifications",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Value>, AppError> {
    NotificationService::mark_read(&state.odoo, auth_user.odoo_uid()?, id).await?;
    Ok(ApiResponse::ok(Value::Null).with_message("Notification marked as read"))
}

#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    responses((status = 200, description = "Unread notifications marked as read", body = ReadAllResult)),
    tag = "Notifications",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip_all)]
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<ReadAllResult>, AppError> {
    let count = NotificationService::mark_all_read(&state.odoo, auth_user.odoo_uid()?).await?;
    Ok(ApiResponse::ok(ReadAllResult { count }).with_field("count", count))
}
