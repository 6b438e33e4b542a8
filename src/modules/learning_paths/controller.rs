use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use serde_json::Value;
use tracing::instrument;

use seitech_core::ApiResponse;

use crate::middleware::auth::AuthUser;
use crate::modules::learning_paths::model::{
    CreateLearningPathRequest, LearningPathQuery, PathAction, PathActionRequest, PathActionResult,
    UpdateLearningPathRequest,
};
use crate::modules::learning_paths::service::LearningPathService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::{LenientJson, checked_body};

#[utoipa::path(
    get,
    path = "/api/learning-paths",
    params(LearningPathQuery),
    responses(
        (status = 200, description = "The user's learning paths, most recently active first"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Learning Paths",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_learning_paths(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<LearningPathQuery>,
) -> Result<ApiResponse<Vec<Value>>, AppError> {
    let (paths, pagination) = LearningPathService::list(&state.odoo, auth_user.odoo_uid()?, query).await?;
    Ok(ApiResponse::ok(paths).with_field("pagination", pagination))
}

#[utoipa::path(
    post,
    path = "/api/learning-paths",
    request_body = CreateLearningPathRequest,
    responses(
        (status = 201, description = "Learning path created successfully"),
        (status = 400, description = "Name is required"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Learning Paths",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip_all)]
pub async fn create_learning_path(
    State(state): State<AppState>,
    auth_user: AuthUser,
    body: Result<Json<CreateLearningPathRequest>, JsonRejection>,
) -> Result<ApiResponse<Value>, AppError> {
    let dto = checked_body(body, "Name is required")?;
    let path = LearningPathService::create(&state.odoo, auth_user.odoo_uid()?, dto).await?;
    Ok(ApiResponse::created(path).with_message("Learning path created successfully"))
}

#[utoipa::path(
    get,
    path = "/api/learning-paths/{id}",
    params(("id" = i64, Path, description = "Learning path ID")),
    responses(
        (status = 200, description = "Learning path with nodes and skills"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Learning path not found")
    ),
    tag = "Learning Paths",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_learning_path(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Value>, AppError> {
    let path = LearningPathService::get(&state.odoo, auth_user.odoo_uid()?, id).await?;
    Ok(ApiResponse::ok(path))
}

#[utoipa::path(
    patch,
    path = "/api/learning-paths/{id}",
    params(("id" = i64, Path, description = "Learning path ID")),
    request_body = UpdateLearningPathRequest,
    responses(
        (status = 200, description = "Learning path updated successfully"),
        (status = 400, description = "No valid fields to update"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Learning path not found")
    ),
    tag = "Learning Paths",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_learning_path(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    LenientJson(dto): LenientJson<UpdateLearningPathRequest>,
) -> Result<ApiResponse<Value>, AppError> {
    let path = LearningPathService::update(&state.odoo, auth_user.odoo_uid()?, id, dto).await?;
    Ok(ApiResponse::ok(path).with_message("Learning path updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/learning-paths/{id}",
    params(("id" = i64, Path, description = "Learning path ID")),
    responses(
        (status = 200, description = "Learning path deleted successfully"),
        (status = 400, description = "Can only delete draft or cancelled learning paths"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Learning path not found")
    ),
    tag = "Learning Paths",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_learning_path(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Value>, AppError> {
    LearningPathService::delete(&state.odoo, auth_user.odoo_uid()?, id).await?;
    Ok(ApiResponse::ok(Value::Null).with_message("Learning path deleted successfully"))
}

#[utoipa::path(
    post,
    path = "/api/learning-paths/{id}/actions",
    params(("id" = i64, Path, description = "Learning path ID")),
    request_body = PathActionRequest,
    responses(
        (status = 200, description = "Action executed; returns progress and the action's result", body = PathActionResult),
        (status = 400, description = "Missing or unknown action"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Learning path not found")
    ),
    tag = "Learning Paths",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user, request))]
pub async fn run_learning_path_action(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    LenientJson(request): LenientJson<PathActionRequest>,
) -> Result<ApiResponse<PathActionResult>, AppError> {
    let name = request.action.clone().unwrap_or_default();
    let action = PathAction::from_request(request).map_err(|msg| AppError::bad_request(anyhow!(msg)))?;

    let result = LearningPathService::run_action(&state.odoo, auth_user.odoo_uid()?, id, action).await?;
    Ok(ApiResponse::ok(result).with_message(format!("Action '{name}' executed successfully")))
}
