use anyhow::anyhow;
use axum::extract::{Path, Query, State};
use serde_json::Value;
use tracing::instrument;

use seitech_core::ApiResponse;

use crate::middleware::auth::AuthUser;
use crate::modules::recommendations::model::{
    GenerateRequest, RecommendationQuery, UpdateRecommendationRequest,
};
use crate::modules::recommendations::service::RecommendationService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::LenientJson;

#[utoipa::path(
    get,
    path = "/api/recommendations",
    params(RecommendationQuery),
    responses(
        (status = 200, description = "Course recommendations with course details"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Recommendations",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_recommendations(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<RecommendationQuery>,
) -> Result<ApiResponse<Vec<Value>>, AppError> {
    let recommendations = RecommendationService::list(&state.odoo, auth_user.odoo_uid()?, query).await?;
    Ok(ApiResponse::ok(recommendations))
}

#[utoipa::path(
    post,
    path = "/api/recommendations",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Newly generated recommendations"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Recommendations",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user, request))]
pub async fn generate_recommendations(
    State(state): State<AppState>,
    auth_user: AuthUser,
    LenientJson(request): LenientJson<GenerateRequest>,
) -> Result<ApiResponse<Vec<Value>>, AppError> {
    let recommendations = RecommendationService::generate(&state.odoo, auth_user.odoo_uid()?, request).await?;
    let message = format!("Generated {} new recommendations", recommendations.len());
    Ok(ApiResponse::ok(recommendations).with_message(message))
}

#[utoipa::path(
    patch,
    path = "/api/recommendations/{id}",
    params(("id" = i64, Path, description = "Recommendation ID")),
    request_body = UpdateRecommendationRequest,
    responses(
        (status = 200, description = "Recommendation status updated"),
        (status = 400, description = "Missing or unknown action"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Recommendation not found")
    ),
    tag = "Recommendations",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user, request))]
pub async fn update_recommendation(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    LenientJson(request): LenientJson<UpdateRecommendationRequest>,
) -> Result<ApiResponse<Value>, AppError> {
    let action = request.action().map_err(|msg| AppError::bad_request(anyhow!(msg)))?;
    let updated = RecommendationService::update(&state.odoo, auth_user.odoo_uid()?, id, action).await?;
    Ok(ApiResponse::ok(updated).with_message(format!("Recommendation {} successfully", action.as_str())))
}
