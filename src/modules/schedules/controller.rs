use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use tracing::instrument;

use seitech_core::ApiResponse;

use crate::middleware::auth::AuthUser;
use crate::modules::schedules::model::{
    RegistrationRequest, RegistrationResult, ScheduleDetail, ScheduleList, ScheduleQuery,
};
use crate::modules::schedules::service::ScheduleService;
use crate::state::AppState;
use crate::utils::errors::AppError;

#[utoipa::path(
    get,
    path = "/api/schedules",
    params(ScheduleQuery),
    responses(
        (status = 200, description = "Live sessions, soonest first", body = ScheduleList),
        (status = 500, description = "Failed to fetch schedules")
    ),
    tag = "Schedules"
)]
#[instrument(skip(state))]
pub async fn get_schedules(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> Result<ApiResponse<ScheduleList>, AppError> {
    let list = ScheduleService::list(&state.odoo, query).await?;
    Ok(ApiResponse::ok(list))
}

#[utoipa::path(
    get,
    path = "/api/schedules/{id}",
    params(("id" = i64, Path, description = "Schedule ID")),
    responses(
        (status = 200, description = "Session with course and instructor", body = ScheduleDetail),
        (status = 404, description = "Schedule not found")
    ),
    tag = "Schedules"
)]
#[instrument(skip(state))]
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<ScheduleDetail>, AppError> {
    let schedule = ScheduleService::get(&state.odoo, id).await?;
    Ok(ApiResponse::ok(schedule))
}

#[utoipa::path(
    post,
    path = "/api/schedules/{id}/register",
    params(("id" = i64, Path, description = "Schedule ID")),
    request_body(content = RegistrationRequest, description = "Optional notes"),
    responses(
        (status = 200, description = "Registered", body = RegistrationResult),
        (status = 400, description = "Session closed, full, started, past its deadline or already joined"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Schedule not found")
    ),
    tag = "Schedules",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user, body))]
pub async fn register_for_schedule(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    body: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<ApiResponse<RegistrationResult>, AppError> {
    // The body is optional; anything unreadable counts as no notes.
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let result = ScheduleService::register(&state.odoo, auth_user.odoo_uid()?, id, request).await?;
    Ok(ApiResponse::ok(result)
        .with_message("Registration successful! You will receive a confirmation email shortly."))
}
