use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::Response,
};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::enrollments::model::CreateEnrollmentRequest;
use crate::modules::enrollments::service::EnrollmentService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::checked_body;

const LOGIN_REQUIRED: &str = "Unauthorized. Please log in.";

#[utoipa::path(
    get,
    path = "/api/enrollments",
    responses(
        (status = 200, description = "The user's enrollments"),
        (status = 401, description = "Unauthorized. Please log in.")
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip_all)]
pub async fn get_enrollments(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
) -> Result<Response, AppError> {
    let auth_user = auth_user.ok_or_else(|| AppError::unauthorized(LOGIN_REQUIRED))?;
    Ok(EnrollmentService::list(&state, &auth_user).await)
}

#[utoipa::path(
    post,
    path = "/api/enrollments",
    request_body = CreateEnrollmentRequest,
    responses(
        (status = 201, description = "Successfully enrolled in course"),
        (status = 400, description = "Invalid request data or already enrolled"),
        (status = 401, description = "Unauthorized. Please log in.")
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip_all)]
pub async fn create_enrollment(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
    body: Result<Json<CreateEnrollmentRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let dto = checked_body(body, "Invalid request data")?;
    let auth_user = auth_user.ok_or_else(|| AppError::unauthorized(LOGIN_REQUIRED))?;
    EnrollmentService::enroll(&state, &auth_user, dto).await
}
