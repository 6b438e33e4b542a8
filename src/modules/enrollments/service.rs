use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, instrument};

use seitech_core::ApiResponse;

use crate::middleware::auth::AuthUser;
use crate::modules::enrollments::model::CreateEnrollmentRequest;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::proxy::record_fallback;

pub struct EnrollmentService;

impl EnrollmentService {
    /// The user's enrollments from the ERP, or from the demo store when the
    /// ERP does not answer with a successful envelope.
    #[instrument(skip_all, fields(user = %auth_user.email()))]
    pub async fn list(state: &AppState, auth_user: &AuthUser) -> Response {
        if let Some(sid) = auth_user.odoo_session() {
            match state.odoo.rest_get("/api/enrollments", &[], Some(sid)).await {
                Ok(response) if response.envelope_success() => {
                    return Json(response.body).into_response();
                }
                Ok(response) => debug!(status = response.status, "ERP declined enrollment listing"),
                Err(e) => record_fallback("enrollments", &e),
            }
        }

        let enrollments = state.demo.enrollments(auth_user.email()).await;
        ApiResponse::ok(enrollments).into_response()
    }

    #[instrument(skip_all, fields(user = %auth_user.email(), course_id = dto.course_id))]
    pub async fn enroll(
        state: &AppState,
        auth_user: &AuthUser,
        dto: CreateEnrollmentRequest,
    ) -> Result<Response, AppError> {
        if let Some(sid) = auth_user.odoo_session() {
            let body = json!({ "courseId": dto.course_id });
            match state.odoo.rest_post("/api/enrollments", &body, Some(sid)).await {
                Ok(response) if response.envelope_success() => {
                    return Ok((StatusCode::CREATED, Json(response.body)).into_response());
                }
                Ok(response) => debug!(status = response.status, "ERP declined enrollment"),
                Err(e) => record_fallback("enrollments", &e),
            }
        }

        let enrollment = state
            .demo
            .enroll(
                auth_user.email(),
                &auth_user.0.sub,
                dto.course_id,
                dto.course_name,
                dto.course_slug,
                dto.course_image,
            )
            .await
            .ok_or_else(|| {
                AppError::bad_request(anyhow::anyhow!("You are already enrolled in this course"))
            })?;

        Ok(ApiResponse::created(enrollment)
            .with_message("Successfully enrolled in course")
            .into_response())
    }
}
