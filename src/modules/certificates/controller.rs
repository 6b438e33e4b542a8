use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::Response,
};
use tracing::instrument;

use seitech_core::ApiResponse;

use crate::middleware::auth::AuthUser;
use crate::modules::certificates::model::{VerifiedCertificate, VerifyCertificateRequest};
use crate::modules::certificates::service::CertificateService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::checked_body;

#[utoipa::path(
    get,
    path = "/api/certificates",
    responses(
        (status = 200, description = "The user's certificates"),
        (status = 401, description = "Unauthorized. Please log in.")
    ),
    tag = "Certificates",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip_all)]
pub async fn get_certificates(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
) -> Result<Response, AppError> {
    let auth_user =
        auth_user.ok_or_else(|| AppError::unauthorized("Unauthorized. Please log in."))?;
    Ok(CertificateService::list(&state, &auth_user).await)
}

#[utoipa::path(
    post,
    path = "/api/certificates/verify",
    request_body = VerifyCertificateRequest,
    responses(
        (status = 200, description = "Certificate is valid", body = VerifiedCertificate),
        (status = 400, description = "Invalid request data or certificate expired"),
        (status = 404, description = "Certificate not found or invalid")
    ),
    tag = "Certificates"
)]
#[instrument(skip_all)]
pub async fn verify_certificate(
    State(state): State<AppState>,
    body: Result<Json<VerifyCertificateRequest>, JsonRejection>,
) -> Result<ApiResponse<VerifiedCertificate>, AppError> {
    let dto = checked_body(body, "Invalid request data")?;
    let certificate = CertificateService::verify(&state, dto.reference.trim()).await?;
    Ok(ApiResponse::ok(certificate).with_message("Certificate is valid"))
}
