use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::Value;
use tracing::instrument;

use seitech_core::ApiResponse;

use crate::modules::enquiries::model::{
    CONSULTATION_THANKS, CONTACT_THANKS, ConsultationRequest, ContactRequest, SubmissionReceipt,
};
use crate::modules::enquiries::service::EnquiryService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::checked_body;

const INVALID_FORM: &str = "Invalid form data";

#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Enquiry filed as a CRM lead", body = SubmissionReceipt),
        (status = 400, description = "Invalid form data"),
        (status = 500, description = "Failed to submit contact form")
    ),
    tag = "Enquiries"
)]
#[instrument(skip_all)]
pub async fn submit_contact(
    State(state): State<AppState>,
    body: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<ApiResponse<SubmissionReceipt>, AppError> {
    let dto = checked_body(body, INVALID_FORM)?;
    let receipt = EnquiryService::contact(&state.odoo, dto).await?;
    Ok(ApiResponse::created(receipt).with_message(CONTACT_THANKS))
}

#[utoipa::path(
    post,
    path = "/api/consultation",
    request_body = ConsultationRequest,
    responses(
        (status = 201, description = "Consultation request accepted"),
        (status = 400, description = "Invalid form data")
    ),
    tag = "Enquiries"
)]
#[instrument(skip_all)]
pub async fn request_consultation(
    State(state): State<AppState>,
    body: Result<Json<ConsultationRequest>, JsonRejection>,
) -> Result<ApiResponse<Value>, AppError> {
    let dto = checked_body(body, INVALID_FORM)?;
    let data = EnquiryService::consultation(&state.odoo, dto).await;
    Ok(ApiResponse::created(data).with_message(CONSULTATION_THANKS))
}
