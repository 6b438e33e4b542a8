use anyhow::Context;
use serde_json::Value;
use tracing::{info, instrument, warn};

use seitech_odoo::OdooClient;

use crate::modules::enquiries::model::{
    ConsultationRequest, ContactRequest, LEAD_MODEL, MESSAGE_MODEL, SubmissionReceipt,
};
use crate::utils::errors::AppError;
use crate::utils::proxy::record_fallback;

pub struct EnquiryService;

impl EnquiryService {
    /// File a contact form as a CRM lead with the submission as a note.
    #[instrument(skip_all, fields(subject = %dto.subject))]
    pub async fn contact(odoo: &OdooClient, dto: ContactRequest) -> Result<SubmissionReceipt, AppError> {
        let lead_id = odoo
            .create(LEAD_MODEL, dto.lead_values())
            .await
            .context("Failed to submit contact form")?;
        odoo.create(MESSAGE_MODEL, dto.note_values(lead_id))
            .await
            .context("Failed to submit contact form")?;

        info!(lead_id, "Contact form filed");
        Ok(SubmissionReceipt { id: lead_id })
    }

    /// Forward a consultation request. Accepted even when the ERP rejects it
    /// or is down; those are followed up by hand from the logs.
    #[instrument(skip_all, fields(services = dto.service_interested.len()))]
    pub async fn consultation(odoo: &OdooClient, dto: ConsultationRequest) -> Value {
        match odoo.rest_post("/api/consultation", &dto.erp_payload(), None).await {
            Ok(response) if response.is_success() => {
                response.body.get("data").cloned().unwrap_or(Value::Null)
            }
            Ok(response) => {
                warn!(status = response.status, body = %response.body, email = %dto.email, "ERP rejected consultation request");
                serde_json::json!({ "id": 0 })
            }
            Err(e) => {
                record_fallback("consultation", &e);
                serde_json::json!({ "id": 0 })
            }
        }
    }
}
