use anyhow::Context;
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::{debug, instrument};

use seitech_core::ApiResponse;
use seitech_odoo::{Domain, SearchRead, fields};

use crate::middleware::auth::AuthUser;
use crate::modules::certificates::model::{
    CERTIFICATE_FIELDS, CERTIFICATE_MODEL, VerifiedCertificate, is_expired,
};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::url::encode_component;

pub struct CertificateService;

impl CertificateService {
    /// The user's certificates from the ERP; an empty list otherwise.
    #[instrument(skip_all, fields(user = %auth_user.email()))]
    pub async fn list(state: &AppState, auth_user: &AuthUser) -> Response {
        if let Some(sid) = auth_user.odoo_session() {
            match state.odoo.rest_get("/api/certificates", &[], Some(sid)).await {
                Ok(response) if response.envelope_success() => {
                    return Json(response.body).into_response();
                }
                Ok(response) => debug!(status = response.status, "ERP declined certificate listing"),
                Err(e) => debug!(error = %e, "Failed to fetch certificates"),
            }
        }
        ApiResponse::ok(Vec::<Value>::new()).into_response()
    }

    #[instrument(skip(state))]
    pub async fn verify(state: &AppState, reference: &str) -> Result<VerifiedCertificate, AppError> {
        let odoo = &state.odoo;
        let record = odoo
            .search_read(
                CERTIFICATE_MODEL,
                SearchRead::new(
                    Domain::new()
                        .eq("reference", reference)
                        .eq("state", "done"),
                )
                .fields(CERTIFICATE_FIELDS)
                .limit(1),
            )
            .await
            .context("Failed to verify certificate")?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Certificate not found or invalid")))?;

        if is_expired(&record, chrono::Utc::now()) {
            return Err(AppError::bad_request(anyhow::anyhow!("Certificate has expired")));
        }

        let course = match fields::many2one_id(&record, "channel_id") {
            Some(id) => odoo
                .read("slide.channel", &[id], &["id", "name", "website_slug"])
                .await
                .context("Failed to verify certificate")?
                .into_iter()
                .next(),
            None => None,
        }
        .unwrap_or(Value::Null);

        let partner = match fields::many2one_id(&record, "partner_id") {
            Some(id) => odoo
                .read("res.partner", &[id], &["name", "email"])
                .await
                .context("Failed to verify certificate")?
                .into_iter()
                .next(),
            None => None,
        }
        .unwrap_or(Value::Null);

        let verification_url = state
            .site_config
            .url(&format!(
                "/certificates/verify?ref={}",
                encode_component(reference)
            ));

        Ok(VerifiedCertificate::build(
            &record,
            &course,
            &partner,
            odoo.base_url(),
            verification_url,
        ))
    }
}
