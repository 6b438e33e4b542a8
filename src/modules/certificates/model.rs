use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use seitech_odoo::fields;

pub const CERTIFICATE_MODEL: &str = "slide.channel.certificate";

pub const CERTIFICATE_FIELDS: &[&str] = &[
    "id",
    "reference",
    "channel_id",
    "partner_id",
    "issue_date",
    "expiry_date",
    "template_id",
    "qr_code",
];

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyCertificateRequest {
    #[validate(length(min = 1, message = "Certificate reference is required"))]
    pub reference: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedCertificate {
    pub id: i64,
    pub reference: String,
    pub course_name: String,
    pub course_slug: String,
    pub issued_date: Option<String>,
    pub expiry_date: Option<String>,
    pub download_url: String,
    pub verification_url: String,
    pub qr_code: String,
    pub template_name: String,
    pub holder_name: String,
    pub holder_email: String,
}

impl VerifiedCertificate {
    pub fn build(
        record: &Value,
        course: &Value,
        partner: &Value,
        odoo_url: &str,
        verification_url: String,
    ) -> Self {
        let id = fields::i64_field(record, "id");
        Self {
            id,
            reference: fields::string_or_empty(record, "reference"),
            course_name: fields::string_or_empty(course, "name"),
            course_slug: fields::string_or_empty(course, "website_slug"),
            issued_date: fields::string(record, "issue_date"),
            expiry_date: fields::string(record, "expiry_date"),
            download_url: format!("{odoo_url}/slides/certificate/{id}/download"),
            verification_url,
            qr_code: fields::image_data_url(record, "qr_code").unwrap_or_default(),
            template_name: fields::many2one_name(record, "template_id")
                .unwrap_or_else(|| "Default Template".to_string()),
            holder_name: fields::string_or_empty(partner, "name"),
            holder_email: fields::string_or_empty(partner, "email"),
        }
    }
}

/// A certificate is expired once its expiry date is in the past.
pub fn is_expired(record: &Value, now: chrono::DateTime<chrono::Utc>) -> bool {
    fields::datetime_field(record, "expiry_date").is_some_and(|expiry| expiry < now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_is_expired() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        assert!(is_expired(&json!({ "expiry_date": "2026-05-31" }), now));
        assert!(!is_expired(&json!({ "expiry_date": "2027-01-01" }), now));
        assert!(!is_expired(&json!({ "expiry_date": false }), now));
    }

    #[test]
    fn test_build_defaults_template() {
        let record = json!({
            "id": 8, "reference": "CERT-0008", "template_id": false, "qr_code": false,
            "issue_date": "2026-01-10", "expiry_date": false
        });
        let course = json!({ "name": "Fire Safety Awareness", "website_slug": "fire-safety-awareness" });
        let partner = json!({ "name": "Ada Lovelace", "email": "ada@example.com" });

        let cert = VerifiedCertificate::build(
            &record,
            &course,
            &partner,
            "https://erp.test",
            "https://seitech.test/certificates/verify?ref=CERT-0008".into(),
        );
        assert_eq!(cert.template_name, "Default Template");
        assert_eq!(cert.download_url, "https://erp.test/slides/certificate/8/download");
        assert_eq!(cert.expiry_date, None);
        assert_eq!(cert.qr_code, "");
        assert_eq!(cert.holder_name, "Ada Lovelace");
    }
}
