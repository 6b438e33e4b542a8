use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;
use validator::Validate;

pub const LEAD_MODEL: &str = "crm.lead";
pub const MESSAGE_MODEL: &str = "mail.message";
/// `mail.mt_note`
pub const NOTE_SUBTYPE_ID: i64 = 1;

pub const CONTACT_THANKS: &str = "Thank you for contacting us. We will get back to you shortly.";
pub const CONSULTATION_THANKS: &str =
    "Thank you for requesting a free consultation. Our team will contact you shortly.";

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 10, message = "Message must be at least 10 characters"))]
    pub message: String,
}

impl ContactRequest {
    fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    fn phone(&self) -> Option<&str> {
        self.phone.as_deref().filter(|p| !p.is_empty())
    }

    pub fn lead_values(&self) -> Value {
        json!({
            "name": self.subject,
            "contact_name": self.full_name(),
            "email_from": self.email,
            "phone": self.phone().map_or(Value::Bool(false), Value::from),
            "description": self.message,
            "type": "lead",
            "priority": "2",
            "team_id": false,
        })
    }

    /// Chatter note recording the submission on the lead.
    pub fn note_values(&self, lead_id: i64) -> Value {
        let mut body = String::from("<p><strong>Contact Form Submission</strong></p>");
        body.push_str(&format!("<p><strong>Name:</strong> {}</p>", escape_html(&self.full_name())));
        body.push_str(&format!("<p><strong>Email:</strong> {}</p>", escape_html(&self.email)));
        if let Some(phone) = self.phone() {
            body.push_str(&format!("<p><strong>Phone:</strong> {}</p>", escape_html(phone)));
        }
        body.push_str(&format!("<p><strong>Subject:</strong> {}</p>", escape_html(&self.subject)));
        body.push_str(&format!(
            "<p><strong>Message:</strong></p><p>{}</p>",
            escape_html(&self.message)
        ));

        json!({
            "model": LEAD_MODEL,
            "res_id": lead_id,
            "body": body,
            "message_type": "comment",
            "subtype_id": NOTE_SUBTYPE_ID,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PreferredContact {
    Email,
    Phone,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone: String,
    pub company_name: Option<String>,
    #[validate(length(min = 1, message = "Please select at least one service"))]
    pub service_interested: Vec<String>,
    pub message: Option<String>,
    pub preferred_contact: PreferredContact,
}

impl ConsultationRequest {
    pub fn erp_payload(&self) -> Value {
        json!({
            "name": format!("{} {}", self.first_name, self.last_name),
            "email": self.email,
            "phone": self.phone,
            "company_name": self.company_name.as_deref().unwrap_or_default(),
            "services": self.service_interested,
            "message": self.message.as_deref().unwrap_or_default(),
            "preferred_contact": self.preferred_contact,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionReceipt {
    pub id: i64,
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> ContactRequest {
        ContactRequest {
            first_name: "Sam".into(),
            last_name: "Okafor".into(),
            email: "sam@example.com".into(),
            phone: None,
            subject: "Group booking".into(),
            message: "We need <b>twelve</b> seats on NEBOSH.".into(),
        }
    }

    #[test]
    fn test_contact_validation() {
        assert!(contact().validate().is_ok());
        let short = ContactRequest { message: "Call me".into(), ..contact() };
        assert!(short.validate().is_err());
        let bad_email = ContactRequest { email: "sam".into(), ..contact() };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_lead_values() {
        let values = contact().lead_values();
        assert_eq!(values["contact_name"], "Sam Okafor");
        assert_eq!(values["phone"], false);
        assert_eq!(values["type"], "lead");
    }

    #[test]
    fn test_note_escapes_message() {
        let note = contact().note_values(41);
        let body = note["body"].as_str().unwrap();
        assert_eq!(note["res_id"], 41);
        assert!(body.contains("&lt;b&gt;twelve&lt;/b&gt;"));
        assert!(!body.contains("Phone:"));
    }

    #[test]
    fn test_consultation_payload() {
        let request: ConsultationRequest = serde_json::from_value(json!({
            "firstName": "Priya",
            "lastName": "Shah",
            "email": "priya@example.com",
            "phone": "07700 900123",
            "serviceInterested": ["fire-risk-assessment"],
            "preferredContact": "phone"
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let payload = request.erp_payload();
        assert_eq!(payload["name"], "Priya Shah");
        assert_eq!(payload["company_name"], "");
        assert_eq!(payload["preferred_contact"], "phone");
    }

    #[test]
    fn test_consultation_requires_a_service() {
        let request: ConsultationRequest = serde_json::from_value(json!({
            "firstName": "Priya",
            "lastName": "Shah",
            "email": "priya@example.com",
            "phone": "07700 900123",
            "serviceInterested": [],
            "preferredContact": "email"
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }
}
