//! Session claim structures.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use seitech_core::permissions::Role;

/// Identity established at login, before timestamps are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionIdentity {
    /// ERP user id, or a `demo_*` identifier for demo accounts.
    pub user_id: String,
    pub partner_id: Option<i64>,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub avatar: Option<String>,
    /// ERP web session id when the login went through the ERP.
    pub odoo_session: Option<String>,
    pub demo: bool,
}

/// Claims carried by the `session_token` cookie.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionClaims {
    /// User id (subject claim)
    pub sub: String,
    pub partner_id: Option<i64>,
    pub email: String,
    pub name: String,
    pub role: Role,
    /// Permission names granted by the role
    pub permissions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odoo_session: Option<String>,
    #[serde(default)]
    pub demo: bool,
    /// Expiration timestamp (Unix seconds)
    pub exp: usize,
    /// Issued-at timestamp (Unix seconds)
    pub iat: usize,
}

impl SessionClaims {
    /// Numeric ERP user id; `None` for demo accounts.
    pub fn odoo_uid(&self) -> Option<i64> {
        self.sub.parse().ok()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str) -> SessionClaims {
        SessionClaims {
            sub: sub.to_string(),
            partner_id: Some(3),
            email: "learner@example.com".to_string(),
            name: "Test Learner".to_string(),
            role: Role::Instructor,
            permissions: Role::Instructor.permission_strings(),
            avatar: None,
            odoo_session: None,
            demo: false,
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    #[test]
    fn test_odoo_uid() {
        assert_eq!(claims("42").odoo_uid(), Some(42));
        assert_eq!(claims("demo_student").odoo_uid(), None);
    }

    #[test]
    fn test_has_permission() {
        let claims = claims("7");
        assert!(claims.has_permission("courses.edit"));
        assert!(!claims.has_permission("users.delete"));
    }

    #[test]
    fn test_claims_serialize_omits_empty_session() {
        let serialized = serde_json::to_string(&claims("7")).unwrap();
        assert!(serialized.contains(r#""role":"instructor""#));
        assert!(!serialized.contains("odoo_session"));
    }

    #[test]
    fn test_claims_deserialize_defaults_demo() {
        let json = r#"{"sub":"5","partner_id":null,"email":"a@b.c","name":"A","role":"student","permissions":[],"exp":9999999999,"iat":1}"#;
        let claims: SessionClaims = serde_json::from_str(json).unwrap();
        assert!(!claims.demo);
        assert_eq!(claims.role, Role::Student);
    }
}
