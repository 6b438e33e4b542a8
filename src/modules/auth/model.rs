use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use seitech_auth::SessionClaims;
use seitech_core::permissions::Role;
use seitech_core::text::split_name;
use seitech_odoo::fields;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(
        required(message = "firstName is required"),
        length(min = 1, message = "firstName is required")
    )]
    pub first_name: Option<String>,
    #[validate(
        required(message = "lastName is required"),
        length(min = 1, message = "lastName is required")
    )]
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

impl RegisterRequest {
    pub fn full_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or_default();
        let last = self.last_name.as_deref().unwrap_or_default();
        format!("{} {}", first.trim(), last.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

/// The user as stored in the `user_info` cookie and returned by `/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub permissions: Vec<String>,
    pub avatar: Option<String>,
    pub partner_id: Option<i64>,
}

impl SessionUser {
    pub fn new(
        id: String,
        email: String,
        name: String,
        role: Role,
        avatar: Option<String>,
        partner_id: Option<i64>,
    ) -> Self {
        let (first_name, last_name) = split_name(&name);
        Self {
            id,
            email,
            name,
            first_name,
            last_name,
            role,
            permissions: role.permission_strings(),
            avatar,
            partner_id,
        }
    }

    /// User object returned by the ERP login controller. A missing role
    /// means student.
    pub fn from_odoo(user: &Value) -> Option<Self> {
        let id = match user.get("id")? {
            Value::Number(n) => n.to_string(),
            Value::String(s) if !s.is_empty() => s.clone(),
            _ => return None,
        };
        let role = fields::string(user, "role")
            .map(|r| Role::parse(&r))
            .unwrap_or(Role::Student);
        let partner_id = user
            .get("partnerId")
            .or_else(|| user.get("partner_id"))
            .and_then(Value::as_i64);
        let avatar = fields::string(user, "avatar").or_else(|| fields::string(user, "image"));

        Some(Self::new(
            id,
            fields::string_or_empty(user, "email"),
            fields::string_or_empty(user, "name"),
            role,
            avatar,
            partner_id,
        ))
    }
}

impl From<&SessionClaims> for SessionUser {
    fn from(claims: &SessionClaims) -> Self {
        let mut user = Self::new(
            claims.sub.clone(),
            claims.email.clone(),
            claims.name.clone(),
            claims.role,
            claims.avatar.clone(),
            claims.partner_id,
        );
        user.permissions = claims.permissions.clone();
        user
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: SessionUser,
    /// Also accepted as `Authorization: Bearer <token>`
    pub session_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub user: Option<SessionUser>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_odoo_defaults_role() {
        let user = SessionUser::from_odoo(&json!({
            "id": 12,
            "email": "ada@example.com",
            "name": "Ada King Lovelace",
            "partnerId": 40,
            "avatar": false,
        }))
        .unwrap();
        assert_eq!(user.id, "12");
        assert_eq!(user.role, Role::Student);
        assert!(user.permissions.is_empty());
        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.last_name, "King Lovelace");
        assert_eq!(user.partner_id, Some(40));
        assert_eq!(user.avatar, None);
    }

    #[test]
    fn test_from_odoo_requires_id() {
        assert!(SessionUser::from_odoo(&json!({ "email": "a@b.c" })).is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let user = SessionUser::new(
            "demo_manager".into(),
            "manager@seitech.co.uk".into(),
            "Demo Manager".into(),
            Role::Manager,
            None,
            None,
        );
        let body = serde_json::to_value(&user).unwrap();
        assert_eq!(body["firstName"], "Demo");
        assert_eq!(body["role"], "manager");
        assert!(body["permissions"].as_array().unwrap().contains(&json!("users.delete")));
        assert!(body["partnerId"].is_null());
    }

    #[test]
    fn test_register_full_name() {
        let dto = RegisterRequest {
            first_name: Some(" Grace ".into()),
            last_name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(dto.full_name(), "Grace");
    }

    #[test]
    fn test_register_validation() {
        let dto = RegisterRequest {
            first_name: Some("Grace".into()),
            last_name: Some("Hopper".into()),
            email: "grace@example.com".into(),
            password: "short".into(),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
        assert!(!errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_register_names_are_required() {
        let dto = RegisterRequest {
            first_name: None,
            last_name: Some(String::new()),
            email: "grace@example.com".into(),
            password: "longenough".into(),
        };
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["first_name"][0].message.as_deref(), Some("firstName is required"));
        assert_eq!(fields["last_name"][0].message.as_deref(), Some("lastName is required"));
    }
}
