//! Signing and verification of session tokens.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use seitech_config::SessionConfig;

use crate::claims::{SessionClaims, SessionIdentity};

#[derive(Debug, thiserror::Error)]
pub enum AuthTokenError {
    #[error("Failed to create session token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("Session expired")]
    Expired,

    #[error("Invalid session token")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Signs a session token for `identity`, valid for `config.max_age_secs`.
///
/// # Errors
///
/// Returns [`AuthTokenError::Encode`] if the token cannot be encoded.
pub fn create_session_token(
    identity: SessionIdentity,
    config: &SessionConfig,
) -> Result<String, AuthTokenError> {
    let now = Utc::now().timestamp();
    let exp = (now + config.max_age_secs).max(0) as usize;
    let now = now as usize;

    let claims = SessionClaims {
        sub: identity.user_id,
        partner_id: identity.partner_id,
        email: identity.email,
        name: identity.name,
        role: identity.role,
        permissions: identity.role.permission_strings(),
        avatar: identity.avatar,
        odoo_session: identity.odoo_session,
        demo: identity.demo,
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(AuthTokenError::Encode)
}

/// Verifies signature and expiry and returns the claims.
///
/// # Errors
///
/// [`AuthTokenError::Expired`] for expired tokens, [`AuthTokenError::Invalid`]
/// for anything else that fails validation.
pub fn verify_session_token(
    token: &str,
    config: &SessionConfig,
) -> Result<SessionClaims, AuthTokenError> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthTokenError::Expired,
        _ => AuthTokenError::Invalid(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use seitech_core::permissions::Role;

    fn config(max_age_secs: i64) -> SessionConfig {
        SessionConfig {
            secret: "test-secret".to_string(),
            max_age_secs,
            secure_cookies: false,
        }
    }

    fn identity() -> SessionIdentity {
        SessionIdentity {
            user_id: "12".to_string(),
            partner_id: Some(40),
            email: "manager@example.com".to_string(),
            name: "Mia Manager".to_string(),
            role: Role::Manager,
            avatar: None,
            odoo_session: Some("sid-123".to_string()),
            demo: false,
        }
    }

    #[test]
    fn test_create_and_verify() {
        let config = config(3600);
        let token = create_session_token(identity(), &config).unwrap();
        let claims = verify_session_token(&token, &config).unwrap();

        assert_eq!(claims.sub, "12");
        assert_eq!(claims.partner_id, Some(40));
        assert_eq!(claims.role, Role::Manager);
        assert!(claims.has_permission("users.delete"));
        assert_eq!(claims.odoo_session.as_deref(), Some("sid-123"));
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = create_session_token(identity(), &config(3600)).unwrap();
        let other = SessionConfig {
            secret: "other".to_string(),
            ..config(3600)
        };
        assert!(matches!(
            verify_session_token(&token, &other),
            Err(AuthTokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        // Default validation allows 60s of leeway.
        let token = create_session_token(identity(), &config(-120)).unwrap();
        assert!(matches!(
            verify_session_token(&token, &config(3600)),
            Err(AuthTokenError::Expired)
        ));
    }

    #[test]
    fn test_garbage_token() {
        assert!(verify_session_token("not-a-token", &config(60)).is_err());
    }
}
