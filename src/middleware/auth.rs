use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};
use axum_extra::extract::CookieJar;

use seitech_auth::{SessionClaims, verify_session_token};
use seitech_config::session::SESSION_COOKIE;
use seitech_core::permissions::Role;

use crate::state::AppState;
use crate::utils::errors::AppError;

/// Extractor for an authenticated session. The token is read from
/// `Authorization: Bearer` first, then from the `session_token` cookie.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionClaims);

impl AuthUser {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.0.has_permission(permission)
    }

    pub fn has_any_permission(&self, permissions: &[&str]) -> bool {
        permissions.iter().any(|p| self.has_permission(p))
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }

    pub fn is_demo(&self) -> bool {
        self.0.demo
    }

    /// ERP user id; demo sessions have none.
    pub fn odoo_uid(&self) -> Result<i64, AppError> {
        self.0
            .odoo_uid()
            .ok_or_else(|| AppError::unauthorized("Unauthorized"))
    }

    /// ERP partner id of the user.
    pub fn partner_id(&self) -> Result<i64, AppError> {
        self.0
            .partner_id
            .ok_or_else(|| AppError::unauthorized("Unauthorized"))
    }

    /// The user's own ERP web session, when the login went through the ERP.
    pub fn odoo_session(&self) -> Option<&str> {
        self.0.odoo_session.as_deref()
    }
}

fn session_token(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    bearer.or_else(|| {
        CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts).ok_or_else(|| AppError::unauthorized("Unauthorized"))?;

        let claims = verify_session_token(&token, &state.session_config).map_err(|e| {
            tracing::debug!(error = %e, "Rejected session token");
            AppError::unauthorized("Unauthorized")
        })?;

        Ok(AuthUser(claims))
    }
}

/// `Option<AuthUser>`: `None` for guests and for invalid or expired tokens.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(session_token(parts)
            .and_then(|token| verify_session_token(&token, &state.session_config).ok())
            .map(AuthUser))
    }
}

/// Builds an extractor that requires a permission on top of a valid session.
#[macro_export]
macro_rules! require_permission {
    ($name:ident, $permission:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = $crate::utils::errors::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user =
                    <$crate::middleware::auth::AuthUser as axum::extract::FromRequestParts<$crate::state::AppState>>::from_request_parts(parts, state).await?;

                if !auth_user.has_permission($permission) {
                    return Err($crate::utils::errors::AppError::forbidden("Forbidden"));
                }

                Ok($name(auth_user))
            }
        }
    };
}

use seitech_core::permissions as perm;

require_permission!(RequireUsersCreate, perm::USERS_CREATE);
require_permission!(RequireUsersEdit, perm::USERS_EDIT);
require_permission!(RequireInstructorsCreate, perm::INSTRUCTORS_CREATE);
require_permission!(RequireInstructorsEdit, perm::INSTRUCTORS_EDIT);
require_permission!(RequireCoursesCreate, perm::COURSES_CREATE);
require_permission!(RequireCoursesEdit, perm::COURSES_EDIT);
require_permission!(RequireAnalyticsView, perm::ANALYTICS_VIEW);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn claims(role: Role) -> SessionClaims {
        SessionClaims {
            sub: "12".to_string(),
            partner_id: Some(40),
            email: "learner@example.com".to_string(),
            name: "Test Learner".to_string(),
            role,
            permissions: role.permission_strings(),
            avatar: None,
            odoo_session: Some("sid-1".to_string()),
            demo: false,
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    #[test]
    fn test_permissions_follow_role() {
        let manager = AuthUser(claims(Role::Manager));
        assert!(manager.has_permission(perm::USERS_DELETE));
        assert!(!manager.has_permission(perm::SETTINGS_EDIT));
        assert!(manager.has_any_permission(&[perm::SETTINGS_EDIT, perm::ANALYTICS_VIEW]));

        let student = AuthUser(claims(Role::Student));
        assert!(!student.has_any_permission(&[perm::USERS_VIEW, perm::COURSES_VIEW]));
    }

    #[test]
    fn test_ids() {
        let user = AuthUser(claims(Role::Student));
        assert_eq!(user.odoo_uid().unwrap(), 12);
        assert_eq!(user.partner_id().unwrap(), 40);
        assert_eq!(user.odoo_session(), Some("sid-1"));

        let mut demo = claims(Role::Student);
        demo.sub = "demo_student".into();
        demo.partner_id = None;
        let demo = AuthUser(demo);
        assert_eq!(demo.odoo_uid().unwrap_err().status.as_u16(), 401);
    }

    #[test]
    fn test_bearer_takes_precedence_over_cookie() {
        let (parts, _) = Request::builder()
            .header("authorization", "Bearer from-header")
            .header("cookie", "session_token=from-cookie")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(session_token(&parts).as_deref(), Some("from-header"));

        let (parts, _) = Request::builder()
            .header("cookie", "theme=dark; session_token=from-cookie")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(session_token(&parts).as_deref(), Some("from-cookie"));

        let (parts, _) = Request::builder().body(()).unwrap().into_parts();
        assert_eq!(session_token(&parts), None);
    }
}
