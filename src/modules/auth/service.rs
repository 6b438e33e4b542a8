use anyhow::Context;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use seitech_auth::{SessionIdentity, create_session_token};
use seitech_core::ApiResponse;
use seitech_odoo::RestResponse;

use crate::metrics::{track_session_issued, track_user_login_failure, track_user_login_success};
use crate::modules::auth::model::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest, SessionUser,
};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::proxy::{record_fallback, relay};

pub const RESET_MESSAGE: &str =
    "If an account exists with this email, you will receive password reset instructions.";

pub struct AuthService;

impl AuthService {
    /// Authenticate against the ERP, falling back to the demo accounts.
    #[instrument(skip(state, dto), fields(email = %dto.email))]
    pub async fn login(state: &AppState, dto: LoginRequest) -> Result<LoginResponse, AppError> {
        if dto.email.trim().is_empty() || dto.password.is_empty() {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Email and password are required"
            )));
        }

        let body = json!({ "email": dto.email, "password": dto.password });
        match state.odoo.rest_post("/api/auth/login", &body, None).await {
            Ok(response) => {
                if let Some((user, odoo_session)) = odoo_login_result(&response) {
                    return Self::issue(state, user, Some(odoo_session), false, "odoo");
                }
            }
            Err(e) => record_fallback("auth.login", &e),
        }

        if !state.site_config.demo_mode {
            track_user_login_failure("invalid_credentials");
            return Err(AppError::unauthorized("Invalid email or password"));
        }

        let Some(demo) = state.demo.verify(dto.email.trim(), &dto.password).await else {
            track_user_login_failure("invalid_credentials");
            return Err(AppError::unauthorized("Invalid email or password"));
        };

        let user = SessionUser::new(demo.id, demo.email, demo.name, demo.role, None, None);
        Self::issue(state, user, None, true, "demo")
    }

    fn issue(
        state: &AppState,
        user: SessionUser,
        odoo_session: Option<String>,
        demo: bool,
        source: &str,
    ) -> Result<LoginResponse, AppError> {
        let identity = SessionIdentity {
            user_id: user.id.clone(),
            partner_id: user.partner_id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            avatar: user.avatar.clone(),
            odoo_session,
            demo,
        };
        let session_token = create_session_token(identity, &state.session_config)
            .context("Login failed")?;

        track_user_login_success(user.role.as_str(), source);
        track_session_issued();
        info!(user.id = %user.id, role = %user.role, source, "User logged in");

        Ok(LoginResponse {
            user,
            session_token,
        })
    }

    /// Destroy the ERP web session behind a token; failures are only logged.
    #[instrument(skip_all)]
    pub async fn logout(state: &AppState, odoo_session: Option<&str>) {
        if let Some(sid) = odoo_session
            && let Err(e) = state.odoo.logout(sid).await
        {
            warn!(error = %e, "Failed to destroy ERP session");
        }
    }

    /// Forward a registration to the ERP and relay its answer. While the ERP
    /// is unreachable, demo mode registers a demo student instead.
    #[instrument(skip(state, dto), fields(email = %dto.email))]
    pub async fn register(state: &AppState, dto: RegisterRequest) -> Result<Response, AppError> {
        let name = dto.full_name();
        if name.is_empty() || dto.email.trim().is_empty() || dto.password.is_empty() {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Name, email and password are required"
            )));
        }

        let body = json!({ "name": name, "email": dto.email, "password": dto.password });
        match state.odoo.rest_post("/api/auth/register", &body, None).await {
            Ok(response) => Ok(relay(response)),
            Err(e) if state.site_config.demo_mode => {
                record_fallback("auth.register", &e);
                let user = state
                    .demo
                    .register(dto.email.trim(), &name, &dto.password)
                    .await
                    .ok_or_else(|| {
                        AppError::bad_request(anyhow::anyhow!(
                            "An account with this email already exists"
                        ))
                    })?;
                let user = SessionUser::new(user.id, user.email, user.name, user.role, None, None);
                Ok(ApiResponse::created(user)
                    .with_message("Registration successful")
                    .into_response())
            }
            Err(e) => Err(AppError::upstream(
                anyhow::Error::new(e).context("Registration failed"),
            )),
        }
    }

    #[instrument(skip(state, dto))]
    pub async fn forgot_password(
        state: &AppState,
        dto: ForgotPasswordRequest,
    ) -> Result<(), AppError> {
        let email = dto.email.trim();
        if email.is_empty() {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Email address is required"
            )));
        }

        match state
            .odoo
            .rest_post("/api/auth/reset-password", &json!({ "email": email }), None)
            .await
        {
            Ok(response) if !response.is_success() => {
                warn!(status = response.status, "ERP rejected password reset request")
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to forward password reset request"),
        }
        Ok(())
    }
}

/// The user and ERP session id from a successful login envelope.
pub fn odoo_login_result(response: &RestResponse) -> Option<(SessionUser, String)> {
    if !response.envelope_success() {
        return None;
    }
    let data = response.body.get("data")?;
    let session = data
        .get("sessionToken")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())?;
    let user = SessionUser::from_odoo(data.get("user")?)?;
    Some((user, session.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use seitech_core::permissions::Role;

    fn response(status: u16, body: Value) -> RestResponse {
        RestResponse {
            status,
            body,
            is_json: true,
        }
    }

    #[test]
    fn test_odoo_login_result() {
        let ok = response(
            200,
            json!({
                "success": true,
                "data": {
                    "sessionToken": "sid-9",
                    "user": { "id": 9, "email": "i@seitech.co.uk", "name": "Ivy", "role": "instructor" }
                }
            }),
        );
        let (user, sid) = odoo_login_result(&ok).unwrap();
        assert_eq!(sid, "sid-9");
        assert_eq!(user.role, Role::Instructor);

        let rejected = response(200, json!({ "success": false, "message": "Invalid credentials" }));
        assert!(odoo_login_result(&rejected).is_none());

        let no_token = response(200, json!({ "success": true, "data": { "user": { "id": 1 } } }));
        assert!(odoo_login_result(&no_token).is_none());

        let unauthorized = response(401, json!({ "success": true }));
        assert!(odoo_login_result(&unauthorized).is_none());
    }
}
