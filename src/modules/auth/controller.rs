use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde_json::Value;
use tracing::instrument;

use seitech_core::ApiResponse;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::model::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest, SessionStatus,
    SessionUser,
};
use crate::modules::auth::service::{AuthService, RESET_MESSAGE};
use crate::state::AppState;
use crate::utils::cookies::{clear_session, with_session};
use crate::utils::errors::AppError;
use crate::validator::{LenientJson, ValidatedJson};

/// Log in and receive the session cookies
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; sets `session_token` and `user_info` cookies", body = LoginResponse),
        (status = 400, description = "Email and password are required"),
        (status = 401, description = "Invalid email or password")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    LenientJson(dto): LenientJson<LoginRequest>,
) -> Result<Response, AppError> {
    let login = AuthService::login(&state, dto).await?;

    let user_info = serde_json::to_value(&login.user)?;
    let jar = with_session(jar, &login.session_token, &user_info, &state.session_config);

    Ok((jar, ApiResponse::ok(login).with_message("Login successful")).into_response())
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Session cookies cleared")),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    auth_user: Option<AuthUser>,
) -> Response {
    AuthService::logout(&state, auth_user.as_ref().and_then(AuthUser::odoo_session)).await;

    let jar = clear_session(jar, &state.session_config);
    (jar, ApiResponse::ok(Value::Null).with_message("Logout successful")).into_response()
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = SessionUser),
        (status = 401, description = "Not authenticated")
    ),
    tag = "Authentication",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip_all)]
pub async fn me(auth_user: Option<AuthUser>) -> Result<ApiResponse<SessionUser>, AppError> {
    let auth_user = auth_user.ok_or_else(|| AppError::unauthorized("Not authenticated"))?;
    Ok(ApiResponse::ok(SessionUser::from(&auth_user.0)))
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses((status = 200, description = "Whether the request carries a valid session", body = SessionStatus)),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn session(auth_user: Option<AuthUser>) -> ApiResponse<SessionStatus> {
    let status = SessionStatus {
        authenticated: auth_user.is_some(),
        user: auth_user.map(|user| SessionUser::from(&user.0)),
    };
    let authenticated = status.authenticated;
    ApiResponse::ok(status).with_field("authenticated", authenticated)
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Missing fields, invalid email or short password")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<Response, AppError> {
    AuthService::register(&state, dto).await
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset instructions sent when the account exists"),
        (status = 400, description = "Email address is required")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn forgot_password(
    State(state): State<AppState>,
    LenientJson(dto): LenientJson<ForgotPasswordRequest>,
) -> Result<ApiResponse<Value>, AppError> {
    AuthService::forgot_password(&state, dto).await?;
    Ok(ApiResponse::ok(Value::Null).with_message(RESET_MESSAGE))
}
