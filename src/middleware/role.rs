//! Role gates for route groups.
//!
//! ```rust,ignore
//! let admin_routes = Router::new()
//!     .route("/users", get(list_users))
//!     .layer(middleware::from_fn_with_state(state.clone(), require_admin_or_manager));
//! ```

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};

use seitech_core::permissions::Role;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Runs `next` only when the session's role is one of `allowed`.
/// Missing or invalid sessions are rejected with 401, other roles with 403.
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed: &[Role],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    check_any_role(&auth_user, allowed)?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}

pub async fn require_admin_or_manager(
    state: State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_roles(state, req, next, &[Role::Admin, Role::Manager]).await
}

/// Admins, managers and instructors.
pub async fn require_course_staff(
    state: State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_roles(state, req, next, &[Role::Admin, Role::Manager, Role::Instructor]).await
}

pub fn check_any_role(auth_user: &AuthUser, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&auth_user.role()) {
        Ok(())
    } else {
        tracing::debug!(role = %auth_user.role(), "Role not allowed");
        Err(AppError::forbidden("Forbidden"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seitech_auth::SessionClaims;

    fn user(role: Role) -> AuthUser {
        AuthUser(SessionClaims {
            sub: "1".into(),
            partner_id: Some(1),
            email: "staff@seitech.co.uk".into(),
            name: "Staff".into(),
            role,
            permissions: role.permission_strings(),
            avatar: None,
            odoo_session: None,
            demo: false,
            exp: 9999999999,
            iat: 1,
        })
    }

    #[test]
    fn test_check_any_role() {
        let staff = [Role::Admin, Role::Manager];
        assert!(check_any_role(&user(Role::Admin), &staff).is_ok());
        assert!(check_any_role(&user(Role::Manager), &staff).is_ok());

        let err = check_any_role(&user(Role::Instructor), &staff).unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
        assert_eq!(err.message(), "Forbidden");
    }

    #[test]
    fn test_student_admin_is_not_staff() {
        assert!(check_any_role(&user(Role::StudentAdmin), &[Role::Admin, Role::Manager]).is_err());
    }
}
