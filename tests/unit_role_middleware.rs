use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::{Router, middleware, routing::get};
use tower::ServiceExt;

use seitech::middleware::auth::AuthUser;
use seitech::middleware::role::{check_any_role, require_admin_or_manager, require_course_staff};
use seitech::state::{AppState, test_state};
use seitech_auth::{SessionClaims, SessionIdentity, create_session_token};
use seitech_core::permissions::Role;

fn create_test_auth_user(role: Role) -> AuthUser {
    AuthUser(SessionClaims {
        sub: "7".to_string(),
        partner_id: Some(70),
        email: "test@seitech.co.uk".to_string(),
        name: "Test User".to_string(),
        role,
        permissions: role.permission_strings(),
        avatar: None,
        odoo_session: None,
        demo: false,
        exp: 9999999999,
        iat: 1234567890,
    })
}

fn token(state: &AppState, role: Role) -> String {
    let identity = SessionIdentity {
        user_id: "7".into(),
        partner_id: Some(70),
        email: "test@seitech.co.uk".into(),
        name: "Test User".into(),
        role,
        avatar: None,
        odoo_session: None,
        demo: false,
    };
    create_session_token(identity, &state.session_config).unwrap()
}

fn guarded_app(state: &AppState) -> Router {
    let staff = Router::new()
        .route("/staff", get(|| async { "ok" }))
        .layer(middleware::from_fn_with_state(state.clone(), require_admin_or_manager));
    let courses = Router::new()
        .route("/courses", get(|| async { "ok" }))
        .layer(middleware::from_fn_with_state(state.clone(), require_course_staff));
    staff.merge(courses).with_state(state.clone())
}

async fn status_of(app: &Router, uri: &str, token: Option<&str>) -> StatusCode {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

#[test]
fn test_check_any_role_single_match() {
    let auth_user = create_test_auth_user(Role::Admin);
    assert!(check_any_role(&auth_user, &[Role::Admin]).is_ok());
}

#[test]
fn test_check_any_role_multiple_match() {
    let allowed = [Role::Admin, Role::Manager, Role::Instructor];

    for role in allowed {
        assert!(check_any_role(&create_test_auth_user(role), &allowed).is_ok());
    }
}

#[test]
fn test_check_any_role_no_match() {
    let allowed = [Role::Admin, Role::Manager];
    for role in [Role::Student, Role::StudentAdmin, Role::Instructor] {
        let err = check_any_role(&create_test_auth_user(role), &allowed).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }
}

#[test]
fn test_check_any_role_empty_list() {
    let auth_user = create_test_auth_user(Role::Admin);
    assert!(check_any_role(&auth_user, &[]).is_err());
}

#[test]
fn test_auth_user_accessors() {
    let auth_user = create_test_auth_user(Role::Manager);
    assert_eq!(auth_user.role(), Role::Manager);
    assert_eq!(auth_user.email(), "test@seitech.co.uk");
    assert_eq!(auth_user.odoo_uid().unwrap(), 7);
    assert_eq!(auth_user.partner_id().unwrap(), 70);
    assert!(!auth_user.is_demo());
    assert!(auth_user.odoo_session().is_none());
}

#[tokio::test]
async fn test_guard_rejects_missing_session() {
    let state = test_state("http://127.0.0.1:9");
    let app = guarded_app(&state);

    assert_eq!(status_of(&app, "/staff", None).await, StatusCode::UNAUTHORIZED);
    assert_eq!(status_of(&app, "/staff", Some("garbage")).await, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_or_manager_guard() {
    let state = test_state("http://127.0.0.1:9");
    let app = guarded_app(&state);

    assert_eq!(status_of(&app, "/staff", Some(&token(&state, Role::Admin))).await, StatusCode::OK);
    assert_eq!(status_of(&app, "/staff", Some(&token(&state, Role::Manager))).await, StatusCode::OK);
    assert_eq!(
        status_of(&app, "/staff", Some(&token(&state, Role::Instructor))).await,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_course_staff_guard_admits_instructors() {
    let state = test_state("http://127.0.0.1:9");
    let app = guarded_app(&state);

    assert_eq!(
        status_of(&app, "/courses", Some(&token(&state, Role::Instructor))).await,
        StatusCode::OK
    );
    assert_eq!(
        status_of(&app, "/courses", Some(&token(&state, Role::Student))).await,
        StatusCode::FORBIDDEN
    );
}
