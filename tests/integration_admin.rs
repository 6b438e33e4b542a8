mod common;

use axum::http::StatusCode;
use common::{
    OdooStub, UNREACHABLE_ODOO, delete, demo_token, get, post_json, put_json, send, setup_app,
    spawn_odoo, token_for,
};
use seitech_core::permissions::Role;
use serde_json::json;

#[tokio::test]
async fn test_admin_requires_session() {
    let (_, app) = setup_app(UNREACHABLE_ODOO);

    let (status, body) = send(&app, get("/api/admin/users", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_student_is_forbidden() {
    let (state, app) = setup_app(UNREACHABLE_ODOO);
    let token = demo_token(&state, Role::Student);

    for uri in ["/api/admin/users", "/api/admin/courses", "/api/admin/analytics/overview"] {
        let (status, body) = send(&app, get(uri, Some(&token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["message"], "Forbidden");
    }
}

#[tokio::test]
async fn test_instructor_sees_courses_but_not_people() {
    let (state, app) = setup_app(UNREACHABLE_ODOO);
    let token = demo_token(&state, Role::Instructor);

    let (status, _) = send(&app, get("/api/admin/courses", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get("/api/admin/users", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_users_reads_erp() {
    let stub = OdooStub::new()
        .orm("res.users", "search_count", json!(41))
        .orm(
            "res.users",
            "search_read",
            json!([{
                "id": 9,
                "name": "Priya Shah",
                "login": "priya@example.com",
                "email": false,
                "active": true,
                "create_date": "2026-01-15 08:30:00",
                "login_date": false
            }]),
        );
    let url = spawn_odoo(stub.clone()).await;
    let (state, app) = setup_app(&url);
    let token = token_for(&state, 1, Some(1), Role::Manager);

    let (status, body) = send(&app, get("/api/admin/users?search=priya&limit=10", Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["email"], "priya@example.com");
    assert_eq!(body["data"][0]["joinDate"], "2026-01-15");
    assert!(body["data"][0]["lastLogin"].is_null());
    assert_eq!(body["pagination"]["total"], 41);

    let reads = stub.calls_to("res.users", "search_read");
    assert_eq!(reads[0].kwargs["limit"], 10);
    assert!(reads[0].kwargs["domain"].to_string().contains("priya"));
}

#[tokio::test]
async fn test_list_users_applies_role_and_status_filters() {
    let stub = OdooStub::new();
    let url = spawn_odoo(stub.clone()).await;
    let (state, app) = setup_app(&url);
    let token = token_for(&state, 1, Some(1), Role::Admin);

    let (status, _) = send(&app, get("/api/admin/users?role=student&status=inactive", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let expected = json!([["share", "=", true], ["active", "=", false]]);
    assert_eq!(stub.calls_to("res.users", "search_read")[0].kwargs["domain"], expected);
    assert_eq!(stub.calls_to("res.users", "search_count")[0].args[0], expected);

    let (status, _) = send(&app, get("/api/admin/users?role=instructor", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stub.calls_to("res.users", "search_read")[1].kwargs["domain"],
        json!([["share", "=", false]])
    );
}

#[tokio::test]
async fn test_demo_user_list_filters_by_status() {
    let (state, app) = setup_app(UNREACHABLE_ODOO);
    let token = demo_token(&state, Role::Admin);

    let (status, body) = send(&app, get("/api/admin/users?status=inactive", Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "Priya Shah");
}

#[tokio::test]
async fn test_list_users_falls_back_to_demo() {
    let (state, app) = setup_app(UNREACHABLE_ODOO);
    let token = demo_token(&state, Role::Admin);

    let (status, body) = send(&app, get("/api/admin/users", Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body["data"].as_array().unwrap().is_empty());
    assert!(body["pagination"]["total"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_list_instructors_demo_fallback() {
    let (state, app) = setup_app(UNREACHABLE_ODOO);
    let token = demo_token(&state, Role::Manager);

    let (status, body) = send(&app, get("/api/admin/instructors", Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Sarah Mitchell");
    assert_eq!(body["pagination"]["total"], 4);

    let (_, body) = send(&app, get("/api/admin/instructors?search=sarah", Some(&token))).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_user_validation_and_create() {
    let stub = OdooStub::new().orm("res.users", "create", json!(120));
    let url = spawn_odoo(stub.clone()).await;
    let (state, app) = setup_app(&url);
    let token = token_for(&state, 1, Some(1), Role::Admin);

    let (status, body) = send(
        &app,
        post_json("/api/admin/users", Some(&token), json!({ "name": "No Email" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required fields");

    let (status, body) = send(
        &app,
        post_json(
            "/api/admin/users",
            Some(&token),
            json!({ "name": "Tom Reed", "email": "tom@example.com", "password": "changeme1", "role": "student" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["data"]["id"], 120);
    assert_eq!(body["data"]["status"], "active");

    let creates = stub.calls_to("res.users", "create");
    assert_eq!(creates[0].args[0]["login"], "tom@example.com");
}

#[tokio::test]
async fn test_only_admins_delete_courses() {
    let (state, app) = setup_app(UNREACHABLE_ODOO);

    let manager = demo_token(&state, Role::Manager);
    let (status, _) = send(&app, delete("/api/admin/courses/3", Some(&manager))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = demo_token(&state, Role::Admin);
    let (status, body) = send(&app, delete("/api/admin/courses/3", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Course deleted successfully");
}

#[tokio::test]
async fn test_demo_update_echoes_body() {
    let (state, app) = setup_app(UNREACHABLE_ODOO);
    let token = demo_token(&state, Role::Admin);

    let (status, body) = send(
        &app,
        put_json("/api/admin/users/5", Some(&token), json!({ "name": "Renamed" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User updated successfully");
    assert_eq!(body["data"]["id"], 5);
    assert_eq!(body["data"]["name"], "Renamed");
    assert!(body["data"]["updatedAt"].is_string());
}

#[tokio::test]
async fn test_demo_course_create_slugifies_title() {
    let (state, app) = setup_app(UNREACHABLE_ODOO);
    let token = demo_token(&state, Role::Instructor);

    let (status, body) = send(
        &app,
        post_json(
            "/api/admin/courses",
            Some(&token),
            json!({ "title": "Working at Height", "description": "Ladders and scaffolds", "category": "Safety", "level": "beginner" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], "working-at-height");
    assert_eq!(body["data"]["status"], "draft");
}
