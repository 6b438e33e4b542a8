mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    OdooStub, UNREACHABLE_ODOO, delete, demo_token, get, patch_json, post_json, send, setup_app,
    setup_with_stub, spawn_odoo, token_for,
};
use seitech_core::permissions::Role;
use serde_json::{Value, json};

fn odoo_datetime(offset: Duration) -> String {
    (Utc::now() + offset).format("%Y-%m-%d %H:%M:%S").to_string()
}

fn open_schedule() -> Value {
    json!({
        "id": 5,
        "state": "scheduled",
        "max_attendees": 12,
        "attendee_count": 3,
        "registration_deadline": odoo_datetime(Duration::days(5)),
        "start_datetime": odoo_datetime(Duration::days(7)),
    })
}

#[tokio::test]
async fn test_notifications_require_session() {
    let (_, app) = setup_app(UNREACHABLE_ODOO);

    let (status, body) = send(&app, get("/api/notifications", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn test_demo_session_has_no_erp_user() {
    let (state, app) = setup_app(UNREACHABLE_ODOO);
    let token = demo_token(&state, Role::Student);

    let (status, _) = send(&app, get("/api/notifications", Some(&token))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_notifications() {
    let stub = OdooStub::new()
        .orm("seitech.notification", "search_count", json!(3))
        .orm(
            "seitech.notification",
            "search_read",
            json!([{
                "id": 8,
                "notification_type": "reply",
                "title": "New reply",
                "message": "Someone replied to your discussion",
                "link": false,
                "read": false,
                "create_date": "2026-05-01 10:00:00"
            }]),
        );
    let url = spawn_odoo(stub.clone()).await;
    let (state, app) = setup_app(&url);
    let token = token_for(&state, 2, Some(3), Role::Student);

    let (status, body) = send(&app, get("/api/notifications?per_page=1", Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    let page = &body["data"];
    assert_eq!(page["total"], 3);
    assert_eq!(page["unread_count"], 3);
    assert_eq!(page["per_page"], 1);
    assert_eq!(page["total_pages"], 3);
    assert_eq!(page["notifications"][0]["title"], "New reply");

    let reads = stub.calls_to("seitech.notification", "search_read");
    assert_eq!(reads[0].kwargs["domain"], json!([["user_id", "=", 2]]));
}

#[tokio::test]
async fn test_create_notification() {
    let stub = OdooStub::new().orm("seitech.notification", "create", json!(41));
    let url = spawn_odoo(stub.clone()).await;
    let (state, app) = setup_app(&url);
    let token = token_for(&state, 2, Some(3), Role::Student);

    let (status, body) = send(
        &app,
        post_json(
            "/api/notifications",
            Some(&token),
            json!({ "notification_type": "system", "title": "Welcome", "message": "Hello there" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Notification created");
    assert_eq!(body["data"]["id"], 41);

    let creates = stub.calls_to("seitech.notification", "create");
    assert_eq!(creates[0].args[0]["user_id"], 2);
    assert_eq!(creates[0].args[0]["read"], false);
}

#[tokio::test]
async fn test_create_notification_missing_fields() {
    let (state, app) = setup_with_stub(OdooStub::new()).await;
    let token = token_for(&state, 2, Some(3), Role::Student);

    let (status, body) = send(
        &app,
        post_json("/api/notifications", Some(&token), json!({ "title": "Welcome" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required fields: notification_type, title, message");
}

#[tokio::test]
async fn test_notification_of_another_user_is_not_found() {
    let (state, app) = setup_with_stub(OdooStub::new()).await;
    let token = token_for(&state, 2, Some(3), Role::Student);

    let (status, body) = send(&app, post_json("/api/notifications/99/read", Some(&token), json!({}))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Notification not found");
}

#[tokio::test]
async fn test_mark_all_read_counts_updates() {
    let stub = OdooStub::new().orm(
        "seitech.notification",
        "search_read",
        json!([{ "id": 1 }, { "id": 2 }]),
    );
    let url = spawn_odoo(stub.clone()).await;
    let (state, app) = setup_app(&url);
    let token = token_for(&state, 2, Some(3), Role::Student);

    let (status, body) = send(&app, post_json("/api/notifications/read-all", Some(&token), json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    let writes = stub.calls_to("seitech.notification", "write");
    assert_eq!(writes[0].args[0], json!([1, 2]));
    assert_eq!(writes[0].args[1]["read"], true);
}

#[tokio::test]
async fn test_create_discussion_requires_fields() {
    let (state, app) = setup_with_stub(OdooStub::new()).await;
    let token = token_for(&state, 2, Some(3), Role::Student);

    let (status, body) = send(
        &app,
        post_json("/api/discussions", Some(&token), json!({ "name": "Help with module 3" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Name, content, and category are required");
}

#[tokio::test]
async fn test_create_discussion_publishes() {
    let stub = OdooStub::new()
        .orm("seitech.discussion", "create", json!(12))
        .orm(
            "seitech.discussion",
            "search_read",
            json!([{ "id": 12, "name": "Help with module 3", "author_id": [2, "User 2"], "upvote_ids": [], "state": "published" }]),
        );
    let url = spawn_odoo(stub.clone()).await;
    let (state, app) = setup_app(&url);
    let token = token_for(&state, 2, Some(3), Role::Student);

    let (status, body) = send(
        &app,
        post_json(
            "/api/discussions",
            Some(&token),
            json!({ "name": "Help with module 3", "content": "Stuck on risk assessment", "category": "question" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "Help with module 3");
    assert_eq!(body["data"]["has_upvoted"], false);

    let creates = stub.calls_to("seitech.discussion", "create");
    assert_eq!(creates[0].args[0]["author_id"], 2);
    assert_eq!(creates[0].args[0]["state"], "draft");
    assert_eq!(stub.calls_to("seitech.discussion", "action_publish").len(), 1);
}

#[tokio::test]
async fn test_only_author_may_modify_discussion() {
    let stub = OdooStub::new().orm(
        "seitech.discussion",
        "search_read",
        json!([{ "id": 12, "author_id": [2, "User 2"] }]),
    );
    let url = spawn_odoo(stub.clone()).await;
    let (state, app) = setup_app(&url);
    let intruder = token_for(&state, 5, Some(6), Role::Student);

    let (status, body) = send(
        &app,
        patch_json("/api/discussions/12", Some(&intruder), json!({ "name": "Edited" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Only the author can modify this discussion");

    let (status, _) = send(&app, delete("/api/discussions/12", Some(&intruder))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(stub.calls_to("seitech.discussion", "write").is_empty());
    assert!(stub.calls_to("seitech.discussion", "action_close").is_empty());
}

#[tokio::test]
async fn test_author_closes_discussion() {
    let stub = OdooStub::new().orm(
        "seitech.discussion",
        "search_read",
        json!([{ "id": 12, "author_id": [2, "User 2"] }]),
    );
    let url = spawn_odoo(stub.clone()).await;
    let (state, app) = setup_app(&url);
    let author = token_for(&state, 2, Some(3), Role::Student);

    let (status, body) = send(&app, delete("/api/discussions/12", Some(&author))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Discussion closed");
    assert_eq!(stub.calls_to("seitech.discussion", "action_close").len(), 1);
    assert!(stub.calls_to("seitech.discussion", "unlink").is_empty());
}

#[tokio::test]
async fn test_missing_discussion_is_not_found() {
    let (state, app) = setup_with_stub(OdooStub::new()).await;
    let token = token_for(&state, 2, Some(3), Role::Student);

    let (status, body) = send(&app, delete("/api/discussions/404", Some(&token))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Discussion not found");
}

#[tokio::test]
async fn test_register_for_schedule() {
    let stub = OdooStub::new()
        .orm("seitech.schedule", "search_read", json!([open_schedule()]))
        .orm("seitech.schedule.attendee", "create", json!(77))
        .orm(
            "res.users",
            "search_read",
            json!([{ "id": 2, "name": "Jane Doe", "email": "jane@example.com" }]),
        );
    let url = spawn_odoo(stub.clone()).await;
    let (state, app) = setup_app(&url);
    let token = token_for(&state, 2, Some(3), Role::Student);

    let (status, body) = send(
        &app,
        post_json("/api/schedules/5/register", Some(&token), json!({ "notes": "Vegetarian lunch" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Registration successful! You will receive a confirmation email shortly."
    );
    let attendee = &body["data"]["attendee"];
    assert_eq!(attendee["id"], 77);
    assert_eq!(attendee["userName"], "Jane Doe");
    assert_eq!(attendee["state"], "registered");
    assert_eq!(attendee["notes"], "Vegetarian lunch");

    let creates = stub.calls_to("seitech.schedule.attendee", "create");
    assert_eq!(creates[0].args[0]["schedule_id"], 5);
    assert_eq!(creates[0].args[0]["user_id"], 2);
}

#[tokio::test]
async fn test_register_without_body() {
    let stub = OdooStub::new().orm("seitech.schedule", "search_read", json!([open_schedule()]));
    let (state, app) = setup_with_stub(stub).await;
    let token = token_for(&state, 2, Some(3), Role::Student);

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/schedules/5/register")
        .header("authorization", format!("Bearer {token}"))
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["attendee"]["notes"].is_null());
}

#[tokio::test]
async fn test_register_blocked_sessions() {
    let cases = [
        (json!({ "state": "cancelled" }), "This session is not open for registration"),
        (
            json!({ "registration_deadline": odoo_datetime(-Duration::days(1)) }),
            "Registration deadline has passed",
        ),
        (json!({ "attendee_count": 12 }), "This session is fully booked"),
    ];

    for (patch, message) in cases {
        let mut schedule = open_schedule();
        for (key, value) in patch.as_object().unwrap() {
            schedule[key] = value.clone();
        }
        let stub = OdooStub::new().orm("seitech.schedule", "search_read", json!([schedule]));
        let (state, app) = setup_with_stub(stub).await;
        let token = token_for(&state, 2, Some(3), Role::Student);

        let (status, body) = send(&app, post_json("/api/schedules/5/register", Some(&token), json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{message}");
        assert_eq!(body["message"], message);
    }
}

#[tokio::test]
async fn test_register_twice_is_rejected() {
    let stub = OdooStub::new()
        .orm("seitech.schedule", "search_read", json!([open_schedule()]))
        .orm("seitech.schedule.attendee", "search_count", json!(1));
    let url = spawn_odoo(stub.clone()).await;
    let (state, app) = setup_app(&url);
    let token = token_for(&state, 2, Some(3), Role::Student);

    let (status, body) = send(&app, post_json("/api/schedules/5/register", Some(&token), json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You are already registered for this session");
    assert!(stub.calls_to("seitech.schedule.attendee", "create").is_empty());
}

#[tokio::test]
async fn test_register_unknown_schedule() {
    let (state, app) = setup_with_stub(OdooStub::new()).await;
    let token = token_for(&state, 2, Some(3), Role::Student);

    let (status, body) = send(&app, post_json("/api/schedules/9/register", Some(&token), json!({}))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Schedule not found");
}

#[tokio::test]
async fn test_recommendation_action_validation() {
    let (state, app) = setup_with_stub(OdooStub::new()).await;
    let token = token_for(&state, 2, Some(3), Role::Student);

    let (status, body) = send(&app, patch_json("/api/recommendations/3", Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "action is required");

    let (status, body) = send(
        &app,
        patch_json("/api/recommendations/3", Some(&token), json!({ "action": "archive" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid action");
}

#[tokio::test]
async fn test_recommendation_action_runs_model_method() {
    let stub = OdooStub::new().orm(
        "seitech.recommendation",
        "search_read",
        json!([{ "id": 3, "user_id": [2, "User 2"], "status": "dismissed", "viewed_date": false }]),
    );
    let url = spawn_odoo(stub.clone()).await;
    let (state, app) = setup_app(&url);
    let token = token_for(&state, 2, Some(3), Role::Student);

    let (status, body) = send(
        &app,
        patch_json("/api/recommendations/3", Some(&token), json!({ "action": "dismiss" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Recommendation dismiss successfully");
    assert!(body["data"]["viewed_date"].is_null());
    assert_eq!(stub.calls_to("seitech.recommendation", "action_dismiss").len(), 1);
}
