mod common;

use axum::http::StatusCode;
use common::{
    OdooStub, UNREACHABLE_ODOO, delete, get, patch_json, post_json, send, setup_app,
    setup_with_stub, token_for,
};
use seitech_core::permissions::Role;
use serde_json::{Value, json};

const GROUP: &str = "seitech.study.group";
const PATH: &str = "seitech.learning.path";
const SKILL: &str = "seitech.skill";

fn group_owned_by(uid: i64) -> Value {
    json!([{
        "id": 4,
        "name": "NEBOSH revision",
        "owner_id": [uid, "Owner"],
        "member_count": 3,
        "privacy": "public",
        "join_policy": "open",
    }])
}

#[tokio::test]
async fn test_study_group_changes_require_session() {
    let (_, app) = setup_app(UNREACHABLE_ODOO);

    let (status, _) = send(&app, patch_json("/api/study-groups/4", None, json!({ "name": "x" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, delete("/api/study-groups/4", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_only_owner_modifies_study_group() {
    let stub = OdooStub::new().orm(GROUP, "search_read", group_owned_by(7));
    let (state, app) = setup_with_stub(stub.clone()).await;
    let member = token_for(&state, 8, Some(108), Role::Student);

    let (status, body) = send(
        &app,
        patch_json("/api/study-groups/4", Some(&member), json!({ "name": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Only the group owner can modify this group");

    let (status, body) = send(&app, delete("/api/study-groups/4", Some(&member))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Only the group owner can modify this group");

    assert!(stub.calls_to(GROUP, "write").is_empty());
    assert!(stub.calls_to(GROUP, "action_archive").is_empty());
}

#[tokio::test]
async fn test_owner_updates_study_group() {
    let stub = OdooStub::new().orm(GROUP, "search_read", group_owned_by(7));
    let (state, app) = setup_with_stub(stub.clone()).await;
    let owner = token_for(&state, 7, Some(107), Role::Student);

    let (status, body) = send(
        &app,
        patch_json("/api/study-groups/4", Some(&owner), json!({ "name": "Renamed", "max_members": 12 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Study group updated");
    let write = &stub.calls_to(GROUP, "write")[0];
    assert_eq!(write.args[0], json!([4]));
    assert_eq!(write.args[1]["name"], "Renamed");
    assert_eq!(write.args[1]["max_members"], 12);
}

#[tokio::test]
async fn test_owner_archives_study_group() {
    let stub = OdooStub::new().orm(GROUP, "search_read", group_owned_by(7));
    let (state, app) = setup_with_stub(stub.clone()).await;
    let owner = token_for(&state, 7, Some(107), Role::Student);

    let (status, body) = send(&app, delete("/api/study-groups/4", Some(&owner))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Study group archived");
    assert_eq!(stub.calls_to(GROUP, "action_archive")[0].args, json!([[4]]));
    assert!(stub.calls_to(GROUP, "unlink").is_empty());
}

#[tokio::test]
async fn test_missing_study_group() {
    let (state, app) = setup_with_stub(OdooStub::new()).await;
    let token = token_for(&state, 7, Some(107), Role::Student);

    let (status, body) = send(&app, delete("/api/study-groups/99", Some(&token))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Study group not found");
}

#[tokio::test]
async fn test_owner_cannot_leave_study_group() {
    let stub = OdooStub::new().orm(GROUP, "search_read", group_owned_by(7));
    let (state, app) = setup_with_stub(stub.clone()).await;
    let owner = token_for(&state, 7, Some(107), Role::Student);

    let (status, body) = send(&app, post_json("/api/study-groups/4/leave", Some(&owner), json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Group owner cannot leave. Transfer ownership first.");
    assert!(stub.calls_to("seitech.study.group.member", "unlink").is_empty());
}

#[tokio::test]
async fn test_learning_path_action_validation() {
    let stub = OdooStub::new();
    let (state, app) = setup_with_stub(stub.clone()).await;
    let token = token_for(&state, 7, Some(107), Role::Student);

    let (status, body) = send(&app, post_json("/api/learning-paths/3/actions", Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Action is required");

    let (status, body) = send(
        &app,
        post_json("/api/learning-paths/3/actions", Some(&token), json!({ "action": "teleport" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid action");

    assert!(stub.calls_to(PATH, "search_read").is_empty());
}

#[tokio::test]
async fn test_learning_path_action_of_another_user() {
    let stub = OdooStub::new().orm(PATH, "search_read", json!([{ "id": 3, "user_id": [9, "Someone"], "state": "active" }]));
    let (state, app) = setup_with_stub(stub.clone()).await;
    let token = token_for(&state, 7, Some(107), Role::Student);

    let (status, _) = send(
        &app,
        post_json("/api/learning-paths/3/actions", Some(&token), json!({ "action": "complete" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(stub.calls_to(PATH, "action_complete").is_empty());
}

#[tokio::test]
async fn test_skills_list_with_pagination() {
    let stub = OdooStub::new()
        .orm(
            SKILL,
            "search_read",
            json!([{ "id": 1, "name": "Risk assessment", "category": "safety", "parent_id": false }]),
        )
        .orm(SKILL, "search_count", json!(1));
    let (_, app) = setup_with_stub(stub.clone()).await;

    let (status, body) = send(&app, get("/api/skills?category=safety&limit=20", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Risk assessment");
    assert!(body["data"][0]["parent_id"].is_null());
    assert_eq!(body["pagination"], json!({ "offset": 0, "limit": 20, "total": 1, "hasMore": false }));

    let query = &stub.calls_to(SKILL, "search_read")[0];
    assert_eq!(
        query.kwargs["domain"],
        json!([["active", "=", true], ["category", "=", "safety"]])
    );
}

#[tokio::test]
async fn test_unknown_skill() {
    let (_, app) = setup_with_stub(OdooStub::new()).await;

    let (status, body) = send(&app, get("/api/skills/404", None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Skill not found");
}
