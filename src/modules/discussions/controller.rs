use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use serde_json::Value;
use tracing::instrument;

use seitech_core::ApiResponse;

use crate::middleware::auth::AuthUser;
use crate::modules::discussions::model::{
    CreateDiscussionRequest, CreateReplyRequest, DiscussionPage, DiscussionQuery,
    UpdateDiscussionRequest, UpvoteResult,
};
use crate::modules::discussions::service::DiscussionService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::{LenientJson, checked_body};

fn viewer(auth_user: &Option<AuthUser>) -> Option<i64> {
    auth_user.as_ref().and_then(|user| user.odoo_uid().ok())
}

#[utoipa::path(
    get,
    path = "/api/discussions",
    params(DiscussionQuery),
    responses(
        (status = 200, description = "Discussions, pinned first", body = DiscussionPage),
        (status = 500, description = "Failed to fetch discussions")
    ),
    tag = "Discussions"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_discussions(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
    Query(query): Query<DiscussionQuery>,
) -> Result<ApiResponse<DiscussionPage>, AppError> {
    let page = DiscussionService::list(&state.odoo, viewer(&auth_user), query).await?;
    Ok(ApiResponse::ok(page))
}

#[utoipa::path(
    post,
    path = "/api/discussions",
    request_body = CreateDiscussionRequest,
    responses(
        (status = 201, description = "Discussion created"),
        (status = 400, description = "Name, content, and category are required"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Discussions",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip_all)]
pub async fn create_discussion(
    State(state): State<AppState>,
    auth_user: AuthUser,
    body: Result<Json<CreateDiscussionRequest>, JsonRejection>,
) -> Result<ApiResponse<Value>, AppError> {
    let dto = checked_body(body, "Name, content, and category are required")?;
    let discussion = DiscussionService::create(&state.odoo, &auth_user, dto).await?;
    Ok(ApiResponse::created(discussion).with_message("Discussion created"))
}

#[utoipa::path(
    get,
    path = "/api/discussions/{id}",
    params(("id" = i64, Path, description = "Discussion ID")),
    responses(
        (status = 200, description = "Discussion with its replies"),
        (status = 404, description = "Discussion not found")
    ),
    tag = "Discussions"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_discussion(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Value>, AppError> {
    let discussion = DiscussionService::get(&state.odoo, viewer(&auth_user), id).await?;
    Ok(ApiResponse::ok(discussion))
}

#[utoipa::path(
    patch,
    path = "/api/discussions/{id}",
    params(("id" = i64, Path, description = "Discussion ID")),
    request_body = UpdateDiscussionRequest,
    responses(
        (status = 200, description = "Discussion updated"),
        (status = 403, description = "Only the author can modify this discussion"),
        (status = 404, description = "Discussion not found")
    ),
    tag = "Discussions",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_discussion(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    LenientJson(dto): LenientJson<UpdateDiscussionRequest>,
) -> Result<ApiResponse<Value>, AppError> {
    let discussion = DiscussionService::update(&state.odoo, &auth_user, id, dto).await?;
    Ok(ApiResponse::ok(discussion).with_message("Discussion updated"))
}

#[utoipa::path(
    delete,
    path = "/api/discussions/{id}",
    params(("id" = i64, Path, description = "Discussion ID")),
    responses(
        (status = 200, description = "Discussion closed"),
        (status = 403, description = "Only the author can modify this discussion"),
        (status = 404, description = "Discussion not found")
    ),
    tag = "Discussions",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_discussion(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Value>, AppError> {
    DiscussionService::close(&state.odoo, &auth_user, id).await?;
    Ok(ApiResponse::ok(Value::Null).with_message("Discussion closed"))
}

#[utoipa::path(
    get,
    path = "/api/discussions/{id}/replies",
    params(("id" = i64, Path, description = "Discussion ID")),
    responses((status = 200, description = "Replies as a tree, oldest first")),
    tag = "Discussions"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_replies(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Vec<Value>>, AppError> {
    let replies = DiscussionService::replies(&state.odoo, viewer(&auth_user), id).await?;
    Ok(ApiResponse::ok(replies))
}

#[utoipa::path(
    post,
    path = "/api/discussions/{id}/replies",
    params(("id" = i64, Path, description = "Discussion ID")),
    request_body = CreateReplyRequest,
    responses(
        (status = 201, description = "Reply posted"),
        (status = 400, description = "Content is required"),
        (status = 404, description = "Discussion not found")
    ),
    tag = "Discussions",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user, body))]
pub async fn create_reply(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    body: Result<Json<CreateReplyRequest>, JsonRejection>,
) -> Result<ApiResponse<Value>, AppError> {
    let dto = checked_body(body, "Content is required")?;
    let reply = DiscussionService::reply(&state.odoo, &auth_user, id, dto).await?;
    Ok(ApiResponse::created(reply).with_message("Reply posted"))
}

#[utoipa::path(
    post,
    path = "/api/discussions/{id}/upvote",
    params(("id" = i64, Path, description = "Discussion ID")),
    responses(
        (status = 200, description = "Upvote toggled", body = UpvoteResult),
        (status = 404, description = "Discussion not found")
    ),
    tag = "Discussions",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn upvote_discussion(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<ApiResponse<UpvoteResult>, AppError> {
    let result = DiscussionService::upvote(&state.odoo, &auth_user, id).await?;
    Ok(ApiResponse::ok(result))
}
