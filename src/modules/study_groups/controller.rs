use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use serde_json::Value;
use tracing::instrument;

use seitech_core::ApiResponse;

use crate::middleware::auth::AuthUser;
use crate::modules::study_groups::model::{
    CreateStudyGroupRequest, MembershipChange, StudyGroupPage, StudyGroupQuery,
    UpdateStudyGroupRequest,
};
use crate::modules::study_groups::service::StudyGroupService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::{LenientJson, checked_body};

#[utoipa::path(
    get,
    path = "/api/study-groups",
    params(StudyGroupQuery),
    responses(
        (status = 200, description = "Study groups with the caller's membership", body = StudyGroupPage),
        (status = 401, description = "my_groups requires a signed-in user")
    ),
    tag = "Study Groups"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_study_groups(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
    Query(query): Query<StudyGroupQuery>,
) -> Result<ApiResponse<StudyGroupPage>, AppError> {
    let viewer = auth_user.as_ref().and_then(|u| u.odoo_uid().ok());
    let page = StudyGroupService::list(&state.odoo, viewer, query).await?;
    Ok(ApiResponse::ok(page))
}

#[utoipa::path(
    post,
    path = "/api/study-groups",
    request_body = CreateStudyGroupRequest,
    responses(
        (status = 201, description = "Study group created and activated"),
        (status = 400, description = "Name is required"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Study Groups",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip_all)]
pub async fn create_study_group(
    State(state): State<AppState>,
    auth_user: AuthUser,
    body: Result<Json<CreateStudyGroupRequest>, JsonRejection>,
) -> Result<ApiResponse<Value>, AppError> {
    let dto = checked_body(body, "Name is required")?;
    let group = StudyGroupService::create(&state.odoo, auth_user.odoo_uid()?, dto).await?;
    Ok(ApiResponse::created(group).with_message("Study group created"))
}

#[utoipa::path(
    get,
    path = "/api/study-groups/{id}",
    params(("id" = i64, Path, description = "Study group ID")),
    responses(
        (status = 200, description = "Study group with members"),
        (status = 404, description = "Study group not found")
    ),
    tag = "Study Groups"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_study_group(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Value>, AppError> {
    let viewer = auth_user.as_ref().and_then(|u| u.odoo_uid().ok());
    let group = StudyGroupService::get(&state.odoo, viewer, id).await?;
    Ok(ApiResponse::ok(group))
}

#[utoipa::path(
    patch,
    path = "/api/study-groups/{id}",
    params(("id" = i64, Path, description = "Study group ID")),
    request_body = UpdateStudyGroupRequest,
    responses(
        (status = 200, description = "Study group updated"),
        (status = 403, description = "Only the group owner can modify this group"),
        (status = 404, description = "Study group not found")
    ),
    tag = "Study Groups",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_study_group(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    LenientJson(dto): LenientJson<UpdateStudyGroupRequest>,
) -> Result<ApiResponse<Value>, AppError> {
    let group = StudyGroupService::update(&state.odoo, auth_user.odoo_uid()?, id, dto).await?;
    Ok(ApiResponse::ok(group).with_message("Study group updated"))
}

#[utoipa::path(
    delete,
    path = "/api/study-groups/{id}",
    params(("id" = i64, Path, description = "Study group ID")),
    responses(
        (status = 200, description = "Study group archived"),
        (status = 403, description = "Only the group owner can modify this group"),
        (status = 404, description = "Study group not found")
    ),
    tag = "Study Groups",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_study_group(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Value>, AppError> {
    StudyGroupService::archive(&state.odoo, auth_user.odoo_uid()?, id).await?;
    Ok(ApiResponse::ok(Value::Null).with_message("Study group archived"))
}

#[utoipa::path(
    post,
    path = "/api/study-groups/{id}/join",
    params(("id" = i64, Path, description = "Study group ID")),
    responses(
        (status = 200, description = "Joined, or awaiting approval", body = MembershipChange),
        (status = 400, description = "Already a member, group full or invitation only"),
        (status = 404, description = "Study group not found")
    ),
    tag = "Study Groups",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn join_study_group(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<ApiResponse<MembershipChange>, AppError> {
    let change = StudyGroupService::join(&state.odoo, &auth_user, id).await?;
    let message = if change.is_member {
        "Joined study group"
    } else {
        "Join request sent for approval"
    };
    Ok(ApiResponse::ok(change).with_message(message))
}

#[utoipa::path(
    post,
    path = "/api/study-groups/{id}/leave",
    params(("id" = i64, Path, description = "Study group ID")),
    responses(
        (status = 200, description = "Left study group", body = MembershipChange),
        (status = 400, description = "Group owner cannot leave"),
        (status = 404, description = "Study group not found")
    ),
    tag = "Study Groups",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn leave_study_group(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<ApiResponse<MembershipChange>, AppError> {
    let change = StudyGroupService::leave(&state.odoo, &auth_user, id).await?;
    Ok(ApiResponse::ok(change).with_message("Left study group"))
}
