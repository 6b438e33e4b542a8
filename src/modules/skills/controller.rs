use anyhow::anyhow;
use axum::extract::{Path, Query, State};
use serde_json::Value;
use tracing::instrument;

use seitech_core::ApiResponse;

use crate::middleware::auth::AuthUser;
use crate::modules::skills::model::{SkillQuery, UserSkillAction, UserSkillActionRequest, UserSkillQuery};
use crate::modules::skills::service::SkillService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::LenientJson;

#[utoipa::path(
    get,
    path = "/api/skills",
    params(SkillQuery),
    responses((status = 200, description = "Active skills with offset pagination")),
    tag = "Skills"
)]
#[instrument(skip(state))]
pub async fn get_skills(
    State(state): State<AppState>,
    Query(query): Query<SkillQuery>,
) -> Result<ApiResponse<Vec<Value>>, AppError> {
    let (skills, pagination) = SkillService::list(&state.odoo, query).await?;
    Ok(ApiResponse::ok(skills).with_field("pagination", pagination))
}

#[utoipa::path(
    get,
    path = "/api/skills/{id}",
    params(("id" = i64, Path, description = "Skill ID")),
    responses(
        (status = 200, description = "Skill with courses and child skills"),
        (status = 404, description = "Skill not found")
    ),
    tag = "Skills"
)]
#[instrument(skip(state))]
pub async fn get_skill(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Value>, AppError> {
    let skill = SkillService::get(&state.odoo, id).await?;
    Ok(ApiResponse::ok(skill))
}

#[utoipa::path(
    get,
    path = "/api/skills/user",
    params(UserSkillQuery),
    responses(
        (status = 200, description = "The user's skills and profile summary"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Skills",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_user_skills(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<UserSkillQuery>,
) -> Result<ApiResponse<Value>, AppError> {
    let skills = SkillService::user_skills(&state.odoo, auth_user.odoo_uid()?, query).await?;
    Ok(ApiResponse::ok(skills))
}

#[utoipa::path(
    post,
    path = "/api/skills/user",
    request_body = UserSkillActionRequest,
    responses(
        (status = 200, description = "Skill updated; `result` holds the action outcome"),
        (status = 400, description = "Missing or unknown action"),
        (status = 404, description = "User skill not found")
    ),
    tag = "Skills",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user, request))]
pub async fn update_user_skill(
    State(state): State<AppState>,
    auth_user: AuthUser,
    LenientJson(request): LenientJson<UserSkillActionRequest>,
) -> Result<ApiResponse<Value>, AppError> {
    let name = request.action.clone().unwrap_or_default();
    let (skill_id, action) =
        UserSkillAction::from_request(request).map_err(|msg| AppError::bad_request(anyhow!(msg)))?;

    let (skill, result) =
        SkillService::update_user_skill(&state.odoo, auth_user.odoo_uid()?, skill_id, action).await?;
    Ok(ApiResponse::ok(skill)
        .with_field("result", result)
        .with_message(format!("Action '{name}' executed successfully")))
}
