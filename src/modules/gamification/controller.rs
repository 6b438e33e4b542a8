use anyhow::anyhow;
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::instrument;

use seitech_core::ApiResponse;
use seitech_core::permissions::Role;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_any_role;
use crate::modules::gamification::model::{
    BadgeList, LeaderboardPage, LeaderboardQuery, StreakActionRequest, StudentLeaderboard,
    StudentLeaderboardQuery, UserAchievements,
};
use crate::modules::gamification::service::GamificationService;
use crate::state::AppState;
use crate::utils::errors::AppError;

#[utoipa::path(
    get,
    path = "/api/leaderboard",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Leaderboard rankings, best first", body = LeaderboardPage),
        (status = 500, description = "Failed to fetch leaderboard")
    ),
    tag = "Gamification"
)]
#[instrument(skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<ApiResponse<LeaderboardPage>, AppError> {
    let page = GamificationService::leaderboard(&state.odoo, query).await?;
    Ok(ApiResponse::ok(page))
}

#[utoipa::path(
    post,
    path = "/api/leaderboard",
    responses(
        (status = 200, description = "Leaderboard updated successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Gamification",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip_all)]
pub async fn update_leaderboard(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<Value>, AppError> {
    check_any_role(&auth_user, &[Role::Admin])?;
    GamificationService::refresh_leaderboards(&state.odoo).await?;
    Ok(ApiResponse::ok(Value::Null).with_message("Leaderboard updated successfully"))
}

#[utoipa::path(
    get,
    path = "/api/gamification/leaderboard",
    params(StudentLeaderboardQuery),
    responses((status = 200, description = "Student ranking; empty with a message when unavailable", body = StudentLeaderboard)),
    tag = "Gamification"
)]
#[instrument(skip(state))]
pub async fn get_student_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<StudentLeaderboardQuery>,
) -> ApiResponse<StudentLeaderboard> {
    ApiResponse::ok(GamificationService::student_leaderboard(&state.odoo, query).await)
}

#[utoipa::path(
    get,
    path = "/api/gamification/badges",
    responses((status = 200, description = "Active badges; empty with a message when unavailable", body = BadgeList)),
    tag = "Gamification"
)]
#[instrument(skip(state))]
pub async fn get_badges(State(state): State<AppState>) -> ApiResponse<BadgeList> {
    let list = match GamificationService::badges(&state.odoo).await {
        Ok(badges) => BadgeList {
            badges,
            message: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Badges unavailable");
            BadgeList {
                badges: Vec::new(),
                message: Some("Badge data is currently unavailable".into()),
            }
        }
    };
    ApiResponse::ok(list)
}

#[utoipa::path(
    get,
    path = "/api/gamification/user-achievements",
    responses(
        (status = 200, description = "Earned badges and stats; zeroed when the ERP has none", body = UserAchievements),
        (status = 401, description = "Not authenticated")
    ),
    tag = "Gamification",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip_all)]
pub async fn get_user_achievements(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
) -> Result<Response, AppError> {
    let auth_user = auth_user.ok_or_else(|| AppError::unauthorized("Not authenticated"))?;

    let from_erp = match auth_user.odoo_session() {
        Some(session) if !auth_user.is_demo() => {
            GamificationService::user_achievements(&state.odoo, Some(session)).await
        }
        _ => None,
    };

    Ok(match from_erp {
        Some(data) => ApiResponse::ok(data).into_response(),
        None => ApiResponse::ok(GamificationService::empty_achievements()).into_response(),
    })
}

#[utoipa::path(
    get,
    path = "/api/streaks/me",
    responses(
        (status = 200, description = "The user's learning streak with milestones"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Gamification",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip_all)]
pub async fn get_my_streak(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<Value>, AppError> {
    let streak = GamificationService::streak(&state.odoo, auth_user.odoo_uid()?).await?;
    Ok(ApiResponse::ok(streak))
}

#[utoipa::path(
    post,
    path = "/api/streaks/me",
    request_body = StreakActionRequest,
    responses(
        (status = 200, description = "Freeze day used"),
        (status = 400, description = "Unsupported streak action"),
        (status = 404, description = "Streak record not found")
    ),
    tag = "Gamification",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip_all)]
pub async fn update_my_streak(
    State(state): State<AppState>,
    auth_user: AuthUser,
    body: Result<Json<StreakActionRequest>, JsonRejection>,
) -> Result<ApiResponse<Value>, AppError> {
    let Json(request) = body.map_err(|_| AppError::bad_request(anyhow!("Invalid request data")))?;
    if request.action != "freeze" {
        return Err(AppError::bad_request(anyhow!("Unsupported streak action")));
    }

    let streak = GamificationService::freeze_streak(&state.odoo, auth_user.odoo_uid()?).await?;
    Ok(ApiResponse::ok(streak).with_message("Freeze day used"))
}
