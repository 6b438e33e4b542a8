use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    get_badges, get_leaderboard, get_my_streak, get_student_leaderboard, get_user_achievements,
    update_leaderboard, update_my_streak,
};

pub fn init_leaderboard_router() -> Router<AppState> {
    Router::new().route("/", get(get_leaderboard).post(update_leaderboard))
}

pub fn init_gamification_router() -> Router<AppState> {
    Router::new()
        .route("/leaderboard", get(get_student_leaderboard))
        .route("/badges", get(get_badges))
        .route("/user-achievements", get(get_user_achievements))
}

pub fn init_streaks_router() -> Router<AppState> {
    Router::new().route("/me", get(get_my_streak).post(update_my_streak))
}
