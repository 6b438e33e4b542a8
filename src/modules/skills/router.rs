use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{get_skill, get_skills, get_user_skills, update_user_skill};

pub fn init_skills_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_skills))
        .route("/user", get(get_user_skills).post(update_user_skill))
        .route("/{id}", get(get_skill))
}
