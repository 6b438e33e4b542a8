use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{get_schedule, get_schedules, register_for_schedule};

pub fn init_schedules_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_schedules))
        .route("/{id}", get(get_schedule))
        .route("/{id}/register", post(register_for_schedule))
}
