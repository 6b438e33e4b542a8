use axum::{
    Router,
    routing::{get, patch},
};

use crate::state::AppState;

use super::controller::{generate_recommendations, get_recommendations, update_recommendation};

pub fn init_recommendations_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_recommendations).post(generate_recommendations))
        .route("/{id}", patch(update_recommendation))
}
