use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{get_post, get_posts};

pub fn init_blog_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_posts))
        .route("/{slug}", get(get_post))
}
