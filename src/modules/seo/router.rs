use axum::{Router, routing::get};

use seitech_cache::{CacheControlConfig, cache_control};

use crate::state::AppState;

use super::controller::{get_robots, get_sitemap};

/// Mounted at `/api/sitemap`.
pub fn init_sitemap_router() -> Router<AppState> {
    Router::new().route("/", get(get_sitemap))
}

/// Mounted at `/api/robots`.
pub fn init_robots_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_robots))
        .layer(cache_control(CacheControlConfig::shared_only(86_400).revalidating()))
}
