use axum::{Router, middleware, routing::get};

use seitech_cache::{CacheControlConfig, cache_control, etag_middleware};

use crate::state::AppState;

use super::controller::{
    get_faq_categories, get_faqs, get_homepage, get_navigation, get_page, get_pages, get_partners,
    get_section, get_service, get_service_categories, get_services, get_settings, get_statistics,
    get_team, get_testimonials,
};

pub fn init_cms_router() -> Router<AppState> {
    Router::new()
        .route("/settings", get(get_settings))
        .route("/navigation/{type}", get(get_navigation))
        .route("/testimonials", get(get_testimonials))
        .route("/faqs", get(get_faqs))
        .route("/faqs/categories", get(get_faq_categories))
        .route("/services", get(get_services))
        .route("/services/categories", get(get_service_categories))
        .route("/services/{slug}", get(get_service))
        .route("/partners", get(get_partners))
        .route("/team", get(get_team))
        .route("/statistics", get(get_statistics))
        .route("/homepage", get(get_homepage))
        .route("/pages", get(get_pages))
        .route("/pages/{slug}", get(get_page))
        .route("/sections/{identifier}", get(get_section))
        .layer(middleware::from_fn(etag_middleware))
        .layer(cache_control(CacheControlConfig::public(300)))
}
