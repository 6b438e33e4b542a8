use axum::{
    extract::State,
    http::{
        HeaderValue,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use tracing::instrument;

use seitech_cache::CacheControlConfig;

use crate::modules::seo::model::render_robots;
use crate::modules::seo::service::SeoService;
use crate::state::AppState;

const DAY: u64 = 86_400;
const HOUR: u64 = 3_600;

#[utoipa::path(
    get,
    path = "/api/sitemap",
    responses(
        (status = 200, description = "XML sitemap of static pages, categories and courses", content_type = "application/xml")
    ),
    tag = "SEO"
)]
#[instrument(skip(state))]
pub async fn get_sitemap(State(state): State<AppState>) -> Response {
    let sitemap = SeoService::sitemap(&state.odoo, &state.site_config.site_url).await;
    let policy = if sitemap.complete {
        CacheControlConfig::shared_only(DAY).revalidating()
    } else {
        CacheControlConfig::shared_only(HOUR)
    };
    (
        [
            (CONTENT_TYPE, HeaderValue::from_static("application/xml")),
            (CACHE_CONTROL, policy.to_header_value()),
        ],
        sitemap.xml,
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/api/robots",
    responses(
        (status = 200, description = "robots.txt pointing crawlers at the sitemap", content_type = "text/plain")
    ),
    tag = "SEO"
)]
#[instrument(skip(state))]
pub async fn get_robots(State(state): State<AppState>) -> Response {
    (
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        render_robots(&state.site_config.site_url),
    )
        .into_response()
}
