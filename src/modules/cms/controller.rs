use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::Value;
use tracing::instrument;

use crate::modules::cms::defaults;
use crate::modules::cms::model::{
    FAQ_FILTERS, PARTNER_FILTERS, SERVICE_FILTERS, STATISTIC_FILTERS, TEAM_FILTERS,
    TESTIMONIAL_FILTERS, forwarded_filters, paginated,
};
use crate::modules::cms::service::{CmsResponse, CmsService};
use crate::state::AppState;
use crate::utils::url::encode_component;

const UNAVAILABLE: &str = "CMS service unavailable";

#[utoipa::path(
    get,
    path = "/api/cms/settings",
    responses((status = 200, description = "Site settings", body = seitech_core::response::Envelope)),
    tag = "CMS"
)]
#[instrument(skip(state))]
pub async fn get_settings(State(state): State<AppState>) -> CmsResponse {
    CmsService::with_defaults(&state, "settings", "/api/cms/settings", &[], defaults::site_settings).await
}

#[utoipa::path(
    get,
    path = "/api/cms/navigation/{type}",
    params(("type" = String, Path, description = "Navigation slot, e.g. header or footer")),
    responses((status = 200, description = "Navigation items", body = seitech_core::response::Envelope)),
    tag = "CMS"
)]
#[instrument(skip(state))]
pub async fn get_navigation(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> CmsResponse {
    let path = format!("/api/cms/navigation/{}", encode_component(&kind));
    CmsService::with_defaults(&state, "navigation", &path, &[], || {
        Value::Array(defaults::navigation(&kind))
    })
    .await
}

#[utoipa::path(
    get,
    path = "/api/cms/testimonials",
    params(
        ("service_type" = Option<String>, Query, description = "training, elearning or consultancy"),
        ("featured" = Option<bool>, Query, description = "Featured only"),
        ("course_id" = Option<i64>, Query, description = "Testimonials about one course"),
        ("limit" = Option<i64>, Query, description = "Page size"),
        ("offset" = Option<i64>, Query, description = "Page offset")
    ),
    responses((status = 200, description = "Testimonials with pagination", body = seitech_core::response::Envelope)),
    tag = "CMS"
)]
#[instrument(skip(state))]
pub async fn get_testimonials(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> CmsResponse {
    let filters = forwarded_filters(&params, TESTIMONIAL_FILTERS);
    CmsService::with_defaults(&state, "testimonials", "/api/cms/testimonials", &filters, || {
        paginated("testimonials", defaults::testimonials(), 10)
    })
    .await
}

#[utoipa::path(
    get,
    path = "/api/cms/faqs",
    params(
        ("category_slug" = Option<String>, Query, description = "FAQ category"),
        ("featured" = Option<bool>, Query, description = "Featured only"),
        ("search" = Option<String>, Query, description = "Free-text search"),
        ("limit" = Option<i64>, Query, description = "Page size"),
        ("offset" = Option<i64>, Query, description = "Page offset")
    ),
    responses((status = 200, description = "FAQs with pagination", body = seitech_core::response::Envelope)),
    tag = "CMS"
)]
#[instrument(skip(state))]
pub async fn get_faqs(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> CmsResponse {
    let filters = forwarded_filters(&params, FAQ_FILTERS);
    CmsService::with_defaults(&state, "faqs", "/api/cms/faqs", &filters, || {
        paginated("faqs", defaults::faqs(), 10)
    })
    .await
}

#[utoipa::path(
    get,
    path = "/api/cms/faqs/categories",
    responses((status = 200, description = "FAQ categories", body = seitech_core::response::Envelope)),
    tag = "CMS"
)]
#[instrument(skip(state))]
pub async fn get_faq_categories(State(state): State<AppState>) -> CmsResponse {
    CmsService::with_defaults(&state, "faq_categories", "/api/cms/faq-categories", &[], || {
        Value::Array(defaults::faq_categories())
    })
    .await
}

#[utoipa::path(
    get,
    path = "/api/cms/services",
    params(
        ("category_slug" = Option<String>, Query, description = "Service category slug"),
        ("category_id" = Option<i64>, Query, description = "Service category ID"),
        ("featured" = Option<bool>, Query, description = "Featured only"),
        ("homepage" = Option<bool>, Query, description = "Shown on the homepage"),
        ("limit" = Option<i64>, Query, description = "Page size"),
        ("offset" = Option<i64>, Query, description = "Page offset")
    ),
    responses((status = 200, description = "Consultancy services with pagination", body = seitech_core::response::Envelope)),
    tag = "CMS"
)]
#[instrument(skip(state))]
pub async fn get_services(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> CmsResponse {
    let filters = forwarded_filters(&params, SERVICE_FILTERS);
    CmsService::with_defaults(&state, "services", "/api/cms/services", &filters, || {
        paginated("services", defaults::services(), 50)
    })
    .await
}

#[utoipa::path(
    get,
    path = "/api/cms/services/categories",
    responses((status = 200, description = "Service categories", body = seitech_core::response::Envelope)),
    tag = "CMS"
)]
#[instrument(skip(state))]
pub async fn get_service_categories(State(state): State<AppState>) -> CmsResponse {
    CmsService::with_defaults(
        &state,
        "service_categories",
        "/api/cms/service-categories",
        &[],
        || Value::Array(defaults::service_categories()),
    )
    .await
}

#[utoipa::path(
    get,
    path = "/api/cms/services/{slug}",
    params(("slug" = String, Path, description = "Service slug")),
    responses(
        (status = 200, description = "Service detail", body = seitech_core::response::Envelope),
        (status = 404, description = "Service not found", body = seitech_core::response::ErrorEnvelope),
        (status = 500, description = "ERP unreachable", body = seitech_core::response::ErrorEnvelope)
    ),
    tag = "CMS"
)]
#[instrument(skip(state))]
pub async fn get_service(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> CmsResponse {
    let path = format!("/api/cms/services/{}", encode_component(&slug));
    CmsService::without_defaults(
        &state,
        "service",
        &path,
        Value::Null,
        (StatusCode::NOT_FOUND, "Service not found"),
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch service"),
    )
    .await
}

#[utoipa::path(
    get,
    path = "/api/cms/partners",
    params(
        ("type" = Option<String>, Query, description = "Partner type, e.g. accreditation"),
        ("featured" = Option<bool>, Query, description = "Featured only")
    ),
    responses((status = 200, description = "Accreditation partners", body = seitech_core::response::Envelope)),
    tag = "CMS"
)]
#[instrument(skip(state))]
pub async fn get_partners(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> CmsResponse {
    let filters = forwarded_filters(&params, PARTNER_FILTERS);
    CmsService::with_defaults(&state, "partners", "/api/cms/partners", &filters, || {
        Value::Array(defaults::partners())
    })
    .await
}

#[utoipa::path(
    get,
    path = "/api/cms/team",
    params(
        ("department" = Option<String>, Query, description = "Department"),
        ("featured" = Option<bool>, Query, description = "Featured only"),
        ("instructors" = Option<bool>, Query, description = "Instructors only")
    ),
    responses((status = 200, description = "Team members", body = seitech_core::response::Envelope)),
    tag = "CMS"
)]
#[instrument(skip(state))]
pub async fn get_team(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> CmsResponse {
    let filters = forwarded_filters(&params, TEAM_FILTERS);
    CmsService::with_defaults(&state, "team", "/api/cms/team", &filters, || {
        Value::Array(defaults::team())
    })
    .await
}

#[utoipa::path(
    get,
    path = "/api/cms/statistics",
    params(
        ("location" = Option<String>, Query, description = "Display location, e.g. homepage"),
        ("type" = Option<String>, Query, description = "Statistic type")
    ),
    responses((status = 200, description = "Headline statistics", body = seitech_core::response::Envelope)),
    tag = "CMS"
)]
#[instrument(skip(state))]
pub async fn get_statistics(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> CmsResponse {
    let filters = forwarded_filters(&params, STATISTIC_FILTERS);
    let location = params.get("location").filter(|l| !l.is_empty()).cloned();
    CmsService::with_defaults(&state, "statistics", "/api/cms/statistics", &filters, || {
        Value::Array(defaults::statistics(location.as_deref()))
    })
    .await
}

#[utoipa::path(
    get,
    path = "/api/cms/homepage",
    responses(
        (status = 200, description = "Homepage sections; success is false when the ERP has none", body = seitech_core::response::Envelope),
        (status = 503, description = "ERP unreachable", body = seitech_core::response::ErrorEnvelope)
    ),
    tag = "CMS"
)]
#[instrument(skip(state))]
pub async fn get_homepage(State(state): State<AppState>) -> CmsResponse {
    CmsService::without_defaults(
        &state,
        "homepage",
        "/api/cms/homepage",
        Value::Null,
        (StatusCode::OK, "Homepage data unavailable"),
        (StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE),
    )
    .await
}

#[utoipa::path(
    get,
    path = "/api/cms/pages",
    responses(
        (status = 200, description = "Published pages; success is false when the ERP has none", body = seitech_core::response::Envelope),
        (status = 503, description = "ERP unreachable", body = seitech_core::response::ErrorEnvelope)
    ),
    tag = "CMS"
)]
#[instrument(skip(state))]
pub async fn get_pages(State(state): State<AppState>) -> CmsResponse {
    CmsService::without_defaults(
        &state,
        "pages",
        "/api/cms/pages",
        Value::Array(Vec::new()),
        (StatusCode::OK, "Failed to fetch pages"),
        (StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE),
    )
    .await
}

#[utoipa::path(
    get,
    path = "/api/cms/pages/{slug}",
    params(("slug" = String, Path, description = "Page slug")),
    responses(
        (status = 200, description = "Page content", body = seitech_core::response::Envelope),
        (status = 404, description = "Page not found", body = seitech_core::response::ErrorEnvelope),
        (status = 503, description = "ERP unreachable", body = seitech_core::response::ErrorEnvelope)
    ),
    tag = "CMS"
)]
#[instrument(skip(state))]
pub async fn get_page(State(state): State<AppState>, Path(slug): Path<String>) -> CmsResponse {
    let path = format!("/api/cms/pages/{}", encode_component(&slug));
    CmsService::without_defaults(
        &state,
        "page",
        &path,
        Value::Null,
        (StatusCode::NOT_FOUND, "Page not found"),
        (StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE),
    )
    .await
}

#[utoipa::path(
    get,
    path = "/api/cms/sections/{identifier}",
    params(("identifier" = String, Path, description = "Section identifier")),
    responses(
        (status = 200, description = "Section content", body = seitech_core::response::Envelope),
        (status = 404, description = "Section not found", body = seitech_core::response::ErrorEnvelope),
        (status = 503, description = "ERP unreachable", body = seitech_core::response::ErrorEnvelope)
    ),
    tag = "CMS"
)]
#[instrument(skip(state))]
pub async fn get_section(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> CmsResponse {
    let path = format!("/api/cms/sections/{}", encode_component(&identifier));
    CmsService::without_defaults(
        &state,
        "section",
        &path,
        Value::Null,
        (StatusCode::NOT_FOUND, "Section not found"),
        (StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE),
    )
    .await
}
