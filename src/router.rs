use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::rate_limit::{limit_auth, limit_general, rate_limit_envelope};
use crate::modules::admin::init_admin_router;
use crate::modules::auth::init_auth_router;
use crate::modules::blog::init_blog_router;
use crate::modules::cart::init_cart_router;
use crate::modules::certificates::init_certificates_router;
use crate::modules::cms::init_cms_router;
use crate::modules::courses::{init_categories_router, init_courses_router};
use crate::modules::dashboard::init_dashboard_router;
use crate::modules::discussions::init_discussions_router;
use crate::modules::enquiries::{init_consultation_router, init_contact_router};
use crate::modules::enrollments::init_enrollments_router;
use crate::modules::gamification::{
    init_gamification_router, init_leaderboard_router, init_streaks_router,
};
use crate::modules::health::init_health_router;
use crate::modules::learning_paths::init_learning_paths_router;
use crate::modules::notifications::init_notifications_router;
use crate::modules::orders::init_orders_router;
use crate::modules::recommendations::init_recommendations_router;
use crate::modules::schedules::init_schedules_router;
use crate::modules::seo::{init_robots_router, init_sitemap_router};
use crate::modules::skills::init_skills_router;
use crate::modules::study_groups::init_study_groups_router;
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

pub fn init_router(state: AppState) -> Router {
    let limits = &state.rate_limit_config;

    let general = Router::new()
        .nest("/health", init_health_router())
        .nest("/courses", init_courses_router())
        .nest("/categories", init_categories_router())
        .nest("/cart", init_cart_router())
        .nest("/enrollments", init_enrollments_router())
        .nest("/certificates", init_certificates_router())
        .nest("/dashboard", init_dashboard_router())
        .nest("/cms", init_cms_router())
        .nest("/notifications", init_notifications_router())
        .nest("/leaderboard", init_leaderboard_router())
        .nest("/gamification", init_gamification_router())
        .nest("/streaks", init_streaks_router())
        .nest("/discussions", init_discussions_router())
        .nest("/study-groups", init_study_groups_router())
        .nest("/schedules", init_schedules_router())
        .nest("/learning-paths", init_learning_paths_router())
        .nest("/skills", init_skills_router())
        .nest("/recommendations", init_recommendations_router())
        .nest("/orders", init_orders_router())
        .nest("/contact", init_contact_router())
        .nest("/consultation", init_consultation_router())
        .nest("/blog", init_blog_router())
        .nest("/sitemap", init_sitemap_router())
        .nest("/robots", init_robots_router())
        .nest("/admin", init_admin_router(state.clone()));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest(
            "/api",
            limit_general(general, limits)
                .nest("/auth", limit_auth(init_auth_router(), limits))
                .layer(middleware::from_fn(rate_limit_envelope)),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
