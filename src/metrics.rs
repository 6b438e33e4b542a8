//! Prometheus metrics for the gateway.
//!
//! HTTP metrics are labelled by route group (`/api/cart/sync` counts under
//! `cart`) so ids in paths never become label values. ERP call metrics are
//! recorded by `seitech-odoo`; the domain counters below are bumped by the
//! feature modules. `OBSERVABILITY_ENABLED=false` turns all of it off.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tracing::error;

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Requests proxied to the ERP can take up to the client timeout (30 s).
const HTTP_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];
const ODOO_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true)
    })
}

/// Install the Prometheus recorder and its upkeep task. `None` when
/// observability is off or a recorder is already installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if !is_observability_enabled() {
        return None;
    }

    let installed = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full("http_request_duration_seconds".into()), HTTP_BUCKETS)
        .and_then(|b| b.set_buckets_for_metric(Matcher::Full("odoo_call_duration_seconds".into()), ODOO_BUCKETS))
        .and_then(PrometheusBuilder::install_recorder);

    let handle = match installed {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "Failed to install Prometheus recorder");
            return None;
        }
    };

    let upkeep = handle.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(5));
        loop {
            tick.tick().await;
            upkeep.run_upkeep();
        }
    });

    Some(handle)
}

/// `/api/courses/{slug}` -> `courses`, `/api/health` -> `health`. Paths
/// outside `/api` (docs, swagger assets) are grouped as `docs`.
pub fn route_group(path: &str) -> String {
    match path.strip_prefix("/api/") {
        Some(rest) => rest.split('/').next().filter(|s| !s.is_empty()).unwrap_or("root").to_string(),
        None => "docs".to_string(),
    }
}

fn status_class(status: u16) -> &'static str {
    match status {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().to_string();
    let group = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| route_group(req.uri().path()), |p| route_group(p.as_str()));

    gauge!("http_requests_active").increment(1.0);
    let response = next.run(req).await;
    gauge!("http_requests_active").decrement(1.0);

    let status = response.status().as_u16();
    counter!("http_requests_total", "method" => method.clone(), "route" => group.clone(), "status" => status.to_string())
        .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "route" => group)
        .record(start.elapsed().as_secs_f64());
    counter!("http_requests_by_status", "status_class" => status_class(status)).increment(1);

    response
}

pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

fn count(name: &'static str, labels: &[(&'static str, String)]) {
    if is_observability_enabled() {
        counter!(name, labels).increment(1);
    }
}

pub fn track_user_login_success(role: &str, source: &str) {
    count(
        "user_logins_total",
        &[("status", "success".into()), ("role", role.into()), ("source", source.into())],
    );
}

pub fn track_user_login_failure(reason: &str) {
    count("user_logins_total", &[("status", "failure".into()), ("reason", reason.into())]);
}

pub fn track_session_issued() {
    count("session_tokens_issued_total", &[]);
}

/// A route answered with demo data because the ERP call failed.
pub fn track_demo_fallback(route: &str) {
    count("demo_fallbacks_total", &[("route", route.into())]);
}

pub fn track_cart_operation(operation: &str) {
    count("cart_operations_total", &[("operation", operation.into())]);
}

pub fn track_cache_lookup(resource: &str, hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    count("cms_cache_lookups_total", &[("resource", resource.into()), ("result", result.into())]);
}
