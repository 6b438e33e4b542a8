//! Tracing subscriber setup and per-request logging.
//!
//! Console output is filtered by `RUST_LOG`. Errors also go to
//! `storage/logs/seitech.log` and everything at info and above to
//! `storage/logs/seitech.json`, both rotated daily. Spans are exported over
//! OTLP when `OTEL_EXPORTER_OTLP_ENDPOINT` accepts a connection.

use std::time::{Duration, Instant};

use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderValue, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use opentelemetry::{KeyValue, global, trace::TraceError};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    propagation::TraceContextPropagator,
    runtime,
    trace::{self as sdktrace, RandomIdGenerator, Sampler, Tracer},
};
use opentelemetry_semantic_conventions::resource::{
    DEPLOYMENT_ENVIRONMENT, SERVICE_NAME, SERVICE_VERSION,
};
use tracing::{debug, error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use seitech_config::SiteConfig;

use crate::middleware::rate_limit::client_key;

const LOG_DIR: &str = "storage/logs";
const SERVICE: &str = "seitech-gateway";
const DEFAULT_DIRECTIVES: &str = "seitech=info,seitech_odoo=info,seitech_cache=info,tower_http=warn,hyper=info,tonic=info";

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Load balancer health checks; logged at debug unless they fail.
const HEALTH_CHECK_PATHS: &[&str] = &["/api/health"];

struct Completion<'a> {
    request_id: &'a str,
    method: &'a Method,
    path: &'a str,
    client: &'a str,
    status: StatusCode,
    latency: Duration,
}

impl Completion<'_> {
    fn log(&self) {
        let status = self.status.as_u16();
        let latency_ms = self.latency.as_millis() as u64;
        let (request_id, method, path, client) = (self.request_id, self.method, self.path, self.client);

        if self.status.is_server_error() {
            error!(request_id, %method, path, client, status, latency_ms, "Server error");
        } else if self.status.is_client_error() {
            warn!(request_id, %method, path, client, status, latency_ms, "Client error");
        } else if HEALTH_CHECK_PATHS.contains(&path) {
            debug!(request_id, %method, path, status, latency_ms, "Health check answered");
        } else {
            info!(request_id, %method, path, client, status, latency_ms, "Request completed");
        }
    }
}

/// One event when a request arrives and one when it completes. The request
/// id is taken from `x-request-id` when the caller sent one and echoed back.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let client = client_key(&req);
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    if HEALTH_CHECK_PATHS.contains(&path.as_str()) {
        debug!(request_id = %request_id, method = %method, path = %path, "Incoming health check");
    } else {
        info!(request_id = %request_id, method = %method, path = %path, client = %client, "Incoming request");
    }

    let mut response = next.run(req).await;

    Completion {
        request_id: &request_id,
        method: &method,
        path: &path,
        client: &client,
        status: response.status(),
        latency: start.elapsed(),
    }
    .log();

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn init_tracer(site: &SiteConfig) -> Result<Tracer, TraceError> {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());

    global::set_text_map_propagator(TraceContextPropagator::new());

    let resource = Resource::new(vec![
        KeyValue::new(SERVICE_NAME, SERVICE),
        KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
        KeyValue::new(DEPLOYMENT_ENVIRONMENT, site.environment.clone()),
        KeyValue::new("demo_mode", site.demo_mode),
    ]);

    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(opentelemetry_otlp::new_exporter().tonic().with_endpoint(endpoint))
        .with_trace_config(
            sdktrace::Config::default()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(resource),
        )
        .install_batch(runtime::Tokio)
}

pub fn init_tracing(site: &SiteConfig) {
    if let Err(e) = std::fs::create_dir_all(LOG_DIR) {
        eprintln!("Failed to create {LOG_DIR}: {e}");
    }

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    let console = fmt::layer()
        .with_target(false)
        .with_line_number(true)
        .compact()
        .with_filter(console_filter);

    let errors = fmt::layer()
        .with_writer(RollingFileAppender::new(Rotation::DAILY, LOG_DIR, "seitech.log"))
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(EnvFilter::new("error"));

    let json = fmt::layer()
        .json()
        .with_writer(RollingFileAppender::new(Rotation::DAILY, LOG_DIR, "seitech.json"))
        .with_current_span(true)
        .with_span_list(false)
        .with_filter(EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(console).with(errors).with(json);

    match init_tracer(site) {
        Ok(tracer) => {
            registry.with(tracing_opentelemetry::layer().with_tracer(tracer)).init();
            info!(environment = %site.environment, "Tracing initialized with OTLP export");
        }
        Err(e) => {
            registry.init();
            warn!(error = %e, environment = %site.environment, "OTLP exporter unavailable, logging to files only");
        }
    }
}

pub async fn shutdown_tracer() {
    info!("Flushing OpenTelemetry spans");
    global::shutdown_tracer_provider();
}
