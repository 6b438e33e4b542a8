//! Per-client request quotas.
//!
//! Buckets are `tower_governor` layers keyed by [`SmartIpKeyExtractor`]:
//! `X-Forwarded-For`, `X-Real-IP` or `Forwarded` when the fronting proxy set
//! them, else the peer address from `ConnectInfo`. `/api/auth` has its own,
//! stricter bucket and does not draw from the general one.

use std::time::Duration;

use axum::{
    Router,
    extract::{OriginalUri, Request},
    http::{
        StatusCode,
        header::{CONTENT_TYPE, RETRY_AFTER},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfig,
    key_extractor::{KeyExtractor, SmartIpKeyExtractor},
};
use tracing::{debug, warn};

use seitech_config::RateLimitConfig;

use crate::state::AppState;
use crate::utils::errors::AppError;

/// How often idle client buckets are dropped.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Address the request is counted against, `unknown` when neither a
/// forwarding header nor the peer address is available.
pub fn client_key(req: &Request) -> String {
    SmartIpKeyExtractor
        .extract(req)
        .map_or_else(|_| "unknown".to_string(), |ip| ip.to_string())
}

/// Wrap every route currently on `router` in a governor built from `config`.
/// `None` (limits disabled or an unbuildable config) leaves it untouched.
fn governed(
    router: Router<AppState>,
    tier: &'static str,
    config: Option<GovernorConfig<SmartIpKeyExtractor, ::governor::middleware::NoOpMiddleware>>,
) -> Router<AppState> {
    let Some(config) = config else {
        return router;
    };

    let limiter = config.limiter().clone();
    if let Ok(runtime) = tokio::runtime::Handle::try_current() {
        runtime.spawn(async move {
            let mut tick = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                tick.tick().await;
                limiter.retain_recent();
                debug!(tier, clients = limiter.len(), "Pruned rate limit buckets");
            }
        });
    }

    router.layer(GovernorLayer::new(config))
}

/// `/api/auth` with the auth quota.
pub fn limit_auth(router: Router<AppState>, config: &RateLimitConfig) -> Router<AppState> {
    let governor = config.enabled.then(|| config.auth_governor_config()).flatten();
    governed(router, "auth", governor)
}

/// Everything else under `/api` with the general quota.
pub fn limit_general(router: Router<AppState>, config: &RateLimitConfig) -> Router<AppState> {
    let governor = config.enabled.then(|| config.general_governor_config()).flatten();
    governed(router, "general", governor)
}

/// Rewrites governor rejections into the JSON error envelope. Layered
/// outside the governors, so a plain-text 429 seen here came from a limiter.
pub async fn rate_limit_envelope(req: Request, next: Next) -> Response {
    let client = client_key(&req);
    // Nesting strips the `/api` prefix from `req.uri()`.
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| req.uri().path().to_string(), |uri| uri.path().to_string());
    let response = next.run(req).await;
    reject_envelope(response, &client, &path)
}

fn reject_envelope(response: Response, client: &str, path: &str) -> Response {
    let from_limiter = response.status() == StatusCode::TOO_MANY_REQUESTS
        && !response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"));
    if !from_limiter {
        return response;
    }

    warn!(client, path, "Rate limit exceeded");
    let retry_after = response.headers().get(RETRY_AFTER).cloned();
    let mut envelope = AppError::too_many_requests().into_response();
    if let Some(value) = retry_after {
        envelope.headers_mut().insert(RETRY_AFTER, value);
    }
    envelope
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_key() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_key(&req), "unknown");

        let req = Request::builder()
            .header("x-real-ip", "10.0.0.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_key(&req), "10.0.0.2");

        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_key(&req), "203.0.113.7");
    }

    #[test]
    fn test_client_key_falls_back_to_peer_address() {
        let mut req = Request::builder().body(Body::empty()).unwrap();
        let peer: std::net::SocketAddr = "198.51.100.20:55012".parse().unwrap();
        req.extensions_mut().insert(axum::extract::ConnectInfo(peer));
        assert_eq!(client_key(&req), "198.51.100.20");
    }

    #[test]
    fn test_limiter_rejection_becomes_envelope() {
        let mut rejected = (StatusCode::TOO_MANY_REQUESTS, "Too Many Requests! Wait for 1s").into_response();
        rejected.headers_mut().insert(RETRY_AFTER, HeaderValue::from_static("1"));

        let response = reject_envelope(rejected, "10.0.0.1", "/api/auth/login");
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[RETRY_AFTER], "1");
        assert!(response.headers()[CONTENT_TYPE].to_str().unwrap().starts_with("application/json"));
    }

    #[test]
    fn test_other_responses_pass_through() {
        let ok = reject_envelope(StatusCode::OK.into_response(), "a", "/api/courses");
        assert_eq!(ok.status(), StatusCode::OK);

        let json_429 = AppError::too_many_requests().into_response();
        let passed = reject_envelope(json_429, "a", "/api/courses");
        assert_eq!(passed.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_disabled_leaves_router_unlimited() {
        let config = RateLimitConfig::disabled();
        assert!(!config.enabled);
        let _ = limit_general(Router::new(), &config);
        let _ = limit_auth(Router::new(), &config);
    }
}
