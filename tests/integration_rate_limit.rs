mod common;

use std::net::SocketAddr;

use axum::Router;
use axum::extract::ConnectInfo;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{UNREACHABLE_ODOO, send};
use seitech::router::init_router;
use seitech::state::test_state;
use seitech_config::RateLimitConfig;
use serde_json::json;

/// Router with one auth request and two general requests per client.
fn setup_strict() -> Router {
    let mut state = test_state(UNREACHABLE_ODOO);
    state.rate_limit_config = RateLimitConfig {
        enabled: true,
        general_per_second: 1,
        general_burst_size: 2,
        auth_per_second: 1,
        auth_burst_size: 1,
    };
    init_router(state)
}

fn login_from(ip: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(
            json!({ "email": "student@seitech.co.uk", "password": "wrong-password" }).to_string(),
        ))
        .unwrap()
}

fn get_from(uri: &str, ip: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", ip)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_auth_rate_limit_exceeded() {
    let app = setup_strict();

    let (status, _) = send(&app, login_from("192.168.1.100")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, login_from("192.168.1.100")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Too many requests");
}

#[tokio::test]
async fn test_rate_limit_is_per_client() {
    let app = setup_strict();

    let (status, _) = send(&app, login_from("10.0.0.1")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, login_from("10.0.0.1")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, _) = send(&app, login_from("10.0.0.2")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_general_quota_separate_from_auth() {
    let app = setup_strict();

    let (status, _) = send(&app, login_from("172.16.0.9")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, login_from("172.16.0.9")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // The general quota is untouched by auth requests.
    let (status, _) = send(&app, get_from("/api/robots", "172.16.0.9")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_general_rate_limit_exceeded() {
    let app = setup_strict();

    for _ in 0..2 {
        let (status, _) = send(&app, get_from("/api/robots", "198.51.100.4")).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, get_from("/api/robots", "198.51.100.4")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["message"], "Too many requests");
}

#[tokio::test]
async fn test_disabled_limits_never_reject() {
    let app = init_router(test_state(UNREACHABLE_ODOO));

    for _ in 0..10 {
        let (status, _) = send(&app, login_from("203.0.113.50")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_peer_address_keys_requests_without_proxy_headers() {
    let app = setup_strict();
    let from_peer = |addr: &str| {
        let mut req = Request::builder().uri("/api/robots").body(Body::empty()).unwrap();
        let peer: SocketAddr = addr.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));
        req
    };

    for _ in 0..2 {
        let (status, _) = send(&app, from_peer("192.0.2.10:40001")).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = send(&app, from_peer("192.0.2.10:40002")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["message"], "Too many requests");

    // A different peer has its own bucket.
    let (status, _) = send(&app, from_peer("192.0.2.11:40001")).await;
    assert_eq!(status, StatusCode::OK);
}
