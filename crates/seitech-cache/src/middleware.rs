//! HTTP caching headers for public content.
//!
//! CMS routes are browser-cacheable for a few minutes; crawler files
//! (sitemap, robots) are cached by the CDN only. [`etag_middleware`] lets
//! clients revalidate CMS payloads cheaply.
//!
//! ```ignore
//! Router::new()
//!     .route("/", get(get_robots))
//!     .layer(cache_control(CacheControlConfig::shared_only(86_400).revalidating()))
//! ```

use axum::{
    body::Body,
    extract::Request,
    http::{
        HeaderValue, Method, StatusCode,
        header::{CACHE_CONTROL, ETAG, IF_NONE_MATCH},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::BodyExt;
use sha2::{Digest, Sha256};
use tower_http::set_header::SetResponseHeaderLayer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheControlConfig {
    /// `public, max-age=N`: browsers and CDNs.
    Public { max_age: u64 },
    /// `public, s-maxage=N`: CDNs only, optionally serving a stale copy
    /// while they refetch.
    Shared {
        s_maxage: u64,
        stale_while_revalidate: bool,
    },
}

impl CacheControlConfig {
    pub const fn public(max_age: u64) -> Self {
        Self::Public { max_age }
    }

    pub const fn shared_only(s_maxage: u64) -> Self {
        Self::Shared {
            s_maxage,
            stale_while_revalidate: false,
        }
    }

    /// Adds `stale-while-revalidate` to a shared policy.
    pub const fn revalidating(self) -> Self {
        match self {
            Self::Shared { s_maxage, .. } => Self::Shared {
                s_maxage,
                stale_while_revalidate: true,
            },
            public => public,
        }
    }

    pub fn to_header_value(&self) -> HeaderValue {
        let value = match *self {
            Self::Public { max_age } => format!("public, max-age={max_age}"),
            Self::Shared {
                s_maxage,
                stale_while_revalidate: false,
            } => format!("public, s-maxage={s_maxage}"),
            Self::Shared {
                s_maxage,
                stale_while_revalidate: true,
            } => format!("public, s-maxage={s_maxage}, stale-while-revalidate"),
        };
        HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("no-cache"))
    }
}

#[derive(Clone)]
pub struct CacheControlMakeHeader(HeaderValue);

impl<B> tower_http::set_header::MakeHeaderValue<Response<B>> for CacheControlMakeHeader {
    fn make_header_value(&mut self, response: &Response<B>) -> Option<HeaderValue> {
        // Errors and fallbacks must not be pinned in a CDN.
        response.status().is_success().then(|| self.0.clone())
    }
}

/// Sets `Cache-Control` on successful responses unless the handler already
/// chose one.
pub fn cache_control(config: CacheControlConfig) -> SetResponseHeaderLayer<CacheControlMakeHeader> {
    SetResponseHeaderLayer::if_not_present(CACHE_CONTROL, CacheControlMakeHeader(config.to_header_value()))
}

/// Weak validator over the serialized body: `W/"<first 16 bytes of sha256>"`.
fn weak_etag(body: &[u8]) -> String {
    let digest = Sha256::digest(body);
    format!("W/\"{}\"", hex::encode(&digest[..16]))
}

fn if_none_match_hits(header: &str, etag: &str) -> bool {
    let opaque = |tag: &str| tag.trim().trim_start_matches("W/").to_string();
    let ours = opaque(etag);
    header
        .split(',')
        .any(|tag| tag.trim() == "*" || opaque(tag) == ours)
}

fn is_no_store(response: &Response) -> bool {
    response
        .headers()
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.split(',').any(|d| d.trim().eq_ignore_ascii_case("no-store")))
}

/// Tags successful GET responses and answers a matching `If-None-Match`
/// with an empty 304. Responses marked `no-store` are passed through.
pub async fn etag_middleware(request: Request, next: Next) -> Response {
    let conditional = (request.method() == Method::GET)
        .then(|| request.headers().get(IF_NONE_MATCH).cloned())
        .map(|value| value.and_then(|v| v.to_str().ok().map(str::to_string)));

    let response = next.run(request).await;

    let Some(if_none_match) = conditional else {
        return response;
    };
    if !response.status().is_success() || response.headers().contains_key(ETAG) || is_no_store(&response) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => return StatusCode::BAD_GATEWAY.into_response(),
    };

    let etag = weak_etag(&bytes);
    let Ok(etag_value) = HeaderValue::from_str(&etag) else {
        return Response::from_parts(parts, Body::from(bytes));
    };
    parts.headers.insert(ETAG, etag_value);

    if if_none_match.is_some_and(|header| if_none_match_hits(&header, &etag)) {
        parts.status = StatusCode::NOT_MODIFIED;
        parts.headers.remove(axum::http::header::CONTENT_LENGTH);
        return Response::from_parts(parts, Body::empty());
    }

    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, middleware, routing::get};
    use tower::ServiceExt;

    #[test]
    fn test_header_values() {
        assert_eq!(CacheControlConfig::public(300).to_header_value(), "public, max-age=300");
        assert_eq!(CacheControlConfig::shared_only(3600).to_header_value(), "public, s-maxage=3600");
        assert_eq!(
            CacheControlConfig::shared_only(86_400).revalidating().to_header_value(),
            "public, s-maxage=86400, stale-while-revalidate"
        );
        assert_eq!(
            CacheControlConfig::public(60).revalidating(),
            CacheControlConfig::public(60)
        );
    }

    #[test]
    fn test_if_none_match() {
        let etag = weak_etag(b"[]");
        assert!(etag.starts_with("W/\""));
        assert!(if_none_match_hits(&etag, &etag));
        assert!(if_none_match_hits(&etag.trim_start_matches("W/").to_string(), &etag));
        assert!(if_none_match_hits("\"other\", *", &etag));
        assert!(!if_none_match_hits("\"other\"", &etag));
    }

    #[tokio::test]
    async fn test_etag_round_trip() {
        let app = Router::new()
            .route("/faqs", get(|| async { "[]" }))
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .layer(middleware::from_fn(etag_middleware))
            .layer(cache_control(CacheControlConfig::public(300)));

        let first = app
            .clone()
            .oneshot(Request::builder().uri("/faqs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.headers()[CACHE_CONTROL], "public, max-age=300");
        let etag = first.headers()[ETAG].clone();

        let second = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/faqs")
                    .header(IF_NONE_MATCH, etag.clone())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(second.headers()[ETAG], etag);

        let missing = app
            .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(missing.headers().get(ETAG).is_none());
        assert!(missing.headers().get(CACHE_CONTROL).is_none());
    }

    #[tokio::test]
    async fn test_no_store_responses_are_left_alone() {
        let app = Router::new()
            .route(
                "/fallback",
                get(|| async { ([(CACHE_CONTROL, "no-store")], "[]") }),
            )
            .layer(middleware::from_fn(etag_middleware))
            .layer(cache_control(CacheControlConfig::public(300)));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/fallback")
                    .header(IF_NONE_MATCH, "*")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CACHE_CONTROL], "no-store");
        assert!(response.headers().get(ETAG).is_none());
    }
}
