use axum::{
    http::{HeaderValue, StatusCode, header::CACHE_CONTROL},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use seitech_cache::keys;
use seitech_core::ApiResponse;
use seitech_odoo::OdooError;

use crate::metrics::{track_cache_lookup, track_demo_fallback};
use crate::modules::cms::model::envelope_data;
use crate::state::AppState;
use crate::utils::proxy::record_fallback;

/// Result of asking the ERP for a piece of content.
#[derive(Debug)]
pub enum ContentFetch {
    Found(Value),
    /// The ERP answered without a successful envelope.
    Missing,
    Unavailable(OdooError),
}

/// A CMS answer. Anything the ERP did not supply (defaults, failure
/// envelopes) is sent with `Cache-Control: no-store` so neither the CDN nor
/// the ETag layer keeps it.
#[derive(Debug)]
pub struct CmsResponse {
    body: ApiResponse<Value>,
    from_erp: bool,
}

impl CmsResponse {
    fn from_erp(body: ApiResponse<Value>) -> Self {
        Self { body, from_erp: true }
    }

    fn fallback(body: ApiResponse<Value>) -> Self {
        Self { body, from_erp: false }
    }

    pub fn body(&self) -> &ApiResponse<Value> {
        &self.body
    }

    pub fn is_from_erp(&self) -> bool {
        self.from_erp
    }
}

impl IntoResponse for CmsResponse {
    fn into_response(self) -> Response {
        let mut response = self.body.into_response();
        if !self.from_erp {
            response
                .headers_mut()
                .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        }
        response
    }
}

pub struct CmsService;

impl CmsService {
    /// Fetch `path` with `filters`, reading through the Redis cache when one
    /// is configured. Only successful payloads are cached.
    #[instrument(skip(state))]
    pub async fn fetch(
        state: &AppState,
        resource: &'static str,
        path: &str,
        filters: &[(String, String)],
    ) -> ContentFetch {
        let key = keys::cms::resource(&state.cache_config.key_prefix, resource, &(path, filters));

        if let Some(cache) = state.cache() {
            let cached: Option<Value> = cache.get(&key).await;
            track_cache_lookup(resource, cached.is_some());
            if let Some(data) = cached {
                return ContentFetch::Found(data);
            }
        }

        let response = match state.odoo.rest_get(path, filters, None).await {
            Ok(response) => response,
            Err(e) => return ContentFetch::Unavailable(e),
        };

        let data = if response.is_json && response.is_success() {
            envelope_data(&response.body)
        } else {
            None
        };

        match data {
            Some(data) => {
                if let Some(cache) = state.cache() {
                    if let Err(e) = cache.set(&key, &data).await {
                        warn!(error = %e, cache.key = %key, "Failed to cache CMS payload");
                    }
                }
                ContentFetch::Found(data)
            }
            None => {
                debug!(resource, status = response.status, "ERP returned no CMS content");
                ContentFetch::Missing
            }
        }
    }

    /// Content with a built-in default: clients always get `success: true`.
    pub async fn with_defaults(
        state: &AppState,
        resource: &'static str,
        path: &str,
        filters: &[(String, String)],
        defaults: impl FnOnce() -> Value,
    ) -> CmsResponse {
        match Self::fetch(state, resource, path, filters).await {
            ContentFetch::Found(data) => CmsResponse::from_erp(ApiResponse::ok(data)),
            ContentFetch::Missing => {
                track_demo_fallback(resource);
                CmsResponse::fallback(ApiResponse::ok(defaults()))
            }
            ContentFetch::Unavailable(e) => {
                record_fallback(resource, &e);
                CmsResponse::fallback(ApiResponse::ok(defaults()))
            }
        }
    }

    /// Content with no default. `empty` is the payload sent with a failure
    /// envelope, `missing` the status and message when the ERP has nothing.
    pub async fn without_defaults(
        state: &AppState,
        resource: &'static str,
        path: &str,
        empty: Value,
        missing: (StatusCode, &str),
        unavailable: (StatusCode, &str),
    ) -> CmsResponse {
        match Self::fetch(state, resource, path, &[]).await {
            ContentFetch::Found(data) => CmsResponse::from_erp(ApiResponse::ok(data)),
            ContentFetch::Missing => CmsResponse::fallback(ApiResponse::failure(missing.0, empty, missing.1)),
            ContentFetch::Unavailable(e) => {
                warn!(resource, error = %e, "CMS content unavailable");
                CmsResponse::fallback(ApiResponse::failure(unavailable.0, empty, unavailable.1))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallbacks_are_not_stored() {
        let fallback = CmsResponse::fallback(ApiResponse::failure(
            StatusCode::OK,
            Value::Null,
            "Homepage data unavailable",
        ));
        assert!(!fallback.is_from_erp());
        let response = fallback.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CACHE_CONTROL], "no-store");

        let live = CmsResponse::from_erp(ApiResponse::ok(Value::Array(Vec::new())));
        assert!(live.body().data().is_array());
        assert!(live.into_response().headers().get(CACHE_CONTROL).is_none());
    }
}
