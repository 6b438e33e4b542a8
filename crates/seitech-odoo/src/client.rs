//! Reqwest-backed ERP client.
//!
//! Two surfaces are covered:
//!
//! - JSON-RPC at `/web/dataset/call_kw` for ORM calls, authenticated by the
//!   `session_id` cookie of either the service account or an end user;
//! - custom REST controllers under `/api/...`, relayed with their status.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use reqwest::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use seitech_config::OdooConfig;

use crate::domain::Domain;
use crate::error::OdooError;
use crate::session::ServiceSession;

const REACHABILITY_TIMEOUT: Duration = Duration::from_secs(3);
const DEFAULT_SEARCH_LIMIT: i64 = 80;
const DEFAULT_ORDER: &str = "id desc";

/// Session returned by `/web/session/authenticate`.
#[derive(Debug, Clone, PartialEq)]
pub struct OdooSession {
    pub session_id: String,
    pub uid: i64,
    pub partner_id: Option<i64>,
    pub name: String,
    pub username: String,
    pub is_admin: bool,
}

/// Response of a REST controller call.
#[derive(Debug, Clone)]
pub struct RestResponse {
    pub status: u16,
    pub body: Value,
    /// False when the controller answered with something other than JSON
    /// (typically an HTML 404 page).
    pub is_json: bool,
}

impl RestResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `success` flag of the envelope, when the body carries one.
    pub fn envelope_success(&self) -> bool {
        self.is_success()
            && self
                .body
                .get("success")
                .and_then(Value::as_bool)
                .unwrap_or(true)
    }
}

/// Arguments of a `search_read` call.
#[derive(Debug, Clone)]
pub struct SearchRead {
    pub domain: Domain,
    pub fields: Vec<String>,
    pub offset: i64,
    pub limit: i64,
    pub order: String,
}

impl SearchRead {
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            fields: Vec::new(),
            offset: 0,
            limit: DEFAULT_SEARCH_LIMIT,
            order: DEFAULT_ORDER.to_string(),
        }
    }

    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset.max(0);
        self
    }

    /// Zero means no limit.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit.max(0);
        self
    }

    pub fn order(mut self, order: &str) -> Self {
        self.order = order.to_string();
        self
    }

    pub(crate) fn into_kwargs(self) -> Value {
        let limit = if self.limit == 0 {
            Value::Null
        } else {
            json!(self.limit)
        };
        json!({
            "domain": self.domain,
            "fields": self.fields,
            "offset": self.offset,
            "limit": limit,
            "order": self.order,
        })
    }
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<JsonRpcErrorData>,
}

#[derive(Deserialize)]
struct JsonRpcErrorData {
    #[serde(default)]
    name: String,
    #[serde(default)]
    message: String,
}

impl JsonRpcError {
    fn into_error(self) -> OdooError {
        let data = self.data.unwrap_or(JsonRpcErrorData {
            name: String::new(),
            message: String::new(),
        });
        if self.code == 100 || data.name.contains("SessionExpired") {
            return OdooError::SessionExpired;
        }
        let message = if !data.message.is_empty() {
            data.message
        } else if !self.message.is_empty() {
            self.message
        } else {
            "Odoo API Error".to_string()
        };
        OdooError::Rpc {
            code: self.code,
            message,
        }
    }
}

struct Inner {
    http: Client,
    config: OdooConfig,
    service: ServiceSession,
    next_id: AtomicU64,
}

#[derive(Clone)]
pub struct OdooClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for OdooClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OdooClient")
            .field("url", &self.inner.config.url)
            .field("database", &self.inner.config.database)
            .finish_non_exhaustive()
    }
}

impl OdooClient {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: OdooConfig) -> Result<Self, OdooError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OdooError::Transport(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                service: ServiceSession::new(config.session_ttl),
                config,
                next_id: AtomicU64::new(1),
            }),
        })
    }

    pub fn config(&self) -> &OdooConfig {
        &self.inner.config
    }

    pub fn base_url(&self) -> &str {
        &self.inner.config.url
    }

    async fn json_rpc(
        &self,
        path: &str,
        params: Value,
        session: Option<&str>,
    ) -> Result<(Value, Option<String>), OdooError> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let mut request = self
            .inner
            .http
            .post(self.inner.config.endpoint(path))
            .json(&json!({
                "jsonrpc": "2.0",
                "method": "call",
                "params": params,
                "id": id,
            }));
        if let Some(sid) = session {
            request = request.header(COOKIE, format!("session_id={sid}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OdooError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let session_id = extract_session_cookie(response.headers());
        let body: JsonRpcResponse = response.json().await?;

        if let Some(error) = body.error {
            return Err(error.into_error());
        }

        Ok((body.result.unwrap_or(Value::Null), session_id))
    }

    /// Authenticate a user against the configured database.
    ///
    /// # Errors
    ///
    /// [`OdooError::InvalidCredentials`] when the ERP returns `uid: false`.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, login: &str, password: &str) -> Result<OdooSession, OdooError> {
        let (result, cookie) = self
            .json_rpc(
                "/web/session/authenticate",
                json!({
                    "db": self.inner.config.database,
                    "login": login,
                    "password": password,
                }),
                None,
            )
            .await?;

        let Some(uid) = result.get("uid").and_then(Value::as_i64) else {
            return Err(OdooError::InvalidCredentials);
        };

        let session_id = cookie
            .or_else(|| {
                result
                    .get("session_id")
                    .and_then(Value::as_str)
                    .map(String::from)
            })
            .ok_or_else(|| OdooError::Decode("authenticate returned no session id".into()))?;

        Ok(OdooSession {
            session_id,
            uid,
            partner_id: result.get("partner_id").and_then(Value::as_i64),
            name: result
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            username: result
                .get("username")
                .and_then(Value::as_str)
                .unwrap_or(login)
                .to_string(),
            is_admin: result
                .get("is_admin")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }

    pub async fn session_info(&self, session: &str) -> Result<Value, OdooError> {
        self.json_rpc("/web/session/get_session_info", json!({}), Some(session))
            .await
            .map(|(result, _)| result)
    }

    pub async fn logout(&self, session: &str) -> Result<(), OdooError> {
        self.json_rpc("/web/session/destroy", json!({}), Some(session))
            .await
            .map(|_| ())
    }

    /// Session id of the service account, logging in when needed.
    pub async fn service_session_id(&self) -> Result<String, OdooError> {
        let config = &self.inner.config;
        self.inner
            .service
            .get_or_authenticate(|| async {
                self.authenticate(&config.admin_user, &config.admin_password)
                    .await
                    .map(|session| session.session_id)
            })
            .await
    }

    /// Drop the service session `stale` if it is still the cached one.
    pub async fn clear_service_session(&self, stale: &str) {
        self.inner.service.clear(stale).await;
    }

    /// ORM call under an explicit session.
    pub async fn call_kw_as(
        &self,
        session: &str,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> Result<Value, OdooError> {
        let start = Instant::now();
        let result = self
            .json_rpc(
                "/web/dataset/call_kw",
                json!({
                    "model": model,
                    "method": method,
                    "args": args,
                    "kwargs": kwargs,
                }),
                Some(session),
            )
            .await
            .map(|(result, _)| result);

        let status = if result.is_ok() { "success" } else { "error" };
        counter!("odoo_calls_total", "model" => model.to_string(), "method" => method.to_string(), "status" => status).increment(1);
        histogram!("odoo_call_duration_seconds", "model" => model.to_string(), "method" => method.to_string())
            .record(start.elapsed().as_secs_f64());

        if let Err(e) = &result {
            debug!(model, method, error = %e, "Odoo call failed");
        }
        result
    }

    /// ORM call as the service account. An expired session is dropped and
    /// the call retried once with a fresh login.
    pub async fn call_kw(
        &self,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> Result<Value, OdooError> {
        let sid = self.service_session_id().await?;
        match self
            .call_kw_as(&sid, model, method, args.clone(), kwargs.clone())
            .await
        {
            Err(OdooError::SessionExpired) => {
                warn!(model, method, "Service session expired, re-authenticating");
                self.clear_service_session(&sid).await;
                let sid = self.service_session_id().await?;
                self.call_kw_as(&sid, model, method, args, kwargs).await
            }
            other => other,
        }
    }

    pub async fn search_read(&self, model: &str, query: SearchRead) -> Result<Vec<Value>, OdooError> {
        let result = self.call_kw(model, "search_read", json!([]), query.into_kwargs()).await?;
        into_records(result)
    }

    pub async fn read(&self, model: &str, ids: &[i64], fields: &[&str]) -> Result<Vec<Value>, OdooError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let result = self
            .call_kw(model, "read", json!([ids, fields]), json!({}))
            .await?;
        into_records(result)
    }

    /// First record with `id`, if it exists.
    pub async fn read_one(&self, model: &str, id: i64, fields: &[&str]) -> Result<Option<Value>, OdooError> {
        let records = self
            .search_read(
                model,
                SearchRead::new(Domain::new().eq("id", id)).fields(fields).limit(1),
            )
            .await?;
        Ok(records.into_iter().next())
    }

    pub async fn create(&self, model: &str, values: Value) -> Result<i64, OdooError> {
        let result = self.call_kw(model, "create", json!([values]), json!({})).await?;
        match &result {
            Value::Number(n) => n.as_i64(),
            Value::Array(ids) => ids.first().and_then(Value::as_i64),
            _ => None,
        }
        .ok_or_else(|| OdooError::Decode(format!("create returned {result}")))
    }

    pub async fn write(&self, model: &str, ids: &[i64], values: Value) -> Result<bool, OdooError> {
        let result = self
            .call_kw(model, "write", json!([ids, values]), json!({}))
            .await?;
        Ok(result.as_bool().unwrap_or(true))
    }

    pub async fn unlink(&self, model: &str, ids: &[i64]) -> Result<bool, OdooError> {
        if ids.is_empty() {
            return Ok(true);
        }
        let result = self.call_kw(model, "unlink", json!([ids]), json!({})).await?;
        Ok(result.as_bool().unwrap_or(true))
    }

    pub async fn search_count(&self, model: &str, domain: Domain) -> Result<i64, OdooError> {
        let result = self
            .call_kw(model, "search_count", json!([domain]), json!({}))
            .await?;
        result
            .as_i64()
            .ok_or_else(|| OdooError::Decode(format!("search_count returned {result}")))
    }

    /// Call a model method on a recordset, e.g. `action_upvote`.
    pub async fn call_method(
        &self,
        model: &str,
        method: &str,
        ids: &[i64],
        kwargs: Value,
    ) -> Result<Value, OdooError> {
        self.call_kw(model, method, json!([ids]), kwargs).await
    }

    /// Call a REST controller, relaying its status and JSON body.
    #[instrument(skip(self, body, session))]
    pub async fn rest(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
        session: Option<&str>,
    ) -> Result<RestResponse, OdooError> {
        let mut request = self
            .inner
            .http
            .request(method, self.inner.config.endpoint(path))
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(sid) = session {
            request = request.header(COOKIE, format!("session_id={sid}"));
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        if status >= 500 {
            let body = response.text().await.unwrap_or_default();
            return Err(OdooError::Http { status, body });
        }

        let body = if is_json {
            response.json().await?
        } else {
            Value::Null
        };

        Ok(RestResponse {
            status,
            body,
            is_json,
        })
    }

    pub async fn rest_get(
        &self,
        path: &str,
        query: &[(String, String)],
        session: Option<&str>,
    ) -> Result<RestResponse, OdooError> {
        self.rest(Method::GET, path, query, None, session).await
    }

    pub async fn rest_post(
        &self,
        path: &str,
        body: &Value,
        session: Option<&str>,
    ) -> Result<RestResponse, OdooError> {
        self.rest(Method::POST, path, &[], Some(body), session).await
    }

    pub async fn rest_put(
        &self,
        path: &str,
        body: &Value,
        session: Option<&str>,
    ) -> Result<RestResponse, OdooError> {
        self.rest(Method::PUT, path, &[], Some(body), session).await
    }

    pub async fn rest_delete(&self, path: &str, session: Option<&str>) -> Result<RestResponse, OdooError> {
        self.rest(Method::DELETE, path, &[], None, session).await
    }

    /// True when the database selector answers within three seconds.
    pub async fn is_reachable(&self) -> bool {
        match self
            .inner
            .http
            .get(self.inner.config.endpoint("/web/database/selector"))
            .timeout(REACHABILITY_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "Odoo health check failed");
                false
            }
        }
    }
}

fn into_records(result: Value) -> Result<Vec<Value>, OdooError> {
    match result {
        Value::Array(records) => Ok(records),
        Value::Null | Value::Bool(false) => Ok(Vec::new()),
        other => Err(OdooError::Decode(format!("expected a list of records, got {other}"))),
    }
}

fn extract_session_cookie(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookie| {
            cookie
                .split(';')
                .next()
                .and_then(|pair| pair.trim().strip_prefix("session_id="))
                .map(String::from)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    #[test]
    fn test_search_read_kwargs_defaults() {
        let kwargs = SearchRead::new(Domain::new().eq("active", true))
            .fields(&["id", "name"])
            .into_kwargs();
        assert_eq!(kwargs["limit"], 80);
        assert_eq!(kwargs["offset"], 0);
        assert_eq!(kwargs["order"], "id desc");
        assert_eq!(kwargs["fields"], json!(["id", "name"]));
        assert_eq!(kwargs["domain"], json!([["active", "=", true]]));
    }

    #[test]
    fn test_search_read_unlimited() {
        let kwargs = SearchRead::new(Domain::new()).limit(0).into_kwargs();
        assert!(kwargs["limit"].is_null());
    }

    #[test]
    fn test_extract_session_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("frontend_lang=en_GB; Path=/"));
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("session_id=abc123; Expires=Wed; HttpOnly; Path=/"),
        );
        assert_eq!(extract_session_cookie(&headers).as_deref(), Some("abc123"));
        assert_eq!(extract_session_cookie(&HeaderMap::new()), None);
    }

    #[test]
    fn test_rpc_error_prefers_data_message() {
        let err: JsonRpcError = serde_json::from_value(json!({
            "code": 200,
            "message": "Odoo Server Error",
            "data": { "name": "odoo.exceptions.ValidationError", "message": "Name is required" }
        }))
        .unwrap();
        assert_eq!(err.into_error().to_string(), "Name is required");
    }

    #[test]
    fn test_rpc_error_session_expired() {
        let err: JsonRpcError = serde_json::from_value(json!({
            "code": 100,
            "message": "Odoo Session Expired",
            "data": { "name": "odoo.http.SessionExpiredException", "message": "Session expired" }
        }))
        .unwrap();
        assert!(matches!(err.into_error(), OdooError::SessionExpired));
    }

    #[test]
    fn test_rest_response_envelope_success() {
        let ok = RestResponse { status: 200, body: json!({ "success": true }), is_json: true };
        let failed = RestResponse { status: 200, body: json!({ "success": false }), is_json: true };
        let missing = RestResponse { status: 404, body: Value::Null, is_json: false };
        assert!(ok.envelope_success());
        assert!(!failed.envelope_success());
        assert!(!missing.envelope_success());
    }
}
