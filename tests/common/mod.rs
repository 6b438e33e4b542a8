//! Shared harness: a stub ERP on a random port and helpers for driving the
//! gateway router with `oneshot`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode, header},
    response::{IntoResponse, Response},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt;

use seitech::router::init_router;
use seitech::state::{AppState, test_state};
use seitech_auth::{SessionIdentity, create_session_token};
use seitech_core::permissions::Role;

/// A port nothing listens on; every ERP call fails with a transport error.
pub const UNREACHABLE_ODOO: &str = "http://127.0.0.1:9";

/// One ORM call received by the stub.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub method: String,
    pub args: Value,
    pub kwargs: Value,
}

/// Canned ERP answers. ORM calls are answered by `(model, method)`, REST
/// calls by `(method, path)`; anything unknown gets a neutral default.
#[derive(Clone, Default)]
pub struct OdooStub {
    orm: Arc<Mutex<HashMap<(String, String), Value>>>,
    rest: Arc<Mutex<HashMap<(Method, String), (StatusCode, Value)>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl OdooStub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orm(self, model: &str, method: &str, result: Value) -> Self {
        self.orm
            .lock()
            .unwrap()
            .insert((model.to_string(), method.to_string()), result);
        self
    }

    pub fn rest(self, method: Method, path: &str, status: StatusCode, body: Value) -> Self {
        self.rest
            .lock()
            .unwrap()
            .insert((method, path.to_string()), (status, body));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, model: &str, method: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.model == model && c.method == method)
            .collect()
    }

    fn orm_result(&self, model: &str, method: &str) -> Value {
        if let Some(result) = self.orm.lock().unwrap().get(&(model.to_string(), method.to_string())) {
            return result.clone();
        }
        match method {
            "search_read" | "read" => json!([]),
            "search_count" => json!(0),
            "create" => json!(1),
            _ => json!(true),
        }
    }
}

fn rpc_result(result: Value) -> Json<Value> {
    Json(json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
}

async fn dispatch(State(stub): State<OdooStub>, request: axum::extract::Request) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let body: Bytes = request
        .into_body()
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .unwrap_or_default();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    match path.as_str() {
        "/web/database/selector" => (StatusCode::OK, "ok").into_response(),
        "/web/session/authenticate" => (
            [(header::SET_COOKIE, "session_id=svc-1; Path=/; HttpOnly")],
            rpc_result(json!({ "uid": 2, "partner_id": 3, "name": "Administrator", "username": "admin" })),
        )
            .into_response(),
        "/web/session/destroy" => rpc_result(Value::Null).into_response(),
        "/web/dataset/call_kw" => {
            let params = &body["params"];
            let model = params["model"].as_str().unwrap_or_default().to_string();
            let orm_method = params["method"].as_str().unwrap_or_default().to_string();
            let result = stub.orm_result(&model, &orm_method);
            stub.calls.lock().unwrap().push(RecordedCall {
                model,
                method: orm_method,
                args: params["args"].clone(),
                kwargs: params["kwargs"].clone(),
            });
            rpc_result(result).into_response()
        }
        _ => {
            let canned = stub.rest.lock().unwrap().get(&(method, path)).cloned();
            match canned {
                Some((status, body)) => (status, Json(body)).into_response(),
                None => (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "success": false, "message": "Not found", "data": null })),
                )
                    .into_response(),
            }
        }
    }
}

/// Serve `stub` on an ephemeral port and return its base URL.
pub async fn spawn_odoo(stub: OdooStub) -> String {
    let app = Router::new().fallback(dispatch).with_state(stub);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Gateway state and router pointed at `odoo_url`.
pub fn setup_app(odoo_url: &str) -> (AppState, Router) {
    let state = test_state(odoo_url);
    let app = init_router(state.clone());
    (state, app)
}

/// Gateway backed by a fresh stub.
pub async fn setup_with_stub(stub: OdooStub) -> (AppState, Router) {
    let url = spawn_odoo(stub).await;
    setup_app(&url)
}

/// Signed session token for an ERP user.
pub fn token_for(state: &AppState, uid: i64, partner_id: Option<i64>, role: Role) -> String {
    let identity = SessionIdentity {
        user_id: uid.to_string(),
        partner_id,
        email: format!("user{uid}@seitech.test"),
        name: format!("User {uid}"),
        role,
        avatar: None,
        odoo_session: None,
        demo: false,
    };
    create_session_token(identity, &state.session_config).unwrap()
}

/// Signed session token for a demo account.
pub fn demo_token(state: &AppState, role: Role) -> String {
    let identity = SessionIdentity {
        user_id: format!("demo_{}", role.as_str()),
        partner_id: None,
        email: format!("{}@seitech.co.uk", role.as_str()),
        name: "Demo".into(),
        role,
        avatar: None,
        odoo_session: None,
        demo: true,
    };
    create_session_token(identity, &state.session_config).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    build(Method::GET, uri, token, None)
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    build(Method::DELETE, uri, token, None)
}

pub fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    build(Method::POST, uri, token, Some(body))
}

pub fn patch_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    build(Method::PATCH, uri, token, Some(body))
}

pub fn put_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    build(Method::PUT, uri, token, Some(body))
}

fn build(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send `request` and decode the JSON body (`Null` for non-JSON bodies).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send_raw(app, request).await;
    (status, serde_json::from_str(&body).unwrap_or(Value::Null))
}

/// Send `request` and return status, headers and the body as text.
pub async fn send_raw(
    app: &Router,
    request: Request<Body>,
) -> (StatusCode, HeaderMap, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8_lossy(&bytes).into_owned())
}
