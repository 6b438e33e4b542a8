use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{get_certificates, verify_certificate};

pub fn init_certificates_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_certificates))
        .route("/verify", post(verify_certificate))
}
