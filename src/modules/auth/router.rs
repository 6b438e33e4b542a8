use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{forgot_password, login, logout, me, register, session};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/session", get(session))
        .route("/register", post(register))
        .route("/forgot-password", post(forgot_password))
}
