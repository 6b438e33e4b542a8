use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{add_to_cart, get_cart, sync_cart};

pub fn init_cart_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).post(add_to_cart))
        .route("/sync", post(sync_cart))
}
