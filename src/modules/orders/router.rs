use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{create_order, get_orders};

pub fn init_orders_router() -> Router<AppState> {
    Router::new().route("/", get(get_orders).post(create_order))
}
