use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_notification, delete_notification, get_notification, get_notifications, mark_all_read,
    mark_notification_read,
};

pub fn init_notifications_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_notifications).post(create_notification))
        .route("/read-all", post(mark_all_read))
        .route("/{id}", get(get_notification).delete(delete_notification))
        .route("/{id}/read", post(mark_notification_read))
}
