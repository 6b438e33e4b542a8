use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_discussion, create_reply, delete_discussion, get_discussion, get_discussions,
    get_replies, update_discussion, upvote_discussion,
};

pub fn init_discussions_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_discussions).post(create_discussion))
        .route(
            "/{id}",
            get(get_discussion)
                .patch(update_discussion)
                .delete(delete_discussion),
        )
        .route("/{id}/replies", get(get_replies).post(create_reply))
        .route("/{id}/upvote", post(upvote_discussion))
}
