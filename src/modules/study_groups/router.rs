use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_study_group, delete_study_group, get_study_group, get_study_groups, join_study_group,
    leave_study_group, update_study_group,
};

pub fn init_study_groups_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_study_groups).post(create_study_group))
        .route(
            "/{id}",
            get(get_study_group)
                .patch(update_study_group)
                .delete(delete_study_group),
        )
        .route("/{id}/join", post(join_study_group))
        .route("/{id}/leave", post(leave_study_group))
}
