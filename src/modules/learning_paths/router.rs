use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_learning_path, delete_learning_path, get_learning_path, get_learning_paths,
    run_learning_path_action, update_learning_path,
};

pub fn init_learning_paths_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_learning_paths).post(create_learning_path))
        .route(
            "/{id}",
            get(get_learning_path)
                .patch(update_learning_path)
                .delete(delete_learning_path),
        )
        .route("/{id}/actions", post(run_learning_path_action))
}
