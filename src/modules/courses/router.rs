use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    get_categories, get_course, get_course_by_slug, get_courses, search_courses,
};

pub fn init_courses_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_courses))
        .route("/search", get(search_courses))
        .route("/slug/{slug}", get(get_course_by_slug))
        .route("/{id}", get(get_course))
}

pub fn init_categories_router() -> Router<AppState> {
    Router::new().route("/", get(get_categories))
}
