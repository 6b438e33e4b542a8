use axum::{Router, middleware, routing::get};

use crate::middleware::role::{require_admin_or_manager, require_course_staff};
use crate::state::AppState;

use super::controller::{
    create_course, create_instructor, create_user, delete_course, delete_instructor, delete_user,
    get_analytics_overview, get_course, get_instructor, get_user, list_courses, list_instructors,
    list_users, update_course, update_instructor, update_user,
};

/// People and analytics are for admins and managers; the course catalogue is
/// also open to instructors. Deletes are admin-only.
pub fn init_admin_router(state: AppState) -> Router<AppState> {
    let people = Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/instructors", get(list_instructors).post(create_instructor))
        .route(
            "/instructors/{id}",
            get(get_instructor).put(update_instructor).delete(delete_instructor),
        )
        .route("/analytics/overview", get(get_analytics_overview))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin_or_manager));

    let courses = Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{id}", get(get_course).put(update_course).delete(delete_course))
        .route_layer(middleware::from_fn_with_state(state, require_course_staff));

    people.merge(courses)
}
