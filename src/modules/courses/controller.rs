use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use tracing::instrument;

use crate::modules::courses::model::{CourseSearchParams, CourseSearchResponse};
use crate::modules::courses::service::CourseService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::proxy::query_pairs;

#[utoipa::path(
    get,
    path = "/api/courses",
    responses(
        (status = 200, description = "Course catalogue relayed from the ERP, or the demo catalogue")
    ),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn get_courses(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    CourseService::list(&state.odoo, &query_pairs(&params)).await
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = String, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course detail"),
        (status = 404, description = "Course not found")
    ),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    CourseService::get(&state.odoo, &id).await
}

#[utoipa::path(
    get,
    path = "/api/courses/slug/{slug}",
    params(("slug" = String, Path, description = "Course slug or numeric ID")),
    responses(
        (status = 200, description = "Course detail"),
        (status = 404, description = "Course not found")
    ),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn get_course_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    CourseService::get_by_slug(&state.odoo, &slug).await
}

#[utoipa::path(
    get,
    path = "/api/courses/search",
    params(CourseSearchParams),
    responses(
        (status = 200, description = "Published courses matching the query", body = CourseSearchResponse),
        (status = 500, description = "ERP search failed")
    ),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn search_courses(
    State(state): State<AppState>,
    Query(params): Query<CourseSearchParams>,
) -> Result<Json<CourseSearchResponse>, AppError> {
    let results = CourseService::search(&state.odoo, params).await?;
    Ok(Json(results))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "Course categories")),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn get_categories(State(state): State<AppState>) -> Response {
    CourseService::categories(&state.odoo).await
}
