use anyhow::anyhow;
use axum::extract::{Path, Query, State, rejection::QueryRejection};
use tracing::instrument;

use seitech_core::ApiResponse;

use crate::modules::blog::model::{BlogList, BlogPost, BlogQuery};
use crate::modules::blog::service::BlogService;
use crate::state::AppState;
use crate::utils::errors::AppError;

#[utoipa::path(
    get,
    path = "/api/blog",
    params(BlogQuery),
    responses(
        (status = 200, description = "Blog posts with categories and the featured post", body = BlogList),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "Blog"
)]
#[instrument(skip(state))]
pub async fn get_posts(
    State(state): State<AppState>,
    query: Result<Query<BlogQuery>, QueryRejection>,
) -> Result<ApiResponse<BlogList>, AppError> {
    let invalid = || AppError::bad_request(anyhow!("Invalid query parameters"));
    let Query(query) = query.map_err(|_| invalid())?;
    let (page, limit) = query.window().ok_or_else(invalid)?;
    Ok(ApiResponse::ok(BlogService::list(&state.odoo, query, page, limit).await))
}

#[utoipa::path(
    get,
    path = "/api/blog/{slug}",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "The post, with related posts under `relatedPosts`", body = BlogPost),
        (status = 404, description = "Post not found")
    ),
    tag = "Blog"
)]
#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ApiResponse<BlogPost>, AppError> {
    let (post, related) = BlogService::get(&state.odoo, &slug).await?;
    Ok(ApiResponse::ok(post).with_field("relatedPosts", related))
}
