use anyhow::Context;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::instrument;

use seitech_core::ApiResponse;
use seitech_odoo::{Domain, OdooClient, SearchRead};

use crate::modules::courses::fallback::{demo_categories, demo_courses};
use crate::modules::courses::model::{
    COURSE_MODEL, CourseSearchParams, CourseSearchResponse, CourseSummary, SEARCH_FIELDS,
};
use crate::utils::errors::AppError;
use crate::utils::proxy::{record_fallback, relay};
use crate::utils::url::encode_component;

const DEFAULT_SEARCH_LIMIT: i64 = 20;

pub struct CourseService;

impl CourseService {
    /// Catalogue listing; the query string is forwarded untouched.
    #[instrument(skip(odoo))]
    pub async fn list(odoo: &OdooClient, query: &[(String, String)]) -> Response {
        match odoo.rest_get("/api/courses", query, None).await {
            Ok(response) => relay(response),
            Err(e) => {
                record_fallback("courses", &e);
                let courses = demo_courses();
                let total = courses.len();
                ApiResponse::ok(courses)
                    .with_field("total", total)
                    .into_response()
            }
        }
    }

    #[instrument(skip(odoo))]
    pub async fn get(odoo: &OdooClient, id: &str) -> Result<Response, AppError> {
        if !is_course_id(id) {
            return Ok(not_found());
        }
        let response = odoo
            .rest_get(&format!("/api/courses/{id}"), &[], None)
            .await
            .context("Failed to fetch course")?;
        Ok(relay(response))
    }

    /// Resolve a course by numeric id, by the ERP slug endpoint, or by
    /// searching the catalogue for a matching slug.
    #[instrument(skip(odoo))]
    pub async fn get_by_slug(odoo: &OdooClient, slug: &str) -> Result<Response, AppError> {
        let body = if is_course_id(slug) {
            Self::fetch_detail(odoo, slug).await?
        } else if !is_course_slug(slug) {
            return Ok(not_found());
        } else {
            let direct = odoo
                .rest_get(&format!("/api/courses/slug/{}", encode_component(slug)), &[], None)
                .await
                .context("Failed to fetch course")?;

            if direct.is_json {
                direct.body
            } else {
                let search = odoo
                    .rest_get(
                        "/api/courses",
                        &[("search".to_string(), slug.replace('-', " "))],
                        None,
                    )
                    .await
                    .context("Failed to fetch course")?;

                match find_course_id_by_slug(&search.body, slug) {
                    Some(id) => Self::fetch_detail(odoo, &id.to_string()).await?,
                    None => not_found_body(),
                }
            }
        };

        let found = body.get("success").and_then(Value::as_bool).unwrap_or(false);
        let status = if found {
            StatusCode::OK
        } else {
            StatusCode::NOT_FOUND
        };
        Ok((status, Json(body)).into_response())
    }

    async fn fetch_detail(odoo: &OdooClient, id: &str) -> Result<Value, AppError> {
        let response = odoo
            .rest_get(&format!("/api/courses/{id}"), &[], None)
            .await
            .context("Failed to fetch course")?;
        Ok(response.body)
    }

    #[instrument(skip(odoo))]
    pub async fn search(
        odoo: &OdooClient,
        params: CourseSearchParams,
    ) -> Result<CourseSearchResponse, AppError> {
        let domain = search_domain(&params);
        let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).max(1);

        let records = odoo
            .search_read(
                COURSE_MODEL,
                SearchRead::new(domain)
                    .fields(SEARCH_FIELDS)
                    .limit(limit)
                    .order("enroll_count desc, name asc"),
            )
            .await
            .context("Failed to search courses")?;

        let courses: Vec<CourseSummary> = records.iter().map(CourseSummary::from_record).collect();
        Ok(CourseSearchResponse {
            total: courses.len(),
            courses,
        })
    }

    #[instrument(skip(odoo))]
    pub async fn categories(odoo: &OdooClient) -> Response {
        match odoo.rest_get("/api/categories", &[], None).await {
            Ok(response) => relay(response),
            Err(e) => {
                record_fallback("categories", &e);
                ApiResponse::ok(demo_categories()).into_response()
            }
        }
    }
}

fn is_course_id(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Catalogue slugs are ASCII letters, digits, `-` and `_`. Anything else
/// (dots, slashes, encoded separators) cannot name a course.
fn is_course_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn not_found_body() -> Value {
    json!({ "success": false, "message": "Course not found", "data": null })
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(not_found_body())).into_response()
}

pub fn search_domain(params: &CourseSearchParams) -> Domain {
    Domain::new()
        .eq("website_published", true)
        .eq("is_published", true)
        .when_some(params.q.as_deref(), |d, q| {
            d.any_of([
                ("name", "ilike", Value::from(q)),
                ("description", "ilike", Value::from(q)),
            ])
        })
        .when_some(params.category, |d, category| d.eq("category_id", category))
}

/// Id of the course in an ERP listing whose slug matches `slug`, either
/// verbatim or with dashes read as spaces.
pub fn find_course_id_by_slug(listing: &Value, slug: &str) -> Option<i64> {
    if !listing.get("success").and_then(Value::as_bool).unwrap_or(false) {
        return None;
    }
    let spaced = slug.replace('-', " ");
    listing
        .pointer("/data/courses")?
        .as_array()?
        .iter()
        .find(|course| {
            course
                .get("slug")
                .and_then(Value::as_str)
                .is_some_and(|s| s == slug || s == spaced)
        })
        .and_then(|course| course.get("id"))
        .and_then(Value::as_i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_domain_with_query_and_category() {
        let params = CourseSearchParams {
            q: Some("fire".into()),
            category: Some(4),
            limit: None,
        };
        assert_eq!(
            search_domain(&params).into_value(),
            json!([
                ["website_published", "=", true],
                ["is_published", "=", true],
                "|",
                ["name", "ilike", "fire"],
                ["description", "ilike", "fire"],
                ["category_id", "=", 4]
            ])
        );
    }

    #[test]
    fn test_search_domain_defaults() {
        let domain = search_domain(&CourseSearchParams::default()).into_value();
        assert_eq!(domain.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_course_path_segments() {
        assert!(is_course_id("42"));
        assert!(!is_course_id("42abc"));
        assert!(is_course_slug("iosh-managing-safely"));
        assert!(is_course_slug("Fire_Warden-2"));
        assert!(!is_course_slug("../../admin"));
        assert!(!is_course_slug("a/b"));
        assert!(!is_course_slug(""));
    }

    #[test]
    fn test_find_course_id_by_slug() {
        let listing = json!({
            "success": true,
            "data": { "courses": [
                { "id": 1, "slug": "first-aid" },
                { "id": 2, "slug": "fire safety" },
            ]}
        });
        assert_eq!(find_course_id_by_slug(&listing, "first-aid"), Some(1));
        assert_eq!(find_course_id_by_slug(&listing, "fire-safety"), Some(2));
        assert_eq!(find_course_id_by_slug(&listing, "manual-handling"), None);
        assert_eq!(find_course_id_by_slug(&json!({ "success": false }), "first-aid"), None);
    }
}
