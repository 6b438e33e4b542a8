use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::{Map, Value, json};
use tracing::instrument;

use seitech_core::ApiResponse;
use seitech_core::permissions::Role;
use seitech_core::text::slugify;

use crate::middleware::auth::{
    AuthUser, RequireAnalyticsView, RequireCoursesCreate, RequireCoursesEdit, RequireInstructorsCreate,
    RequireInstructorsEdit, RequireUsersCreate, RequireUsersEdit,
};
use crate::middleware::role::check_any_role;
use crate::modules::admin::fallback::{self, matches_search};
use crate::modules::admin::model::{
    AdminCourse, AdminListQuery, AdminUser, CreateCourseRequest, CreateInstructorRequest,
    CreateUserRequest,
};
use crate::modules::admin::service::{AdminService, AdminWrite, demo_page};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::proxy::record_fallback;
use crate::validator::{LenientJson, checked_body};

const MISSING_FIELDS: &str = "Missing required fields";

/// The submitted fields stamped with the record id and an update time.
fn echo_update(id: i64, body: Value) -> Value {
    let mut record = match body {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    record.insert("id".into(), json!(id));
    record.insert("updatedAt".into(), json!(Utc::now().to_rfc3339()));
    Value::Object(record)
}

fn demo_id() -> i64 {
    Utc::now().timestamp_millis() % 10_000
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

fn deleted(message: &'static str) -> impl FnOnce() -> ApiResponse<Value> {
    move || ApiResponse::ok(Value::Null).with_message(message)
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(AdminListQuery),
    responses(
        (status = 200, description = "Users with pagination"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Admin",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>, Query(query): Query<AdminListQuery>) -> Response {
    let window = query.window();
    match AdminService::list_users(&state, &query, &window).await {
        Ok((users, meta)) => ApiResponse::ok(users).with_field("pagination", meta).into_response(),
        Err(e) => {
            record_fallback("admin", &e);
            let users = fallback::users()
                .into_iter()
                .filter(|u| query.search.as_deref().is_none_or(|s| matches_search(u, &["name", "email"], s)))
                .filter(|u| query.role.as_deref().is_none_or(|r| u["role"] == r))
                .filter(|u| query.status.as_deref().is_none_or(|s| u["status"] == s))
                .collect();
            demo_page(users, &window).into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = AdminUser),
        (status = 400, description = "Missing required fields"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Admin",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    _: RequireUsersCreate,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<ApiResponse<AdminUser>, AppError> {
    let dto = checked_body(body, MISSING_FIELDS)?;
    let user = AdminService::create_user(&state, &dto).await?;
    Ok(ApiResponse::created(user).with_message("User created successfully"))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses((status = 200, description = "User with enrollments and certificates")),
    tag = "Admin",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_user(State(state): State<AppState>, auth_user: AuthUser, Path(id): Path<i64>) -> Response {
    AdminService::read(&state, &auth_user, &format!("/api/admin/users/{id}"), &[], || {
        ApiResponse::ok(fallback::user(id))
    })
    .await
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses((status = 200, description = "User updated successfully")),
    tag = "Admin",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user, body))]
pub async fn update_user(
    State(state): State<AppState>,
    RequireUsersEdit(auth_user): RequireUsersEdit,
    Path(id): Path<i64>,
    LenientJson(body): LenientJson<Value>,
) -> Result<Response, AppError> {
    let path = format!("/api/admin/users/{id}");
    let demo = echo_update(id, body.clone());
    AdminService::write(&state, &auth_user, &path, AdminWrite::Update(body), || {
        ApiResponse::ok(demo).with_message("User updated successfully")
    })
    .await
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted successfully"),
        (status = 403, description = "Only admins can delete users")
    ),
    tag = "Admin",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    check_any_role(&auth_user, &[Role::Admin])?;
    let path = format!("/api/admin/users/{id}");
    AdminService::write(&state, &auth_user, &path, AdminWrite::Delete, deleted("User deleted successfully")).await
}

#[utoipa::path(
    get,
    path = "/api/admin/courses",
    params(AdminListQuery),
    responses((status = 200, description = "Courses with pagination")),
    tag = "Admin",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_courses(State(state): State<AppState>, Query(query): Query<AdminListQuery>) -> Response {
    let window = query.window();
    match AdminService::list_courses(&state, &query, &window).await {
        Ok((courses, meta)) => ApiResponse::ok(courses).with_field("pagination", meta).into_response(),
        Err(e) => {
            record_fallback("admin", &e);
            let courses = fallback::courses()
                .into_iter()
                .filter(|c| query.search.as_deref().is_none_or(|s| matches_search(c, &["title"], s)))
                .filter(|c| query.status.as_deref().is_none_or(|s| c["status"] == s))
                .collect();
            demo_page(courses, &window).into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 200, description = "Course created successfully", body = AdminCourse),
        (status = 400, description = "Missing required fields")
    ),
    tag = "Admin",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip_all)]
pub async fn create_course(
    State(state): State<AppState>,
    RequireCoursesCreate(auth_user): RequireCoursesCreate,
    body: Result<Json<CreateCourseRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let dto = checked_body(body, MISSING_FIELDS)?;
    let forward = json!(dto);
    let demo = json!({
        "id": demo_id(),
        "slug": slugify(&dto.title),
        "title": dto.title,
        "description": dto.description,
        "category": dto.category,
        "level": dto.level,
        "price": dto.price.unwrap_or(0.0),
        "duration": dto.duration.as_deref().unwrap_or("TBD"),
        "instructor": {
            "id": dto.instructor_id.map_or_else(|| auth_user.0.sub.clone(), |id| id.to_string()),
            "name": auth_user.0.name,
        },
        "status": "draft",
        "enrollments": 0,
        "rating": 0,
        "totalReviews": 0,
        "lessons": 0,
        "createdAt": today(),
        "updatedAt": today(),
    });
    AdminService::write(&state, &auth_user, "/api/admin/courses", AdminWrite::Create(forward), || {
        ApiResponse::ok(demo).with_message("Course created successfully")
    })
    .await
}

#[utoipa::path(
    get,
    path = "/api/admin/courses/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    responses((status = 200, description = "Course with modules and stats")),
    tag = "Admin",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_course(State(state): State<AppState>, auth_user: AuthUser, Path(id): Path<i64>) -> Response {
    AdminService::read(&state, &auth_user, &format!("/api/admin/courses/{id}"), &[], || {
        ApiResponse::ok(fallback::course(id))
    })
    .await
}

#[utoipa::path(
    put,
    path = "/api/admin/courses/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    responses((status = 200, description = "Course updated successfully")),
    tag = "Admin",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user, body))]
pub async fn update_course(
    State(state): State<AppState>,
    RequireCoursesEdit(auth_user): RequireCoursesEdit,
    Path(id): Path<i64>,
    LenientJson(body): LenientJson<Value>,
) -> Result<Response, AppError> {
    let path = format!("/api/admin/courses/{id}");
    let demo = echo_update(id, body.clone());
    AdminService::write(&state, &auth_user, &path, AdminWrite::Update(body), || {
        ApiResponse::ok(demo).with_message("Course updated successfully")
    })
    .await
}

#[utoipa::path(
    delete,
    path = "/api/admin/courses/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course deleted successfully"),
        (status = 403, description = "Only admins can delete courses")
    ),
    tag = "Admin",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_course(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    check_any_role(&auth_user, &[Role::Admin])?;
    let path = format!("/api/admin/courses/{id}");
    AdminService::write(&state, &auth_user, &path, AdminWrite::Delete, deleted("Course deleted successfully")).await
}

#[utoipa::path(
    get,
    path = "/api/admin/instructors",
    params(AdminListQuery),
    responses((status = 200, description = "Instructors with pagination")),
    tag = "Admin",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn list_instructors(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<AdminListQuery>,
) -> Response {
    let window = query.window();
    let pairs = query.forward_pairs(&window);
    AdminService::read(&state, &auth_user, "/api/admin/instructors", &pairs, || {
        let instructors = fallback::instructors()
            .into_iter()
            .filter(|i| {
                query
                    .search
                    .as_deref()
                    .is_none_or(|s| matches_search(i, &["name", "email", "expertise"], s))
            })
            .filter(|i| query.status.as_deref().is_none_or(|s| i["status"] == s))
            .collect();
        demo_page(instructors, &window)
    })
    .await
}

#[utoipa::path(
    post,
    path = "/api/admin/instructors",
    request_body = CreateInstructorRequest,
    responses(
        (status = 200, description = "Instructor created successfully"),
        (status = 400, description = "Missing required fields")
    ),
    tag = "Admin",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip_all)]
pub async fn create_instructor(
    State(state): State<AppState>,
    RequireInstructorsCreate(auth_user): RequireInstructorsCreate,
    body: Result<Json<CreateInstructorRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let dto = checked_body(body, MISSING_FIELDS)?;
    let forward = json!(dto);
    let demo = json!({
        "id": demo_id(),
        "name": dto.name,
        "email": dto.email,
        "expertise": dto.expertise,
        "bio": dto.bio.as_deref().unwrap_or_default(),
        "status": "active",
        "courses": 0,
        "students": 0,
        "rating": 0,
        "totalReviews": 0,
        "joinDate": today(),
        "lastActive": Utc::now().to_rfc3339(),
    });
    AdminService::write(&state, &auth_user, "/api/admin/instructors", AdminWrite::Create(forward), || {
        ApiResponse::ok(demo).with_message("Instructor created successfully")
    })
    .await
}

#[utoipa::path(
    get,
    path = "/api/admin/instructors/{id}",
    params(("id" = i64, Path, description = "Instructor ID")),
    responses((status = 200, description = "Instructor with courses")),
    tag = "Admin",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_instructor(State(state): State<AppState>, auth_user: AuthUser, Path(id): Path<i64>) -> Response {
    AdminService::read(&state, &auth_user, &format!("/api/admin/instructors/{id}"), &[], || {
        ApiResponse::ok(fallback::instructor(id))
    })
    .await
}

#[utoipa::path(
    put,
    path = "/api/admin/instructors/{id}",
    params(("id" = i64, Path, description = "Instructor ID")),
    responses((status = 200, description = "Instructor updated successfully")),
    tag = "Admin",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user, body))]
pub async fn update_instructor(
    State(state): State<AppState>,
    RequireInstructorsEdit(auth_user): RequireInstructorsEdit,
    Path(id): Path<i64>,
    LenientJson(body): LenientJson<Value>,
) -> Result<Response, AppError> {
    let path = format!("/api/admin/instructors/{id}");
    let demo = echo_update(id, body.clone());
    AdminService::write(&state, &auth_user, &path, AdminWrite::Update(body), || {
        ApiResponse::ok(demo).with_message("Instructor updated successfully")
    })
    .await
}

#[utoipa::path(
    delete,
    path = "/api/admin/instructors/{id}",
    params(("id" = i64, Path, description = "Instructor ID")),
    responses(
        (status = 200, description = "Instructor deleted successfully"),
        (status = 403, description = "Only admins can delete instructors")
    ),
    tag = "Admin",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_instructor(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    check_any_role(&auth_user, &[Role::Admin])?;
    let path = format!("/api/admin/instructors/{id}");
    AdminService::write(&state, &auth_user, &path, AdminWrite::Delete, deleted("Instructor deleted successfully"))
        .await
}

#[utoipa::path(
    get,
    path = "/api/admin/analytics/overview",
    responses((status = 200, description = "Totals, recent activity, monthly stats and leaders")),
    tag = "Admin",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_analytics_overview(
    State(state): State<AppState>,
    RequireAnalyticsView(auth_user): RequireAnalyticsView,
) -> Response {
    AdminService::read(&state, &auth_user, "/api/admin/analytics/overview", &[], || {
        ApiResponse::ok(fallback::analytics_overview())
    })
    .await
}
