use anyhow::Context;
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::{debug, info, instrument};

use seitech_core::pagination::PageWindow;
use seitech_core::{ApiResponse, PageMeta};
use seitech_odoo::{Domain, OdooError, SearchRead};

use crate::middleware::auth::AuthUser;
use crate::modules::admin::model::{
    AdminCourse, AdminListQuery, AdminUser, COURSE_FIELDS, CreateUserRequest, USER_FIELDS,
    USER_MODEL,
};
use crate::modules::courses::COURSE_MODEL;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::proxy::{record_fallback, relay};

/// A mutation forwarded to the ERP admin API.
pub enum AdminWrite {
    Create(Value),
    Update(Value),
    Delete,
}

pub struct AdminService;

impl AdminService {
    #[instrument(skip(state))]
    pub async fn list_users(
        state: &AppState,
        query: &AdminListQuery,
        window: &PageWindow,
    ) -> Result<(Vec<AdminUser>, PageMeta), OdooError> {
        let domain = Domain::new()
            .when_some(query.search.as_deref(), |d, s| {
                d.any_of([("name", "ilike", Value::from(s)), ("login", "ilike", Value::from(s))])
            })
            .when_some(query.user_share(), |d, share| d.eq("share", share))
            .when_some(query.user_active(), |d, active| d.eq("active", active));

        let (total, records) = tokio::try_join!(
            state.odoo.search_count(USER_MODEL, domain.clone()),
            state.odoo.search_read(
                USER_MODEL,
                SearchRead::new(domain)
                    .fields(USER_FIELDS)
                    .offset(window.offset)
                    .limit(window.limit)
                    .order("create_date desc"),
            ),
        )?;

        let users = records.iter().map(AdminUser::from_record).collect();
        Ok((users, PageMeta::new(total, window)))
    }

    #[instrument(skip_all, fields(email = %dto.email, role = %dto.role))]
    pub async fn create_user(state: &AppState, dto: &CreateUserRequest) -> Result<AdminUser, AppError> {
        let id = state
            .odoo
            .create(USER_MODEL, dto.values())
            .await
            .context("Failed to create user")?;
        info!(user_id = id, "User created");

        Ok(AdminUser {
            id,
            name: dto.name.clone(),
            email: dto.email.clone(),
            role: dto.role.clone(),
            status: "active".into(),
            enrollments: 0,
            join_date: Some(chrono::Utc::now().format("%Y-%m-%d").to_string()),
            last_login: None,
        })
    }

    #[instrument(skip(state))]
    pub async fn list_courses(
        state: &AppState,
        query: &AdminListQuery,
        window: &PageWindow,
    ) -> Result<(Vec<AdminCourse>, PageMeta), OdooError> {
        let domain = Domain::new()
            .when_some(query.search.as_deref(), |d, s| d.ilike("name", s))
            .when_some(query.category.as_deref(), |d, c| d.ilike("category_id.name", c))
            .when_some(query.instructor_id, |d, id| d.eq("user_id", id))
            .when_some(query.status.as_deref(), |d, status| d.eq("is_published", status == "published"));

        let (total, records) = tokio::try_join!(
            state.odoo.search_count(COURSE_MODEL, domain.clone()),
            state.odoo.search_read(
                COURSE_MODEL,
                SearchRead::new(domain)
                    .fields(COURSE_FIELDS)
                    .offset(window.offset)
                    .limit(window.limit)
                    .order("write_date desc"),
            ),
        )?;

        let courses = records.iter().map(AdminCourse::from_record).collect();
        Ok((courses, PageMeta::new(total, window)))
    }

    /// GET an ERP admin controller under the caller's session. Anything but
    /// a successful JSON answer serves `fallback` instead.
    #[instrument(skip(state, auth_user, fallback))]
    pub async fn read(
        state: &AppState,
        auth_user: &AuthUser,
        path: &str,
        query: &[(String, String)],
        fallback: impl FnOnce() -> ApiResponse<Value>,
    ) -> Response {
        if let Some(sid) = auth_user.odoo_session() {
            match state.odoo.rest_get(path, query, Some(sid)).await {
                Ok(response) if response.is_success() && response.is_json => {
                    return Json(response.body).into_response();
                }
                Ok(response) => debug!(status = response.status, path, "ERP admin API declined read"),
                Err(e) => record_fallback("admin", &e),
            }
        }
        fallback().into_response()
    }

    /// Forward a mutation to the ERP admin API. `demo` answers only in demo
    /// mode or for demo sessions; otherwise the ERP's own answer is relayed.
    #[instrument(skip(state, auth_user, write, demo))]
    pub async fn write(
        state: &AppState,
        auth_user: &AuthUser,
        path: &str,
        write: AdminWrite,
        demo: impl FnOnce() -> ApiResponse<Value>,
    ) -> Result<Response, AppError> {
        let demo_allowed = state.site_config.demo_mode || auth_user.is_demo();
        let Some(sid) = auth_user.odoo_session() else {
            return if demo_allowed {
                Ok(demo().into_response())
            } else {
                Err(AppError::unauthorized("Unauthorized"))
            };
        };

        let result = match &write {
            AdminWrite::Create(body) => state.odoo.rest_post(path, body, Some(sid)).await,
            AdminWrite::Update(body) => state.odoo.rest_put(path, body, Some(sid)).await,
            AdminWrite::Delete => state.odoo.rest_delete(path, Some(sid)).await,
        };

        match result {
            Ok(response) if response.is_success() && response.is_json => Ok(Json(response.body).into_response()),
            Ok(response) if !demo_allowed => Ok(relay(response)),
            Ok(response) => {
                debug!(status = response.status, path, "ERP admin API declined write, answering from demo data");
                Ok(demo().into_response())
            }
            Err(e) if demo_allowed => {
                record_fallback("admin", &e);
                Ok(demo().into_response())
            }
            Err(e) => Err(AppError::upstream(anyhow::Error::new(e).context("Server error"))),
        }
    }
}

/// A page of demo records, shaped like the live list answers.
pub fn demo_page(items: Vec<Value>, window: &PageWindow) -> ApiResponse<Value> {
    let total = items.len() as i64;
    let page: Vec<Value> = items
        .into_iter()
        .skip(window.offset as usize)
        .take(window.limit as usize)
        .collect();
    ApiResponse::ok(Value::Array(page)).with_field("pagination", PageMeta::new(total, window))
}
