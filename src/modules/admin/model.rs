use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use seitech_core::PaginationParams;
use seitech_core::permissions::Role;
use seitech_core::pagination::PageWindow;
use seitech_core::serde::{deserialize_optional_i64, deserialize_optional_string};
use seitech_core::text::slugify;
use seitech_odoo::fields;

pub const USER_MODEL: &str = "res.users";

pub const USER_FIELDS: &[&str] = &["name", "login", "email", "active", "share", "create_date", "login_date"];

pub const COURSE_FIELDS: &[&str] = &[
    "name",
    "description",
    "user_id",
    "category_id",
    "is_published",
    "members_count",
    "rating_avg",
    "rating_count",
    "total_time",
    "total_slides",
    "create_date",
    "write_date",
];

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct AdminListQuery {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Defaults to 20
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub instructor_id: Option<i64>,
}

impl AdminListQuery {
    /// `share` value selecting users listed under `role`: learners are portal
    /// users, every staff role maps to internal users.
    pub fn user_share(&self) -> Option<bool> {
        self.role
            .as_deref()
            .map(|role| matches!(Role::parse(role), Role::Student))
    }

    /// `active` value selecting users listed under `status`.
    pub fn user_active(&self) -> Option<bool> {
        match self.status.as_deref()?.trim().to_ascii_lowercase().as_str() {
            "active" => Some(true),
            "inactive" => Some(false),
            _ => None,
        }
    }

    pub fn window(&self) -> PageWindow {
        PaginationParams::new(self.page, self.limit).window(DEFAULT_LIMIT, MAX_LIMIT)
    }

    /// Non-empty filters as query pairs for the ERP admin controllers.
    pub fn forward_pairs(&self, window: &PageWindow) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), window.page.to_string()),
            ("limit".to_string(), window.limit.to_string()),
        ];
        for (key, value) in [("search", &self.search), ("status", &self.status)] {
            if let Some(value) = value {
                pairs.push((key.to_string(), value.clone()));
            }
        }
        pairs
    }
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub email: String,
    #[serde(default, skip_serializing)]
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub role: String,
}

impl CreateUserRequest {
    pub fn values(&self) -> Value {
        json!({
            "name": self.name,
            "login": self.email,
            "email": self.email,
            "password": self.password,
        })
    }
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub description: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub category: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub level: String,
    pub price: Option<f64>,
    pub duration: Option<String>,
    pub instructor_id: Option<i64>,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateInstructorRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub expertise: Vec<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub enrollments: i64,
    pub join_date: Option<String>,
    pub last_login: Option<String>,
}

/// Date part of an ERP `YYYY-MM-DD HH:MM:SS` value.
fn date_part(record: &Value, field: &str) -> Option<String> {
    fields::string(record, field).map(|s| s.split(' ').next().unwrap_or_default().to_string())
}

/// The ERP only tells portal learners (`share`) apart from internal staff.
/// A record without the flag is treated as a learner.
fn is_portal_user(record: &Value) -> bool {
    record.get("share").and_then(Value::as_bool).unwrap_or(true)
}

impl AdminUser {
    pub fn from_record(record: &Value) -> Self {
        Self {
            id: fields::i64_field(record, "id"),
            name: fields::string_or_empty(record, "name"),
            email: fields::string(record, "email").unwrap_or_else(|| fields::string_or_empty(record, "login")),
            role: if is_portal_user(record) { "student" } else { "instructor" }.into(),
            status: if fields::bool_field(record, "active") { "active" } else { "inactive" }.into(),
            enrollments: 0,
            join_date: date_part(record, "create_date"),
            last_login: date_part(record, "login_date"),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseInstructor {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminCourse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub instructor: CourseInstructor,
    pub category: String,
    pub status: String,
    pub enrollments: i64,
    pub rating: f64,
    pub total_reviews: i64,
    pub duration: String,
    pub lessons: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl AdminCourse {
    pub fn from_record(record: &Value) -> Self {
        let title = fields::string_or_empty(record, "name");
        let hours = fields::f64_field(record, "total_time").ceil() as i64;
        Self {
            id: fields::i64_field(record, "id"),
            slug: slugify(&title),
            title,
            description: fields::string_or_empty(record, "description"),
            instructor: CourseInstructor {
                id: fields::many2one_id(record, "user_id").unwrap_or(0),
                name: fields::many2one_name(record, "user_id").unwrap_or_else(|| "SEI Tech Team".into()),
            },
            category: fields::many2one_name(record, "category_id").unwrap_or_else(|| "General".into()),
            status: if fields::bool_field(record, "is_published") { "published" } else { "draft" }.into(),
            enrollments: fields::i64_field(record, "members_count"),
            rating: fields::f64_field(record, "rating_avg"),
            total_reviews: fields::i64_field(record, "rating_count"),
            duration: format!("{hours} hours"),
            lessons: fields::i64_field(record, "total_slides"),
            created_at: date_part(record, "create_date"),
            updated_at: date_part(record, "write_date"),
        }
    }
}
