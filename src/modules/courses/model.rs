use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use seitech_core::serde::{deserialize_optional_i64, deserialize_optional_string};
use seitech_core::text::slugify;
use seitech_odoo::fields;

pub const COURSE_MODEL: &str = "slide.channel";

pub const SEARCH_FIELDS: &[&str] = &[
    "id",
    "name",
    "description",
    "total_slides",
    "total_time",
    "rating_avg",
    "enroll_count",
    "image_1920",
    "category_id",
];

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourseSearchParams {
    /// Matched against course name and description
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub q: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub category: Option<i64>,
    /// Defaults to 20
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub slug: String,
    pub total_slides: i64,
    /// Hours of content
    pub total_time: f64,
    pub rating: f64,
    pub enroll_count: i64,
    pub image_url: Option<String>,
    pub category: Option<String>,
}

impl CourseSummary {
    pub fn from_record(record: &Value) -> Self {
        let name = fields::string_or_empty(record, "name");
        Self {
            id: fields::i64_field(record, "id"),
            slug: slugify(&name),
            name,
            description: fields::string(record, "description"),
            total_slides: fields::i64_field(record, "total_slides"),
            total_time: fields::f64_field(record, "total_time"),
            rating: fields::f64_field(record, "rating_avg"),
            enroll_count: fields::i64_field(record, "enroll_count"),
            image_url: fields::image_data_url(record, "image_1920"),
            category: fields::many2one_name(record, "category_id"),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseSearchResponse {
    pub courses: Vec<CourseSummary>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_course_summary_absorbs_false() {
        let record = json!({
            "id": 3,
            "name": "Fire Safety Awareness",
            "description": false,
            "total_slides": 12,
            "total_time": 2.5,
            "rating_avg": false,
            "enroll_count": 140,
            "image_1920": false,
            "category_id": [2, "Fire Safety"],
        });
        let course = CourseSummary::from_record(&record);
        assert_eq!(course.slug, "fire-safety-awareness");
        assert_eq!(course.description, None);
        assert_eq!(course.rating, 0.0);
        assert_eq!(course.image_url, None);
        assert_eq!(course.category.as_deref(), Some("Fire Safety"));
    }
}
