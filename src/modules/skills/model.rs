use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::{IntoParams, ToSchema};

use seitech_core::serde::{deserialize_optional_bool, deserialize_optional_i64, deserialize_optional_string};
use seitech_odoo::fields;

pub const SKILL_MODEL: &str = "seitech.skill";
pub const USER_SKILL_MODEL: &str = "seitech.user.skill";
pub const COURSE_SKILL_MODEL: &str = "seitech.course.skill";

pub const SKILL_FIELDS: &[&str] = &[
    "name",
    "category",
    "description",
    "parent_id",
    "child_ids",
    "total_courses",
    "total_learners",
    "average_proficiency",
    "is_trending",
    "trending_score",
    "industry",
];

pub const USER_SKILL_FIELDS: &[&str] = &[
    "skill_id",
    "skill_name",
    "skill_category",
    "current_level",
    "target_level",
    "points",
    "progress_percentage",
    "verified",
    "verified_date",
    "verification_score",
    "acquired_count",
    "first_acquired",
    "last_updated",
    "last_practiced",
    "badge_id",
];

pub const UPDATED_SKILL_FIELDS: &[&str] = &[
    "current_level",
    "target_level",
    "points",
    "progress_percentage",
    "last_practiced",
];

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct SkillQuery {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub category: Option<String>,
    /// Only trending skills, ranked by trend score
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub trending: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub parent_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    /// Defaults to 50
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offset: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserSkillQuery {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub verified: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub level: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSkillActionRequest {
    pub action: Option<String>,
    #[serde(alias = "skill_id")]
    pub skill_id: Option<i64>,
    #[serde(alias = "target_level")]
    pub target_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserSkillAction {
    SetTarget(String),
    Practiced,
    LevelUp,
}

impl UserSkillAction {
    /// Skill id and action from a request; the error is the 400 message.
    pub fn from_request(request: UserSkillActionRequest) -> Result<(i64, Self), &'static str> {
        let (Some(action), Some(skill_id)) = (request.action, request.skill_id) else {
            return Err("action and skill_id are required");
        };
        let action = match action.as_str() {
            "set_target" => Self::SetTarget(
                request
                    .target_level
                    .filter(|level| !level.is_empty())
                    .ok_or("target_level is required")?,
            ),
            "practiced" => Self::Practiced,
            "level_up" => Self::LevelUp,
            _ => return Err("Invalid action"),
        };
        Ok((skill_id, action))
    }
}

/// Courses teaching a skill, each carrying its mapping details.
pub fn courses_with_mappings(courses: Vec<Value>, mappings: &[Value]) -> Vec<Value> {
    let by_course: HashMap<i64, &Value> = mappings
        .iter()
        .filter_map(|m| Some((fields::many2one_id(m, "channel_id")?, m)))
        .collect();

    courses
        .into_iter()
        .map(|mut course| {
            let mapping = course
                .get("id")
                .and_then(Value::as_i64)
                .and_then(|id| by_course.get(&id));
            if let (Value::Object(map), Some(mapping)) = (&mut course, mapping) {
                for key in ["proficiency_level", "is_primary", "skill_points"] {
                    map.insert(key.into(), mapping.get(key).cloned().unwrap_or(Value::Null));
                }
            }
            fields::nullify_false(course)
        })
        .collect()
}

pub fn action_result(action: &UserSkillAction, method_result: Value) -> Value {
    match action {
        UserSkillAction::SetTarget(level) => json!({ "targetLevel": level }),
        UserSkillAction::Practiced => json!({ "practiced": true }),
        UserSkillAction::LevelUp => method_result,
    }
}
