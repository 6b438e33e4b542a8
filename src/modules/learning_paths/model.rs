use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use seitech_core::serde::{deserialize_optional_bool, deserialize_optional_i64, deserialize_optional_string};

use crate::utils::odoo::replace_ids;

pub const PATH_MODEL: &str = "seitech.learning.path";
pub const NODE_MODEL: &str = "seitech.learning.path.node";

pub const PATH_FIELDS: &[&str] = &[
    "name",
    "user_id",
    "path_type",
    "state",
    "goal",
    "progress_percentage",
    "node_count",
    "completed_count",
    "estimated_hours",
    "deadline",
    "start_date",
    "completion_date",
    "last_activity",
    "skill_ids",
];

pub const DETAIL_FIELDS: &[&str] = &[
    "name",
    "user_id",
    "path_type",
    "state",
    "goal",
    "progress_percentage",
    "node_count",
    "completed_count",
    "estimated_hours",
    "deadline",
    "start_date",
    "completion_date",
    "last_activity",
    "skill_ids",
    "node_ids",
    "is_template",
    "template_id",
];

pub const NODE_FIELDS: &[&str] = &[
    "sequence",
    "channel_id",
    "is_required",
    "state",
    "progress_percentage",
    "deadline",
    "completion_date",
    "enrollment_id",
    "prerequisite_ids",
];

pub const PROGRESS_FIELDS: &[&str] = &["name", "state", "progress_percentage", "node_count", "completed_count"];

/// Only these states may be deleted.
pub const DELETABLE_STATES: &[&str] = &["draft", "cancelled"];

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LearningPathQuery {
    /// draft, active, completed or cancelled
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub state: Option<String>,
    /// custom, adaptive or structured
    #[serde(default, rename = "type", deserialize_with = "deserialize_optional_string")]
    pub path_type: Option<String>,
    /// Only templates
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub templates: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLearningPathRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub name: String,
    pub goal: Option<String>,
    pub path_type: Option<String>,
    #[serde(alias = "skill_ids")]
    pub skill_ids: Option<Vec<i64>>,
    #[serde(alias = "template_id")]
    pub template_id: Option<i64>,
    pub deadline: Option<String>,
}

impl CreateLearningPathRequest {
    pub fn values(&self, user_id: i64) -> Value {
        let mut values = json!({
            "name": self.name,
            "user_id": user_id,
            "path_type": self.path_type.as_deref().unwrap_or("custom"),
            "goal": self.goal.as_deref().unwrap_or_default(),
            "state": "draft",
        });
        if let Some(skills) = &self.skill_ids {
            values["skill_ids"] = replace_ids(skills);
        }
        if let Some(template_id) = self.template_id {
            values["template_id"] = json!(template_id);
        }
        if let Some(deadline) = self.deadline.as_deref().filter(|d| !d.is_empty()) {
            values["deadline"] = json!(deadline);
        }
        values
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLearningPathRequest {
    pub name: Option<String>,
    pub goal: Option<String>,
    pub deadline: Option<String>,
    #[serde(alias = "skill_ids")]
    pub skill_ids: Option<Vec<i64>>,
}

impl UpdateLearningPathRequest {
    pub fn values(&self) -> serde_json::Map<String, Value> {
        [
            ("name", self.name.clone().map(Value::from)),
            ("goal", self.goal.clone().map(Value::from)),
            ("deadline", self.deadline.clone().map(Value::from)),
            ("skill_ids", self.skill_ids.as_deref().map(replace_ids)),
        ]
        .into_iter()
        .filter_map(|(key, value)| Some((key.to_string(), value?)))
        .collect()
    }
}

/// Options for a path action, accepted at the top level or under `params`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionParams {
    #[serde(alias = "course_id")]
    pub course_id: Option<i64>,
    #[serde(alias = "node_id")]
    pub node_id: Option<i64>,
    #[serde(alias = "is_required")]
    pub is_required: Option<bool>,
    pub sequence: Option<i64>,
    pub algorithm: Option<String>,
    #[serde(alias = "max_courses")]
    pub max_courses: Option<i64>,
}

impl ActionParams {
    fn or(self, fallback: Self) -> Self {
        Self {
            course_id: self.course_id.or(fallback.course_id),
            node_id: self.node_id.or(fallback.node_id),
            is_required: self.is_required.or(fallback.is_required),
            sequence: self.sequence.or(fallback.sequence),
            algorithm: self.algorithm.or(fallback.algorithm),
            max_courses: self.max_courses.or(fallback.max_courses),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PathActionRequest {
    pub action: Option<String>,
    pub params: Option<ActionParams>,
    #[serde(flatten)]
    pub inline: ActionParams,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathAction {
    Activate,
    Complete,
    Cancel,
    Reset,
    GenerateAi { algorithm: String, max_courses: i64 },
    Recalculate,
    Next,
    AddCourse { course_id: i64, is_required: bool, sequence: i64 },
    /// Removes one node, or every node for the course.
    RemoveCourse { node_id: Option<i64>, course_id: Option<i64> },
}

impl PathAction {
    /// The action a request asks for; the error is the 400 message.
    pub fn from_request(request: PathActionRequest) -> Result<Self, &'static str> {
        let action = request.action.filter(|a| !a.is_empty()).ok_or("Action is required")?;
        let params = request.params.unwrap_or_default().or(request.inline);

        Ok(match action.as_str() {
            "activate" => Self::Activate,
            "complete" => Self::Complete,
            "cancel" => Self::Cancel,
            "reset" => Self::Reset,
            "generate_ai" => Self::GenerateAi {
                algorithm: params.algorithm.unwrap_or_else(|| "hybrid".into()),
                max_courses: params.max_courses.unwrap_or(10),
            },
            "recalculate" => Self::Recalculate,
            "next" | "next_action" => Self::Next,
            "add_course" => Self::AddCourse {
                course_id: params.course_id.ok_or("course_id is required")?,
                is_required: params.is_required.unwrap_or(true),
                sequence: params.sequence.unwrap_or(0),
            },
            "remove_course" => {
                if params.node_id.is_none() && params.course_id.is_none() {
                    return Err("course_id is required");
                }
                Self::RemoveCourse {
                    node_id: params.node_id,
                    course_id: params.course_id,
                }
            }
            _ => return Err("Invalid action"),
        })
    }

    /// Model method for actions that map to one, with its kwargs.
    pub fn method(&self) -> Option<(&'static str, Value)> {
        let call = match self {
            Self::Activate => ("action_activate", json!({})),
            Self::Complete => ("action_complete", json!({})),
            Self::Cancel => ("action_cancel", json!({})),
            Self::Reset => ("action_reset_to_draft", json!({})),
            Self::GenerateAi { algorithm, max_courses } => (
                "generate_ai_path",
                json!({ "algorithm": algorithm, "max_courses": max_courses }),
            ),
            Self::Recalculate => ("recalculate_path", json!({})),
            Self::Next => ("get_next_action", json!({})),
            Self::AddCourse { .. } | Self::RemoveCourse { .. } => return None,
        };
        Some(call)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PathActionResult {
    #[schema(value_type = Object)]
    pub path: Value,
    #[schema(value_type = Object)]
    pub result: Value,
}
