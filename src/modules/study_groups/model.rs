use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use seitech_core::serde::{deserialize_optional_bool, deserialize_optional_i64, deserialize_optional_string};
use seitech_odoo::fields;

use crate::utils::odoo::replace_ids;

pub const GROUP_MODEL: &str = "seitech.study.group";
pub const MEMBER_MODEL: &str = "seitech.study.group.member";

pub const GROUP_FIELDS: &[&str] = &[
    "name",
    "description",
    "owner_id",
    "group_type",
    "privacy",
    "join_policy",
    "state",
    "course_id",
    "learning_path_id",
    "skill_ids",
    "max_members",
    "member_count",
    "member_ids",
    "discussion_count",
    "schedule_ids",
    "next_session_id",
    "progress_percentage",
    "goal",
    "is_featured",
    "image_128",
    "last_activity_date",
    "create_date",
    "write_date",
];

pub const MEMBER_FIELDS: &[&str] = &[
    "user_id",
    "user_name",
    "user_avatar",
    "role",
    "state",
    "contribution_score",
    "discussion_count",
    "reply_count",
    "helpful_count",
    "progress_percentage",
    "join_date",
];

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudyGroupQuery {
    /// Defaults to `active`
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub group_type: Option<String>,
    /// Defaults to public and private groups
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub privacy: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub course_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_featured: Option<bool>,
    /// Only groups the caller belongs to
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub my_groups: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64", alias = "limit")]
    pub per_page: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStudyGroupRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    pub group_type: Option<String>,
    pub privacy: Option<String>,
    pub join_policy: Option<String>,
    pub course_id: Option<i64>,
    pub learning_path_id: Option<i64>,
    pub skill_ids: Option<Vec<i64>>,
    pub max_members: Option<i64>,
    pub goal: Option<String>,
}

impl CreateStudyGroupRequest {
    pub fn values(&self, owner_id: i64) -> serde_json::Map<String, Value> {
        let mut values = serde_json::Map::new();
        values.insert("name".into(), Value::from(self.name.clone()));
        values.insert("owner_id".into(), Value::from(owner_id));
        values.insert("state".into(), Value::from("draft"));
        values.insert(
            "group_type".into(),
            Value::from(self.group_type.as_deref().unwrap_or("general")),
        );
        values.insert("privacy".into(), Value::from(self.privacy.as_deref().unwrap_or("public")));
        values.insert(
            "join_policy".into(),
            Value::from(self.join_policy.as_deref().unwrap_or("open")),
        );

        let optional = [
            ("description", self.description.clone().map(Value::from)),
            ("course_id", self.course_id.map(Value::from)),
            ("learning_path_id", self.learning_path_id.map(Value::from)),
            ("max_members", self.max_members.map(Value::from)),
            ("goal", self.goal.clone().map(Value::from)),
            ("skill_ids", self.skill_ids.as_deref().map(replace_ids)),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                values.insert(key.into(), value);
            }
        }
        values
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GroupState {
    Active,
    Archived,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateStudyGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub privacy: Option<String>,
    pub join_policy: Option<String>,
    pub max_members: Option<i64>,
    pub goal: Option<String>,
    pub state: Option<GroupState>,
}

impl UpdateStudyGroupRequest {
    pub fn values(&self) -> serde_json::Map<String, Value> {
        let fields = [
            ("name", self.name.clone().map(Value::from)),
            ("description", self.description.clone().map(Value::from)),
            ("privacy", self.privacy.clone().map(Value::from)),
            ("join_policy", self.join_policy.clone().map(Value::from)),
            ("max_members", self.max_members.map(Value::from)),
            ("goal", self.goal.clone().map(Value::from)),
        ];
        fields
            .into_iter()
            .filter_map(|(key, value)| Some((key.to_string(), value?)))
            .collect()
    }
}

/// The caller's membership in a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct Membership {
    pub is_member: bool,
    pub member_role: Option<String>,
    pub member_state: Option<String>,
}

impl Membership {
    pub fn from_member(record: Option<&Value>) -> Self {
        match record {
            Some(member) => {
                let state = fields::string(member, "state");
                Self {
                    is_member: state.as_deref() == Some("active"),
                    member_role: fields::string(member, "role"),
                    member_state: state,
                }
            }
            None => Self::default(),
        }
    }

    /// Merge into a group record.
    pub fn apply(&self, group: &mut Value) {
        if let Value::Object(map) = group {
            map.insert("is_member".into(), Value::Bool(self.is_member));
            map.insert("member_role".into(), self.member_role.clone().into());
            map.insert("member_state".into(), self.member_state.clone().into());
        }
    }
}

/// Member record created for a join, derived from the group's policy.
/// `None` means the group only admits invited users.
pub fn join_state(join_policy: &str) -> Option<&'static str> {
    match join_policy {
        "open" => Some("active"),
        "approval" => Some("pending"),
        _ => None,
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudyGroupPage {
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<Value>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MembershipChange {
    pub member_count: i64,
    pub is_member: bool,
    pub member_state: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_values_apply_defaults() {
        let dto: CreateStudyGroupRequest = serde_json::from_value(json!({
            "name": "Site managers",
            "skill_ids": [3, 4],
            "max_members": 12,
        }))
        .unwrap();
        let values = dto.values(7);
        assert_eq!(values["owner_id"], 7);
        assert_eq!(values["state"], "draft");
        assert_eq!(values["group_type"], "general");
        assert_eq!(values["privacy"], "public");
        assert_eq!(values["join_policy"], "open");
        assert_eq!(values["skill_ids"], json!([[6, 0, [3, 4]]]));
        assert!(!values.contains_key("goal"));
    }

    #[test]
    fn test_update_values_only_present_fields() {
        let dto: UpdateStudyGroupRequest =
            serde_json::from_value(json!({ "goal": "Pass NEBOSH", "state": "archived" })).unwrap();
        let values = dto.values();
        assert_eq!(values.len(), 1);
        assert_eq!(dto.state, Some(GroupState::Archived));
    }

    #[test]
    fn test_membership_from_member() {
        let active = json!({ "role": "moderator", "state": "active" });
        let membership = Membership::from_member(Some(&active));
        assert!(membership.is_member);
        assert_eq!(membership.member_role.as_deref(), Some("moderator"));

        let pending = json!({ "role": "member", "state": "pending" });
        assert!(!Membership::from_member(Some(&pending)).is_member);
        assert_eq!(Membership::from_member(None), Membership::default());
    }

    #[test]
    fn test_join_state_by_policy() {
        assert_eq!(join_state("open"), Some("active"));
        assert_eq!(join_state("approval"), Some("pending"));
        assert_eq!(join_state("invitation"), None);
    }
}
