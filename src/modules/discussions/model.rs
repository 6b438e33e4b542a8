use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use seitech_core::serde::{deserialize_optional_bool, deserialize_optional_i64, deserialize_optional_string};
use seitech_odoo::fields;

use crate::utils::odoo::contains_id;

pub const DISCUSSION_MODEL: &str = "seitech.discussion";
pub const REPLY_MODEL: &str = "seitech.discussion.reply";

pub const DISCUSSION_FIELDS: &[&str] = &[
    "name",
    "content",
    "author_id",
    "author_name",
    "author_avatar",
    "category",
    "state",
    "course_id",
    "slide_id",
    "study_group_id",
    "tag_ids",
    "skill_ids",
    "reply_count",
    "upvote_count",
    "view_count",
    "has_best_answer",
    "best_answer_id",
    "is_pinned",
    "is_locked",
    "is_featured",
    "upvote_ids",
    "reply_ids",
    "published_date",
    "last_activity_date",
    "resolved_date",
    "create_date",
    "write_date",
];

pub const REPLY_FIELDS: &[&str] = &[
    "discussion_id",
    "parent_id",
    "child_ids",
    "content",
    "author_id",
    "author_name",
    "author_avatar",
    "state",
    "thread_level",
    "upvote_count",
    "upvote_ids",
    "is_best_answer",
    "is_by_instructor",
    "is_by_author",
    "edited_date",
    "create_date",
    "write_date",
];

/// States listed when no explicit state filter is given.
pub const VISIBLE_STATES: &[&str] = &["published", "resolved", "closed"];

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DiscussionQuery {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub course_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub study_group_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub author_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_pinned: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_featured: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub has_best_answer: Option<bool>,
    /// Matches title or body
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Items per page (default 20)
    #[serde(default, deserialize_with = "deserialize_optional_i64", alias = "per_page")]
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDiscussionRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub category: String,
    pub course_id: Option<i64>,
    pub slide_id: Option<i64>,
    pub study_group_id: Option<i64>,
    pub tag_ids: Option<Vec<i64>>,
    pub skill_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DiscussionAction {
    Publish,
    Resolve,
    Close,
    Flag,
}

impl DiscussionAction {
    pub fn method(self) -> &'static str {
        match self {
            Self::Publish => "action_publish",
            Self::Resolve => "action_resolve",
            Self::Close => "action_close",
            Self::Flag => "action_flag",
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateDiscussionRequest {
    pub name: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub is_pinned: Option<bool>,
    pub is_locked: Option<bool>,
    pub is_featured: Option<bool>,
    pub tag_ids: Option<Vec<i64>>,
    pub skill_ids: Option<Vec<i64>>,
    pub action: Option<DiscussionAction>,
}

impl UpdateDiscussionRequest {
    /// Plain field updates, without the workflow action.
    pub fn values(&self) -> serde_json::Map<String, Value> {
        let mut values = serde_json::Map::new();
        let mut put = |key: &str, value: Option<Value>| {
            if let Some(value) = value {
                values.insert(key.to_string(), value);
            }
        };
        put("name", self.name.clone().map(Value::from));
        put("content", self.content.clone().map(Value::from));
        put("category", self.category.clone().map(Value::from));
        put("is_pinned", self.is_pinned.map(Value::from));
        put("is_locked", self.is_locked.map(Value::from));
        put("is_featured", self.is_featured.map(Value::from));
        put("tag_ids", self.tag_ids.as_deref().map(crate::utils::odoo::replace_ids));
        put("skill_ids", self.skill_ids.as_deref().map(crate::utils::odoo::replace_ids));
        values
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReplyRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub content: String,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpvoteResult {
    pub upvote_count: i64,
    pub has_upvoted: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiscussionPage {
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<Value>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

/// ERP record ready for clients: `false` placeholders become `null` and
/// `has_upvoted` reflects the viewer.
pub fn present(record: Value, viewer: Option<i64>) -> Value {
    let has_upvoted = contains_id(&record, "upvote_ids", viewer);
    let mut record = fields::nullify_false(record);
    if let Value::Object(map) = &mut record {
        map.insert("has_upvoted".into(), Value::Bool(has_upvoted));
    }
    record
}

/// Nest replies under their parents. Replies whose parent is not in the
/// list are treated as roots; sibling order follows the input order.
pub fn thread_replies(replies: Vec<Value>) -> Vec<Value> {
    let ids: HashSet<i64> = replies
        .iter()
        .filter_map(|r| r.get("id").and_then(Value::as_i64))
        .collect();

    let mut children: HashMap<i64, Vec<Value>> = HashMap::new();
    let mut roots = Vec::new();
    for reply in replies {
        match fields::many2one_id(&reply, "parent_id").filter(|parent| ids.contains(parent)) {
            Some(parent) => children.entry(parent).or_default().push(reply),
            None => roots.push(reply),
        }
    }

    roots
        .into_iter()
        .map(|root| attach_children(root, &mut children))
        .collect()
}

fn attach_children(mut reply: Value, children: &mut HashMap<i64, Vec<Value>>) -> Value {
    let nested: Vec<Value> = reply
        .get("id")
        .and_then(Value::as_i64)
        .and_then(|id| children.remove(&id))
        .unwrap_or_default()
        .into_iter()
        .map(|child| attach_children(child, children))
        .collect();

    if let Value::Object(map) = &mut reply {
        map.insert("replies".into(), json!(nested));
    }
    reply
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(id: i64, parent: Option<i64>) -> Value {
        json!({ "id": id, "parent_id": parent.map_or(json!(false), |p| json!([p, "r"])), "content": format!("r{id}") })
    }

    #[test]
    fn test_thread_replies_nests_children() {
        let tree = thread_replies(vec![
            reply(1, None),
            reply(2, Some(1)),
            reply(3, Some(2)),
            reply(4, None),
            reply(5, Some(1)),
        ]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0]["id"], 1);
        let first_children = tree[0]["replies"].as_array().unwrap();
        assert_eq!(first_children.len(), 2);
        assert_eq!(first_children[0]["id"], 2);
        assert_eq!(first_children[1]["id"], 5);
        assert_eq!(first_children[0]["replies"][0]["id"], 3);
        assert!(tree[1]["replies"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_orphaned_reply_becomes_root() {
        let tree = thread_replies(vec![reply(7, Some(99)), reply(8, Some(7))]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0]["id"], 7);
        assert_eq!(tree[0]["replies"][0]["id"], 8);
    }

    #[test]
    fn test_present_sets_has_upvoted() {
        let record = json!({ "id": 1, "upvote_ids": [4, 5], "resolved_date": false });
        let shown = present(record.clone(), Some(5));
        assert_eq!(shown["has_upvoted"], true);
        assert_eq!(shown["resolved_date"], Value::Null);
        assert_eq!(present(record, None)["has_upvoted"], false);
    }

    #[test]
    fn test_update_values_skip_absent_fields() {
        let update = UpdateDiscussionRequest {
            name: Some("Fire doors".into()),
            is_pinned: Some(false),
            tag_ids: Some(vec![2]),
            action: Some(DiscussionAction::Resolve),
            ..Default::default()
        };
        let values = update.values();
        assert_eq!(values.len(), 3);
        assert_eq!(values["is_pinned"], false);
        assert_eq!(values["tag_ids"], json!([[6, 0, [2]]]));
        assert_eq!(update.action.map(DiscussionAction::method), Some("action_resolve"));
    }

    #[test]
    fn test_action_deserializes_lowercase() {
        let update: UpdateDiscussionRequest = serde_json::from_value(json!({ "action": "flag" })).unwrap();
        assert_eq!(update.action, Some(DiscussionAction::Flag));
        assert!(serde_json::from_value::<UpdateDiscussionRequest>(json!({ "action": "archive" })).is_err());
    }
}
