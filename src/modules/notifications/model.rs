use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use seitech_core::pagination::total_pages;
use seitech_core::serde::{deserialize_optional_bool, deserialize_optional_i64};
use seitech_odoo::fields;

pub const NOTIFICATION_MODEL: &str = "seitech.notification";

pub const NOTIFICATION_FIELDS: &[&str] = &[
    "id",
    "notification_type",
    "title",
    "message",
    "link",
    "read",
    "create_date",
    "data",
    "related_discussion_id",
    "related_study_group_id",
    "related_user_id",
];

/// Related-record fields in lookup order, with the model each points to.
const RELATED_FIELDS: &[(&str, &str)] = &[
    ("related_discussion_id", "seitech.discussion"),
    ("related_study_group_id", "seitech.study.group"),
    ("related_user_id", "res.users"),
];

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationQuery {
    /// Page number (1-indexed)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Items per page (default 20)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub per_page: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub unread_only: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateNotificationRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub notification_type: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub message: String,
    pub link: Option<String>,
    /// Arbitrary payload, stored as a JSON string.
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
    pub related_discussion_id: Option<i64>,
    pub related_study_group_id: Option<i64>,
    pub related_user_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Notification {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub read: bool,
    pub created_at: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
    pub related_model: Option<String>,
    pub related_id: Option<i64>,
}

impl Notification {
    pub fn from_record(record: &Value) -> Self {
        let related = RELATED_FIELDS
            .iter()
            .find_map(|(field, model)| fields::many2one_id(record, field).map(|id| (*model, id)));

        Self {
            id: fields::i64_field(record, "id"),
            kind: fields::string_or_empty(record, "notification_type"),
            title: fields::string_or_empty(record, "title"),
            message: fields::string_or_empty(record, "message"),
            link: fields::string(record, "link"),
            read: fields::bool_field(record, "read"),
            created_at: fields::string(record, "create_date"),
            data: fields::string(record, "data").and_then(|raw| serde_json::from_str(&raw).ok()),
            related_model: related.map(|(model, _)| model.to_string()),
            related_id: related.map(|(_, id)| id),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
    pub unread_count: i64,
}

impl NotificationPage {
    pub fn new(notifications: Vec<Notification>, total: i64, page: i64, per_page: i64, unread_count: i64) -> Self {
        Self {
            notifications,
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
            unread_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadAllResult {
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_record() {
        let record = json!({
            "id": 4,
            "notification_type": "reply",
            "title": "New reply",
            "message": "Sam replied to your question",
            "link": "/discussions/9",
            "read": false,
            "create_date": "2026-05-01 10:00:00",
            "data": "{\"reply_id\": 12}",
            "related_discussion_id": [9, "Fire doors"],
            "related_study_group_id": false,
            "related_user_id": [3, "Sam"],
        });
        let notification = Notification::from_record(&record);
        assert_eq!(notification.kind, "reply");
        assert_eq!(notification.data, Some(json!({ "reply_id": 12 })));
        assert_eq!(notification.related_model.as_deref(), Some("seitech.discussion"));
        assert_eq!(notification.related_id, Some(9));
    }

    #[test]
    fn test_unparseable_data_is_dropped() {
        let record = json!({ "id": 1, "data": "not json", "link": false });
        let notification = Notification::from_record(&record);
        assert_eq!(notification.data, None);
        assert_eq!(notification.link, None);
        assert_eq!(notification.related_model, None);
    }

    #[test]
    fn test_page_counts() {
        let page = NotificationPage::new(Vec::new(), 41, 1, 20, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.unread_count, 5);
    }

    #[test]
    fn test_serialized_type_key() {
        let body = serde_json::to_value(Notification::from_record(&json!({ "id": 2, "notification_type": "badge" }))).unwrap();
        assert_eq!(body["type"], "badge");
        assert!(body.get("kind").is_none());
    }
}
