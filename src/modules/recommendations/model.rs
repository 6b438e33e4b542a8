use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use seitech_core::serde::{deserialize_optional_i64, deserialize_optional_string};
use seitech_odoo::fields;

pub const RECOMMENDATION_MODEL: &str = "seitech.recommendation";

pub const RECOMMENDATION_FIELDS: &[&str] = &[
    "course_id",
    "course_name",
    "course_category_id",
    "score",
    "algorithm",
    "reason_type",
    "reason_text",
    "status",
    "created_date",
    "expires_date",
    "viewed_date",
];

pub const COURSE_FIELDS: &[&str] = &[
    "name",
    "description",
    "image_1024",
    "total_slides",
    "total_time",
    "rating_avg",
];

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationQuery {
    /// Defaults to `pending`
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub algorithm: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub min_score: Option<String>,
    /// Defaults to 10
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
}

impl RecommendationQuery {
    pub fn min_score(&self) -> Option<f64> {
        self.min_score.as_deref().and_then(|s| s.trim().parse().ok())
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct GenerateRequest {
    /// Omit for the hybrid algorithm
    pub algorithm: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationAction {
    Viewed,
    Enroll,
    Save,
    Dismiss,
}

impl RecommendationAction {
    pub fn method(self) -> &'static str {
        match self {
            Self::Viewed => "action_viewed",
            Self::Enroll => "action_enroll",
            Self::Save => "action_save",
            Self::Dismiss => "action_dismiss",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Viewed => "viewed",
            Self::Enroll => "enroll",
            Self::Save => "save",
            Self::Dismiss => "dismiss",
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateRecommendationRequest {
    pub action: Option<String>,
}

impl UpdateRecommendationRequest {
    pub fn action(&self) -> Result<RecommendationAction, &'static str> {
        let action = self.action.as_deref().filter(|a| !a.is_empty()).ok_or("action is required")?;
        serde_json::from_value(Value::from(action)).map_err(|_| "Invalid action")
    }
}

/// Attach each recommendation's course record under `course`.
pub fn with_courses(recommendations: Vec<Value>, courses: Vec<Value>) -> Vec<Value> {
    let by_id: HashMap<i64, Value> = courses
        .into_iter()
        .filter_map(|c| Some((c.get("id")?.as_i64()?, fields::nullify_false(c))))
        .collect();

    recommendations
        .into_iter()
        .map(|rec| {
            let course = fields::many2one_id(&rec, "course_id").and_then(|id| by_id.get(&id).cloned());
            let mut rec = fields::nullify_false(rec);
            if let (Value::Object(map), Some(course)) = (&mut rec, course) {
                map.insert("course".into(), course);
            }
            rec
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_from_request() {
        let request = UpdateRecommendationRequest { action: Some("dismiss".into()) };
        assert_eq!(request.action(), Ok(RecommendationAction::Dismiss));
        assert_eq!(RecommendationAction::Dismiss.method(), "action_dismiss");

        assert_eq!(UpdateRecommendationRequest::default().action(), Err("action is required"));
        let request = UpdateRecommendationRequest { action: Some("archive".into()) };
        assert_eq!(request.action(), Err("Invalid action"));
    }

    #[test]
    fn test_min_score_parsing() {
        let query = RecommendationQuery { min_score: Some("0.75".into()), ..Default::default() };
        assert_eq!(query.min_score(), Some(0.75));
        let query = RecommendationQuery { min_score: Some("high".into()), ..Default::default() };
        assert_eq!(query.min_score(), None);
    }

    #[test]
    fn test_with_courses() {
        let recs = vec![
            json!({ "id": 1, "course_id": [7, "Asbestos Awareness"], "viewed_date": false }),
            json!({ "id": 2, "course_id": false }),
        ];
        let courses = vec![json!({ "id": 7, "name": "Asbestos Awareness", "image_1024": false })];
        let merged = with_courses(recs, courses);
        assert_eq!(merged[0]["course"]["name"], "Asbestos Awareness");
        assert_eq!(merged[0]["course"]["image_1024"], Value::Null);
        assert_eq!(merged[0]["viewed_date"], Value::Null);
        assert!(merged[1].get("course").is_none());
    }
}
