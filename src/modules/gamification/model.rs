use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use seitech_core::OffsetPagination;
use seitech_core::serde::{deserialize_optional_i64, deserialize_optional_string};
use seitech_odoo::fields;

pub const LEADERBOARD_MODEL: &str = "seitech.leaderboard";
pub const STUDENT_LEADERBOARD_MODEL: &str = "seitech.student.leaderboard";
pub const BADGE_MODEL: &str = "seitech.badge";
pub const STREAK_MODEL: &str = "seitech.learning.streak";
pub const MILESTONE_MODEL: &str = "seitech.streak.milestone";

pub const LEADERBOARD_FIELDS: &[&str] = &[
    "user_id",
    "category",
    "period",
    "rank",
    "previous_rank",
    "rank_change",
    "score",
    "previous_score",
    "score_change",
    "percentile",
    "points_earned",
    "courses_completed",
    "skills_mastered",
    "streak_days",
    "discussions_contributed",
    "certifications_earned",
    "last_updated",
];

pub const STUDENT_LEADERBOARD_FIELDS: &[&str] = &[
    "id",
    "rank",
    "user_id",
    "partner_id",
    "total_points",
    "courses_completed",
    "badges_earned",
];

pub const BADGE_FIELDS: &[&str] = &[
    "id",
    "name",
    "description",
    "icon",
    "color",
    "badge_type",
    "points_awarded",
    "earned_count",
    "image",
];

pub const STREAK_FIELDS: &[&str] = &[
    "user_id",
    "current_streak",
    "longest_streak",
    "longest_streak_start",
    "longest_streak_end",
    "start_date",
    "last_activity_date",
    "freeze_days_available",
    "freeze_days_used",
    "freeze_days_total",
    "perfect_weeks",
    "perfect_months",
    "total_activities",
    "next_milestone",
    "daily_goal_met",
    "milestone_ids",
];

pub const FROZEN_STREAK_FIELDS: &[&str] = &[
    "current_streak",
    "freeze_days_available",
    "freeze_days_used",
    "last_activity_date",
];

pub const MILESTONE_FIELDS: &[&str] = &["days", "achieved", "achieved_date", "badge_id", "freeze_days_earned"];

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// Ranking category (default `overall`)
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub category: Option<String>,
    /// Ranking period (default `all_time`)
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub period: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub user_id: Option<i64>,
    /// Only the first N ranks
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub top_n: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Items per page (default 50)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    pub user_id: i64,
    pub user_name: String,
    pub user_avatar: String,
    pub category: String,
    pub period: String,
    pub rank: i64,
    pub previous_rank: i64,
    pub rank_change: i64,
    pub score: f64,
    pub previous_score: f64,
    pub score_change: f64,
    pub percentile: f64,
    pub points_earned: i64,
    pub courses_completed: i64,
    pub skills_mastered: i64,
    pub streak_days: i64,
    pub discussions_contributed: i64,
    pub certifications_earned: i64,
    pub last_updated: Option<String>,
}

impl LeaderboardEntry {
    /// `avatars` maps user ids to base64 `image_128` values.
    pub fn from_record(record: &Value, avatars: &HashMap<i64, String>) -> Self {
        let user_id = fields::many2one_id(record, "user_id").unwrap_or(0);
        Self {
            user_id,
            user_name: fields::many2one_name(record, "user_id").unwrap_or_default(),
            user_avatar: avatars
                .get(&user_id)
                .map(|b64| format!("data:image/png;base64,{b64}"))
                .unwrap_or_default(),
            category: fields::string_or_empty(record, "category"),
            period: fields::string_or_empty(record, "period"),
            rank: fields::i64_field(record, "rank"),
            previous_rank: fields::i64_field(record, "previous_rank"),
            rank_change: fields::i64_field(record, "rank_change"),
            score: fields::f64_field(record, "score"),
            previous_score: fields::f64_field(record, "previous_score"),
            score_change: fields::f64_field(record, "score_change"),
            percentile: fields::f64_field(record, "percentile"),
            points_earned: fields::i64_field(record, "points_earned"),
            courses_completed: fields::i64_field(record, "courses_completed"),
            skills_mastered: fields::i64_field(record, "skills_mastered"),
            streak_days: fields::i64_field(record, "streak_days"),
            discussions_contributed: fields::i64_field(record, "discussions_contributed"),
            certifications_earned: fields::i64_field(record, "certifications_earned"),
            last_updated: fields::string(record, "last_updated"),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardPage {
    pub items: Vec<LeaderboardEntry>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentLeaderboardQuery {
    /// Page size (default 20, at most 100)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentRanking {
    pub id: i64,
    pub rank: i64,
    pub user_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub total_points: i64,
    pub courses_completed: i64,
    pub badges_earned: i64,
}

impl StudentRanking {
    /// `partners` maps partner ids to their `res.partner` records.
    pub fn from_record(record: &Value, partners: &HashMap<i64, Value>) -> Self {
        let partner = fields::many2one_id(record, "partner_id").and_then(|id| partners.get(&id));
        Self {
            id: fields::i64_field(record, "id"),
            rank: fields::i64_field(record, "rank"),
            user_id: fields::many2one_id(record, "user_id").unwrap_or(0),
            name: partner
                .and_then(|p| fields::string(p, "name"))
                .unwrap_or_else(|| "Anonymous".to_string()),
            avatar: partner.and_then(|p| fields::image_data_url(p, "image_128")),
            total_points: fields::i64_field(record, "total_points"),
            courses_completed: fields::i64_field(record, "courses_completed"),
            badges_earned: fields::i64_field(record, "badges_earned"),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentLeaderboard {
    pub leaderboard: Vec<StudentRanking>,
    pub pagination: OffsetPagination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StudentLeaderboard {
    pub fn unavailable() -> Self {
        Self {
            leaderboard: Vec::new(),
            pagination: OffsetPagination::new(0, 20, 0),
            message: Some("Leaderboard data is currently unavailable".into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub points_awarded: i64,
    pub earned_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Badge {
    pub fn from_record(record: &Value) -> Self {
        Self {
            id: fields::i64_field(record, "id"),
            name: fields::string_or_empty(record, "name"),
            description: fields::string_or_empty(record, "description"),
            icon: fields::string(record, "icon").unwrap_or_else(|| "Award".into()),
            color: fields::string(record, "color").unwrap_or_else(|| "#0284c7".into()),
            kind: fields::string(record, "badge_type").unwrap_or_else(|| "achievement".into()),
            points_awarded: fields::i64_field(record, "points_awarded"),
            earned_count: fields::i64_field(record, "earned_count"),
            image: fields::image_data_url(record, "image"),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BadgeList {
    pub badges: Vec<Badge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AchievementStats {
    pub total_points: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub badges_earned: i64,
    pub courses_completed: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct UserAchievements {
    #[schema(value_type = Vec<Object>)]
    pub achievements: Vec<Value>,
    pub stats: AchievementStats,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StreakActionRequest {
    /// Only `freeze` is supported.
    #[serde(default)]
    pub action: String,
}

/// Milestone ids of a streak record; the ERP may send plain ids or
/// `[id, name]` pairs.
pub fn milestone_ids(streak: &Value) -> Vec<i64> {
    streak
        .get("milestone_ids")
        .and_then(Value::as_array)
        .map(|ids| {
            ids.iter()
                .filter_map(|id| match id {
                    Value::Array(pair) => pair.first().and_then(Value::as_i64),
                    other => other.as_i64(),
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_leaderboard_entry_with_avatar() {
        let record = json!({
            "user_id": [7, "Priya Patel"],
            "category": "overall",
            "period": "all_time",
            "rank": 1,
            "score": 980.5,
            "last_updated": false,
        });
        let avatars = HashMap::from([(7, "iVBOR".to_string())]);
        let entry = LeaderboardEntry::from_record(&record, &avatars);
        assert_eq!(entry.user_id, 7);
        assert_eq!(entry.user_name, "Priya Patel");
        assert_eq!(entry.user_avatar, "data:image/png;base64,iVBOR");
        assert_eq!(entry.score, 980.5);
        assert_eq!(entry.last_updated, None);

        let without = LeaderboardEntry::from_record(&record, &HashMap::new());
        assert_eq!(without.user_avatar, "");
    }

    #[test]
    fn test_student_ranking_defaults_to_anonymous() {
        let record = json!({ "id": 3, "rank": 2, "user_id": false, "partner_id": [40, "x"], "total_points": 120 });
        let ranking = StudentRanking::from_record(&record, &HashMap::new());
        assert_eq!(ranking.name, "Anonymous");
        assert_eq!(ranking.user_id, 0);
        assert_eq!(ranking.avatar, None);

        let partners = HashMap::from([(40, json!({ "id": 40, "name": "Lee Chen", "image_128": "abc" }))]);
        let ranking = StudentRanking::from_record(&record, &partners);
        assert_eq!(ranking.name, "Lee Chen");
        assert_eq!(ranking.avatar.as_deref(), Some("data:image/png;base64,abc"));
    }

    #[test]
    fn test_badge_defaults() {
        let badge = Badge::from_record(&json!({ "id": 1, "name": "First Steps", "icon": false, "color": false, "badge_type": false }));
        assert_eq!(badge.icon, "Award");
        assert_eq!(badge.color, "#0284c7");
        assert_eq!(badge.kind, "achievement");
        let body = serde_json::to_value(&badge).unwrap();
        assert_eq!(body["type"], "achievement");
        assert!(body.get("image").is_none());
    }

    #[test]
    fn test_milestone_ids_accepts_pairs() {
        assert_eq!(milestone_ids(&json!({ "milestone_ids": [1, 2] })), vec![1, 2]);
        assert_eq!(milestone_ids(&json!({ "milestone_ids": [[3, "7 days"]] })), vec![3]);
        assert!(milestone_ids(&json!({ "milestone_ids": false })).is_empty());
    }
}
