use std::collections::HashMap;

use anyhow::{Context, anyhow};
use serde_json::{Map, Value, json};
use tracing::{instrument, warn};

use seitech_core::{OffsetPagination, PaginationParams, clamp_offset};
use seitech_core::pagination::total_pages;
use seitech_odoo::{Domain, OdooClient, OdooError, SearchRead, fields};

use crate::modules::gamification::model::{
    BADGE_FIELDS, BADGE_MODEL, Badge, FROZEN_STREAK_FIELDS, LEADERBOARD_FIELDS, LEADERBOARD_MODEL,
    LeaderboardEntry, LeaderboardPage, LeaderboardQuery, MILESTONE_FIELDS, MILESTONE_MODEL,
    STREAK_FIELDS, STREAK_MODEL, STUDENT_LEADERBOARD_FIELDS,
    STUDENT_LEADERBOARD_MODEL, StudentLeaderboard, StudentLeaderboardQuery, StudentRanking,
    UserAchievements, milestone_ids,
};
use crate::utils::errors::AppError;

const DEFAULT_PER_PAGE: i64 = 50;
const MAX_PER_PAGE: i64 = 200;
const STUDENT_LEADERBOARD_LIMIT: i64 = 20;
const STUDENT_LEADERBOARD_MAX: i64 = 100;

pub struct GamificationService;

impl GamificationService {
    #[instrument(skip(odoo))]
    pub async fn leaderboard(odoo: &OdooClient, query: LeaderboardQuery) -> Result<LeaderboardPage, AppError> {
        let window = PaginationParams::new(query.page, query.per_page).window(DEFAULT_PER_PAGE, MAX_PER_PAGE);
        let limit = query.top_n.map_or(window.limit, |n| n.clamp(1, MAX_PER_PAGE));

        let domain = Domain::new()
            .eq("category", query.category.as_deref().unwrap_or("overall"))
            .eq("period", query.period.as_deref().unwrap_or("all_time"))
            .when_some(query.user_id, |d, id| d.eq("user_id", id));

        let (records, total) = tokio::try_join!(
            odoo.search_read(
                LEADERBOARD_MODEL,
                SearchRead::new(domain.clone())
                    .fields(LEADERBOARD_FIELDS)
                    .offset(window.offset)
                    .limit(limit)
                    .order("rank asc"),
            ),
            odoo.search_count(LEADERBOARD_MODEL, domain),
        )
        .context("Failed to fetch leaderboard")?;

        let user_ids: Vec<i64> = records
            .iter()
            .filter_map(|r| fields::many2one_id(r, "user_id"))
            .collect();
        let avatars: HashMap<i64, String> = odoo
            .read("res.users", &user_ids, &["id", "image_128"])
            .await
            .context("Failed to fetch leaderboard")?
            .iter()
            .filter_map(|user| Some((user.get("id")?.as_i64()?, fields::string(user, "image_128")?)))
            .collect();

        Ok(LeaderboardPage {
            items: records
                .iter()
                .map(|r| LeaderboardEntry::from_record(r, &avatars))
                .collect(),
            total,
            page: window.page,
            per_page: limit,
            total_pages: total_pages(total, limit),
        })
    }

    #[instrument(skip(odoo))]
    pub async fn refresh_leaderboards(odoo: &OdooClient) -> Result<(), AppError> {
        odoo.call_kw(LEADERBOARD_MODEL, "update_leaderboards", json!([]), json!({}))
            .await
            .context("Failed to update leaderboard")?;
        Ok(())
    }

    /// Aggregated student ranking; an ERP failure yields an empty board.
    #[instrument(skip(odoo))]
    pub async fn student_leaderboard(odoo: &OdooClient, query: StudentLeaderboardQuery) -> StudentLeaderboard {
        let limit = query
            .limit
            .unwrap_or(STUDENT_LEADERBOARD_LIMIT)
            .clamp(1, STUDENT_LEADERBOARD_MAX);
        let offset = clamp_offset(query.offset);

        match Self::load_student_leaderboard(odoo, offset, limit).await {
            Ok(board) => board,
            Err(e) => {
                warn!(error = %e, "Student leaderboard unavailable");
                StudentLeaderboard::unavailable()
            }
        }
    }

    async fn load_student_leaderboard(
        odoo: &OdooClient,
        offset: i64,
        limit: i64,
    ) -> Result<StudentLeaderboard, OdooError> {
        let (records, total) = tokio::try_join!(
            odoo.search_read(
                STUDENT_LEADERBOARD_MODEL,
                SearchRead::new(Domain::new())
                    .fields(STUDENT_LEADERBOARD_FIELDS)
                    .offset(offset)
                    .limit(limit)
                    .order("rank asc"),
            ),
            odoo.search_count(STUDENT_LEADERBOARD_MODEL, Domain::new()),
        )?;

        let partner_ids: Vec<i64> = records
            .iter()
            .filter_map(|r| fields::many2one_id(r, "partner_id"))
            .collect();
        let partners: HashMap<i64, Value> = odoo
            .read("res.partner", &partner_ids, &["id", "name", "image_128"])
            .await?
            .into_iter()
            .filter_map(|p| Some((p.get("id")?.as_i64()?, p)))
            .collect();

        Ok(StudentLeaderboard {
            leaderboard: records
                .iter()
                .map(|r| StudentRanking::from_record(r, &partners))
                .collect(),
            pagination: OffsetPagination::new(offset, limit, total),
            message: None,
        })
    }

    #[instrument(skip(odoo))]
    pub async fn badges(odoo: &OdooClient) -> Result<Vec<Badge>, OdooError> {
        let records = odoo
            .search_read(
                BADGE_MODEL,
                SearchRead::new(Domain::new().eq("is_active", true))
                    .fields(BADGE_FIELDS)
                    .order("sequence asc, name asc"),
            )
            .await?;
        Ok(records.iter().map(Badge::from_record).collect())
    }

    /// The ERP's achievements payload for the user, when it has one.
    #[instrument(skip(odoo, session))]
    pub async fn user_achievements(odoo: &OdooClient, session: Option<&str>) -> Option<Value> {
        match odoo
            .rest_get("/api/gamification/user-achievements", &[], session)
            .await
        {
            Ok(response) if response.is_json && response.envelope_success() => {
                response.body.get("data").cloned()
            }
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "User achievements unavailable");
                None
            }
        }
    }

    pub fn empty_achievements() -> UserAchievements {
        UserAchievements::default()
    }

    /// The user's streak with its milestones, creating the record on first use.
    #[instrument(skip(odoo))]
    pub async fn streak(odoo: &OdooClient, user_id: i64) -> Result<Value, AppError> {
        let streak_id = match Self::streak_id(odoo, user_id).await? {
            Some(id) => id,
            None => odoo
                .create(STREAK_MODEL, json!({ "user_id": user_id }))
                .await
                .context("Failed to create streak")?,
        };

        let mut streak = odoo
            .read(STREAK_MODEL, &[streak_id], STREAK_FIELDS)
            .await
            .context("Failed to fetch streak")?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::internal(anyhow!("Failed to read streak")))?;

        let milestone_ids = milestone_ids(&streak);
        if !milestone_ids.is_empty() {
            let milestones = odoo
                .read(MILESTONE_MODEL, &milestone_ids, MILESTONE_FIELDS)
                .await
                .context("Failed to fetch streak milestones")?;
            if let Value::Object(map) = &mut streak {
                map.insert("milestones".into(), Value::Array(milestones));
            }
        }

        Ok(fields::nullify_false(streak))
    }

    /// Spend a freeze day; returns the updated streak counters.
    #[instrument(skip(odoo))]
    pub async fn freeze_streak(odoo: &OdooClient, user_id: i64) -> Result<Value, AppError> {
        let streak_id = Self::streak_id(odoo, user_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Streak record not found")))?;

        odoo.call_method(STREAK_MODEL, "action_freeze_streak", &[streak_id], json!({}))
            .await
            .context("Failed to freeze streak")?;

        let streak = odoo
            .read(STREAK_MODEL, &[streak_id], FROZEN_STREAK_FIELDS)
            .await
            .context("Failed to read updated streak")?
            .into_iter()
            .next()
            .unwrap_or_else(|| Value::Object(Map::new()));
        Ok(fields::nullify_false(streak))
    }

    async fn streak_id(odoo: &OdooClient, user_id: i64) -> Result<Option<i64>, AppError> {
        let records = odoo
            .search_read(
                STREAK_MODEL,
                SearchRead::new(Domain::new().eq("user_id", user_id))
                    .fields(&["id"])
                    .limit(1),
            )
            .await
            .context("Failed to fetch streak")?;
        Ok(records
            .first()
            .and_then(|r| r.get("id"))
            .and_then(Value::as_i64))
    }
}
