use anyhow::{Context, anyhow};
use serde_json::{Value, json};
use tracing::{instrument, warn};

use seitech_core::{OffsetPagination, clamp_offset};
use seitech_odoo::{Domain, OdooClient, SearchRead, fields};

use crate::modules::courses::COURSE_MODEL;
use crate::modules::skills::model::{
    COURSE_SKILL_MODEL, SKILL_FIELDS, SKILL_MODEL, SkillQuery, UPDATED_SKILL_FIELDS,
    USER_SKILL_FIELDS, USER_SKILL_MODEL, UserSkillAction, UserSkillQuery, action_result,
    courses_with_mappings,
};
use crate::utils::errors::AppError;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

pub struct SkillService;

impl SkillService {
    #[instrument(skip(odoo))]
    pub async fn list(odoo: &OdooClient, query: SkillQuery) -> Result<(Vec<Value>, OffsetPagination), AppError> {
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = clamp_offset(query.offset);
        let trending = query.trending == Some(true);

        let domain = Domain::new()
            .eq("active", true)
            .when_some(query.category, |d, category| d.eq("category", category))
            .when(trending, |d| d.eq("is_trending", true))
            .when_some(query.parent_id, |d, id| d.eq("parent_id", id))
            .when_some(query.search, |d, term| {
                d.any_of([
                    ("name", "ilike", json!(term)),
                    ("description", "ilike", json!(term)),
                ])
            });

        let (skills, total) = tokio::try_join!(
            odoo.search_read(
                SKILL_MODEL,
                SearchRead::new(domain.clone())
                    .fields(SKILL_FIELDS)
                    .offset(offset)
                    .limit(limit)
                    .order(if trending { "trending_score desc" } else { "name asc" }),
            ),
            odoo.search_count(SKILL_MODEL, domain),
        )
        .context("Failed to fetch skills")?;

        Ok((
            skills.into_iter().map(fields::nullify_false).collect(),
            OffsetPagination::new(offset, limit, total),
        ))
    }

    /// A skill with the courses that teach it and its child skills.
    #[instrument(skip(odoo))]
    pub async fn get(odoo: &OdooClient, id: i64) -> Result<Value, AppError> {
        let mut field_list = SKILL_FIELDS.to_vec();
        field_list.push("course_skill_ids");
        let skill = odoo
            .read_one(SKILL_MODEL, id, &field_list)
            .await
            .context("Failed to fetch skill")?
            .ok_or_else(|| AppError::not_found(anyhow!("Skill not found")))?;

        let mapping_ids = fields::ids(&skill, "course_skill_ids");
        let child_ids = fields::ids(&skill, "child_ids");
        let (mappings, children) = tokio::try_join!(
            odoo.read(
                COURSE_SKILL_MODEL,
                &mapping_ids,
                &["channel_id", "proficiency_level", "is_primary", "skill_points"],
            ),
            odoo.read(SKILL_MODEL, &child_ids, &["name", "category", "total_courses", "is_trending"]),
        )
        .context("Failed to fetch skill")?;

        let course_ids: Vec<i64> = mappings
            .iter()
            .filter_map(|m| fields::many2one_id(m, "channel_id"))
            .collect();
        let courses = odoo
            .read(
                COURSE_MODEL,
                &course_ids,
                &["name", "description", "total_slides", "total_time", "rating_avg"],
            )
            .await
            .context("Failed to fetch skill")?;

        let mut skill = fields::nullify_false(skill);
        if let Value::Object(map) = &mut skill {
            map.insert("courses".into(), Value::Array(courses_with_mappings(courses, &mappings)));
            map.insert("children".into(), Value::Array(children));
        }
        Ok(skill)
    }

    /// The user's skills, strongest first, with the ERP's profile summary.
    #[instrument(skip(odoo))]
    pub async fn user_skills(odoo: &OdooClient, user_id: i64, query: UserSkillQuery) -> Result<Value, AppError> {
        let domain = Domain::new()
            .eq("user_id", user_id)
            .when_some(query.category, |d, category| d.eq("skill_category", category))
            .when_some(query.verified, |d, verified| d.eq("verified", verified))
            .when_some(query.level, |d, level| d.eq("current_level", level));

        let skills = odoo
            .search_read(
                USER_SKILL_MODEL,
                SearchRead::new(domain).fields(USER_SKILL_FIELDS).order("points desc"),
            )
            .await
            .context("Failed to fetch user skills")?;

        let profile = odoo
            .call_kw(USER_SKILL_MODEL, "get_user_skill_profile", json!([user_id]), json!({}))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Skill profile unavailable");
                Value::Null
            });

        Ok(json!({
            "skills": skills.into_iter().map(fields::nullify_false).collect::<Vec<_>>(),
            "profile": profile,
        }))
    }

    #[instrument(skip(odoo))]
    pub async fn update_user_skill(
        odoo: &OdooClient,
        user_id: i64,
        skill_id: i64,
        action: UserSkillAction,
    ) -> Result<(Value, Value), AppError> {
        let records = odoo
            .search_read(
                USER_SKILL_MODEL,
                SearchRead::new(Domain::new().eq("user_id", user_id).eq("skill_id", skill_id))
                    .fields(&["id"])
                    .limit(1),
            )
            .await
            .context("Failed to update user skill")?;
        let user_skill_id = records
            .first()
            .and_then(|r| r.get("id"))
            .and_then(Value::as_i64)
            .ok_or_else(|| AppError::not_found(anyhow!("User skill not found")))?;

        let method_result = match &action {
            UserSkillAction::SetTarget(level) => {
                odoo.write(USER_SKILL_MODEL, &[user_skill_id], json!({ "target_level": level }))
                    .await
                    .context("Failed to update target level")?;
                Value::Null
            }
            UserSkillAction::Practiced => odoo
                .call_method(USER_SKILL_MODEL, "update_last_practiced", &[user_skill_id], json!({}))
                .await
                .context("Failed to update user skill")?,
            UserSkillAction::LevelUp => odoo
                .call_method(USER_SKILL_MODEL, "action_level_up", &[user_skill_id], json!({}))
                .await
                .context("Failed to update user skill")?,
        };

        let updated = odoo
            .read_one(USER_SKILL_MODEL, user_skill_id, UPDATED_SKILL_FIELDS)
            .await
            .context("Failed to fetch updated skill")?
            .map(fields::nullify_false)
            .ok_or_else(|| AppError::internal(anyhow!("Failed to fetch updated skill")))?;

        Ok((updated, action_result(&action, method_result)))
    }
}
