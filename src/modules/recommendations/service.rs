use anyhow::{Context, anyhow};
use serde_json::{Value, json};
use tracing::{info, instrument};

use seitech_odoo::{Domain, OdooClient, SearchRead, fields};

use crate::modules::courses::COURSE_MODEL;
use crate::modules::recommendations::model::{
    COURSE_FIELDS, GenerateRequest, RECOMMENDATION_FIELDS, RECOMMENDATION_MODEL,
    RecommendationAction, RecommendationQuery, with_courses,
};
use crate::utils::errors::AppError;

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 50;

pub struct RecommendationService;

impl RecommendationService {
    /// Unexpired recommendations for the user, best score first.
    #[instrument(skip(odoo))]
    pub async fn list(odoo: &OdooClient, user_id: i64, query: RecommendationQuery) -> Result<Vec<Value>, AppError> {
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let min_score = query.min_score();

        let domain = Domain::new()
            .eq("user_id", user_id)
            .eq("is_expired", false)
            .eq("status", query.status.as_deref().unwrap_or("pending"))
            .when_some(query.algorithm, |d, algorithm| d.eq("algorithm", algorithm))
            .when_some(min_score, |d, score| d.ge("score", score));

        let recommendations = odoo
            .search_read(
                RECOMMENDATION_MODEL,
                SearchRead::new(domain)
                    .fields(RECOMMENDATION_FIELDS)
                    .limit(limit)
                    .order("score desc, created_date desc"),
            )
            .await
            .context("Failed to fetch recommendations")?;

        let course_ids: Vec<i64> = recommendations
            .iter()
            .filter_map(|r| fields::many2one_id(r, "course_id"))
            .collect();
        let courses = odoo
            .read(COURSE_MODEL, &course_ids, COURSE_FIELDS)
            .await
            .context("Failed to fetch recommendations")?;

        Ok(with_courses(recommendations, courses))
    }

    /// Ask the ERP for a fresh batch and return the pending ones.
    #[instrument(skip(odoo))]
    pub async fn generate(odoo: &OdooClient, user_id: i64, request: GenerateRequest) -> Result<Vec<Value>, AppError> {
        let limit = request.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        odoo.call_kw(
            RECOMMENDATION_MODEL,
            "generate_recommendations",
            json!([user_id]),
            json!({ "limit": limit, "algorithm": request.algorithm }),
        )
        .await
        .context("Failed to generate recommendations")?;

        let recommendations = odoo
            .search_read(
                RECOMMENDATION_MODEL,
                SearchRead::new(
                    Domain::new()
                        .eq("user_id", user_id)
                        .eq("status", "pending")
                        .eq("is_expired", false),
                )
                .fields(&["course_id", "course_name", "score", "algorithm", "reason_type", "reason_text"])
                .limit(limit)
                .order("created_date desc"),
            )
            .await
            .context("Failed to generate recommendations")?;

        info!(count = recommendations.len(), "Recommendations generated");
        Ok(recommendations.into_iter().map(fields::nullify_false).collect())
    }

    #[instrument(skip(odoo))]
    pub async fn update(
        odoo: &OdooClient,
        user_id: i64,
        id: i64,
        action: RecommendationAction,
    ) -> Result<Value, AppError> {
        let existing = odoo
            .read_one(RECOMMENDATION_MODEL, id, &["user_id"])
            .await
            .context("Failed to update recommendation")?
            .ok_or_else(|| AppError::not_found(anyhow!("Recommendation not found")))?;
        if fields::many2one_id(&existing, "user_id").is_some_and(|owner| owner != user_id) {
            return Err(AppError::forbidden("Forbidden"));
        }

        odoo.call_method(RECOMMENDATION_MODEL, action.method(), &[id], json!({}))
            .await
            .context("Failed to update recommendation")?;

        let updated = odoo
            .read_one(RECOMMENDATION_MODEL, id, &["status", "viewed_date", "action_date"])
            .await
            .context("Failed to update recommendation")?
            .map(fields::nullify_false)
            .unwrap_or(Value::Null);
        Ok(updated)
    }
}
