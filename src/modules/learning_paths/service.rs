use anyhow::{Context, anyhow};
use serde_json::{Value, json};
use tracing::{info, instrument};

use seitech_core::{OffsetPagination, clamp_offset};
use seitech_odoo::{Domain, OdooClient, SearchRead, fields};

use crate::modules::learning_paths::model::{
    CreateLearningPathRequest, DELETABLE_STATES, DETAIL_FIELDS, LearningPathQuery, NODE_FIELDS,
    NODE_MODEL, PATH_FIELDS, PATH_MODEL, PROGRESS_FIELDS, PathAction, PathActionResult,
    UpdateLearningPathRequest,
};
use crate::utils::errors::AppError;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

pub struct LearningPathService;

impl LearningPathService {
    #[instrument(skip(odoo))]
    pub async fn list(
        odoo: &OdooClient,
        user_id: i64,
        query: LearningPathQuery,
    ) -> Result<(Vec<Value>, OffsetPagination), AppError> {
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = clamp_offset(query.offset);

        let domain = Domain::new()
            .eq("user_id", user_id)
            .when_some(query.state, |d, state| d.eq("state", state))
            .when_some(query.path_type, |d, kind| d.eq("path_type", kind))
            .when(query.templates == Some(true), |d| d.eq("is_template", true));

        let (paths, total) = tokio::try_join!(
            odoo.search_read(
                PATH_MODEL,
                SearchRead::new(domain.clone())
                    .fields(PATH_FIELDS)
                    .offset(offset)
                    .limit(limit)
                    .order("last_activity desc"),
            ),
            odoo.search_count(PATH_MODEL, domain),
        )
        .context("Failed to fetch learning paths")?;

        Ok((
            paths.into_iter().map(fields::nullify_false).collect(),
            OffsetPagination::new(offset, limit, total),
        ))
    }

    #[instrument(skip(odoo, dto))]
    pub async fn create(
        odoo: &OdooClient,
        user_id: i64,
        dto: CreateLearningPathRequest,
    ) -> Result<Value, AppError> {
        let id = odoo
            .create(PATH_MODEL, dto.values(user_id))
            .await
            .context("Failed to create learning path")?;
        info!(path_id = id, "Learning path created");
        Self::read(odoo, id, PATH_FIELDS).await
    }

    /// A path with its ordered course nodes and skills. Templates are
    /// readable by anyone; other paths only by their owner.
    #[instrument(skip(odoo))]
    pub async fn get(odoo: &OdooClient, user_id: i64, id: i64) -> Result<Value, AppError> {
        let mut path = Self::read(odoo, id, DETAIL_FIELDS).await?;
        if !fields::bool_field(&path, "is_template") && fields::many2one_id(&path, "user_id") != Some(user_id) {
            return Err(AppError::forbidden("Forbidden"));
        }

        let node_ids = fields::ids(&path, "node_ids");
        let skill_ids = fields::ids(&path, "skill_ids");
        let (mut nodes, skills) = tokio::try_join!(
            odoo.read(NODE_MODEL, &node_ids, NODE_FIELDS),
            odoo.read("seitech.skill", &skill_ids, &["name", "category", "description"]),
        )
        .context("Failed to fetch learning path")?;
        nodes.sort_by_key(|node| fields::i64_field(node, "sequence"));

        if let Value::Object(map) = &mut path {
            map.insert(
                "nodes".into(),
                Value::Array(nodes.into_iter().map(fields::nullify_false).collect()),
            );
            map.insert(
                "skills".into(),
                Value::Array(skills.into_iter().map(fields::nullify_false).collect()),
            );
        }
        Ok(path)
    }

    #[instrument(skip(odoo, dto))]
    pub async fn update(
        odoo: &OdooClient,
        user_id: i64,
        id: i64,
        dto: UpdateLearningPathRequest,
    ) -> Result<Value, AppError> {
        Self::owned(odoo, user_id, id).await?;

        let values = dto.values();
        if values.is_empty() {
            return Err(AppError::bad_request(anyhow!("No valid fields to update")));
        }
        odoo.write(PATH_MODEL, &[id], Value::Object(values))
            .await
            .context("Failed to update learning path")?;

        Self::read(odoo, id, PATH_FIELDS).await
    }

    #[instrument(skip(odoo))]
    pub async fn delete(odoo: &OdooClient, user_id: i64, id: i64) -> Result<(), AppError> {
        let path = Self::owned(odoo, user_id, id).await?;
        let state = fields::string_or_empty(&path, "state");
        if !DELETABLE_STATES.contains(&state.as_str()) {
            return Err(AppError::bad_request(anyhow!(
                "Can only delete draft or cancelled learning paths"
            )));
        }

        odoo.unlink(PATH_MODEL, &[id])
            .await
            .context("Failed to delete learning path")?;
        Ok(())
    }

    #[instrument(skip(odoo))]
    pub async fn run_action(
        odoo: &OdooClient,
        user_id: i64,
        id: i64,
        action: PathAction,
    ) -> Result<PathActionResult, AppError> {
        Self::owned(odoo, user_id, id).await?;

        let result = match &action {
            PathAction::AddCourse {
                course_id,
                is_required,
                sequence,
            } => {
                let node_id = odoo
                    .create(
                        NODE_MODEL,
                        json!({
                            "path_id": id,
                            "channel_id": course_id,
                            "is_required": is_required,
                            "sequence": sequence,
                        }),
                    )
                    .await
                    .context("Failed to add course")?;
                json!({ "nodeId": node_id })
            }
            PathAction::RemoveCourse { node_id, course_id } => {
                let domain = Domain::new()
                    .eq("path_id", id)
                    .when_some(*node_id, |d, node| d.eq("id", node))
                    .when_some(*course_id, |d, course| d.eq("channel_id", course));
                let nodes = odoo
                    .search_read(NODE_MODEL, SearchRead::new(domain).fields(&["id"]))
                    .await
                    .context("Failed to remove course")?;
                let ids: Vec<i64> = nodes
                    .iter()
                    .filter_map(|n| n.get("id").and_then(Value::as_i64))
                    .collect();
                if ids.is_empty() {
                    return Err(AppError::not_found(anyhow!("Course is not on this learning path")));
                }
                odoo.unlink(NODE_MODEL, &ids)
                    .await
                    .context("Failed to remove course")?;
                json!({ "removed": ids.len() })
            }
            other => match other.method() {
                Some((method, kwargs)) => odoo
                    .call_method(PATH_MODEL, method, &[id], kwargs)
                    .await
                    .context("Failed to execute action")?,
                None => Value::Null,
            },
        };

        let path = Self::read(odoo, id, PROGRESS_FIELDS).await?;
        Ok(PathActionResult { path, result })
    }

    async fn read(odoo: &OdooClient, id: i64, field_list: &[&str]) -> Result<Value, AppError> {
        odoo.read_one(PATH_MODEL, id, field_list)
            .await
            .context("Failed to fetch learning path")?
            .map(fields::nullify_false)
            .ok_or_else(|| AppError::not_found(anyhow!("Learning path not found")))
    }

    /// Owner and state of a path the user owns.
    async fn owned(odoo: &OdooClient, user_id: i64, id: i64) -> Result<Value, AppError> {
        let path = Self::read(odoo, id, &["user_id", "state"]).await?;
        match fields::many2one_id(&path, "user_id") {
            Some(owner) if owner != user_id => Err(AppError::forbidden("Forbidden")),
            _ => Ok(path),
        }
    }
}
