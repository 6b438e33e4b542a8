use anyhow::{Context, anyhow};
use serde_json::{Map, Value, json};
use tracing::{instrument, warn};

use seitech_core::PaginationParams;
use seitech_core::pagination::total_pages;
use seitech_odoo::{Domain, OdooClient, SearchRead, fields};

use crate::middleware::auth::AuthUser;
use crate::modules::discussions::model::{
    CreateDiscussionRequest, CreateReplyRequest, DISCUSSION_FIELDS, DISCUSSION_MODEL,
    DiscussionPage, DiscussionQuery, REPLY_FIELDS, REPLY_MODEL, UpdateDiscussionRequest,
    UpvoteResult, VISIBLE_STATES, present, thread_replies,
};
use crate::utils::errors::AppError;
use crate::utils::odoo::{UserOrm, contains_id, replace_ids};

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

pub struct DiscussionService;

impl DiscussionService {
    #[instrument(skip(odoo))]
    pub async fn list(
        odoo: &OdooClient,
        viewer: Option<i64>,
        query: DiscussionQuery,
    ) -> Result<DiscussionPage, AppError> {
        let window = PaginationParams::new(query.page, query.limit).window(DEFAULT_PER_PAGE, MAX_PER_PAGE);

        let domain = Domain::new()
            .when_some(query.category, |d, category| d.eq("category", category))
            .when_some(query.course_id, |d, id| d.eq("course_id", id))
            .when_some(query.study_group_id, |d, id| d.eq("study_group_id", id))
            .when_some(query.author_id, |d, id| d.eq("author_id", id))
            .when(query.is_pinned == Some(true), |d| d.eq("is_pinned", true))
            .when(query.is_featured == Some(true), |d| d.eq("is_featured", true))
            .when(query.has_best_answer == Some(true), |d| d.eq("has_best_answer", true))
            .when_some(query.search, |d, term| {
                d.any_of([
                    ("name", "ilike", json!(term)),
                    ("content", "ilike", json!(term)),
                ])
            });
        let domain = match query.state {
            Some(state) => domain.eq("state", state),
            None => domain.in_("state", VISIBLE_STATES.iter().copied()),
        };

        let (records, total) = tokio::try_join!(
            odoo.search_read(
                DISCUSSION_MODEL,
                SearchRead::new(domain.clone())
                    .fields(DISCUSSION_FIELDS)
                    .offset(window.offset)
                    .limit(window.limit)
                    .order("is_pinned desc, last_activity_date desc"),
            ),
            odoo.search_count(DISCUSSION_MODEL, domain),
        )
        .context("Failed to fetch discussions")?;

        Ok(DiscussionPage {
            items: records.into_iter().map(|r| present(r, viewer)).collect(),
            total,
            page: window.page,
            per_page: window.limit,
            total_pages: total_pages(total, window.limit),
        })
    }

    /// Create a draft, publish it and return the stored record.
    #[instrument(skip(odoo, auth_user, dto))]
    pub async fn create(
        odoo: &OdooClient,
        auth_user: &AuthUser,
        dto: CreateDiscussionRequest,
    ) -> Result<Value, AppError> {
        let uid = auth_user.odoo_uid()?;
        let mut values = Map::new();
        values.insert("name".into(), json!(dto.name));
        values.insert("content".into(), json!(dto.content));
        values.insert("category".into(), json!(dto.category));
        values.insert("state".into(), json!("draft"));
        values.insert("author_id".into(), json!(uid));
        for (field, id) in [
            ("course_id", dto.course_id),
            ("slide_id", dto.slide_id),
            ("study_group_id", dto.study_group_id),
        ] {
            if let Some(id) = id {
                values.insert(field.into(), json!(id));
            }
        }
        if let Some(tags) = dto.tag_ids.filter(|ids| !ids.is_empty()) {
            values.insert("tag_ids".into(), replace_ids(&tags));
        }
        if let Some(skills) = dto.skill_ids.filter(|ids| !ids.is_empty()) {
            values.insert("skill_ids".into(), replace_ids(&skills));
        }

        let orm = UserOrm::new(odoo, auth_user);
        let id = orm
            .create(DISCUSSION_MODEL, Value::Object(values))
            .await
            .context("Failed to create discussion")?;
        orm.call_method(DISCUSSION_MODEL, "action_publish", &[id])
            .await
            .context("Failed to publish discussion")?;

        let record = Self::read(odoo, id).await?;
        Ok(present(record, Some(uid)))
    }

    /// Count the view and return the discussion with its replies inline.
    #[instrument(skip(odoo))]
    pub async fn get(odoo: &OdooClient, viewer: Option<i64>, id: i64) -> Result<Value, AppError> {
        if let Err(e) = odoo
            .call_method(DISCUSSION_MODEL, "action_increment_view", &[id], json!({}))
            .await
        {
            warn!(error = %e, discussion_id = id, "View count not updated");
        }

        let record = Self::read(odoo, id).await?;
        let reply_ids = fields::ids(&record, "reply_ids");
        let replies = odoo
            .read(REPLY_MODEL, &reply_ids, REPLY_FIELDS)
            .await
            .context("Failed to fetch replies")?;

        let mut record = present(record, viewer);
        if let Value::Object(map) = &mut record {
            map.insert(
                "replies".into(),
                Value::Array(replies.into_iter().map(|r| present(r, viewer)).collect()),
            );
        }
        Ok(record)
    }

    #[instrument(skip(odoo, auth_user, dto))]
    pub async fn update(
        odoo: &OdooClient,
        auth_user: &AuthUser,
        id: i64,
        dto: UpdateDiscussionRequest,
    ) -> Result<Value, AppError> {
        let uid = auth_user.odoo_uid()?;
        Self::ensure_author(odoo, uid, id).await?;

        let values = dto.values();
        if !values.is_empty() {
            odoo.write(DISCUSSION_MODEL, &[id], Value::Object(values))
                .await
                .context("Failed to update discussion")?;
        }
        if let Some(action) = dto.action {
            UserOrm::new(odoo, auth_user)
                .call_method(DISCUSSION_MODEL, action.method(), &[id])
                .await
                .context("Failed to update discussion")?;
        }

        let record = Self::read(odoo, id).await?;
        Ok(present(record, Some(uid)))
    }

    /// Discussions are closed rather than removed.
    #[instrument(skip(odoo, auth_user))]
    pub async fn close(odoo: &OdooClient, auth_user: &AuthUser, id: i64) -> Result<(), AppError> {
        Self::ensure_author(odoo, auth_user.odoo_uid()?, id).await?;
        UserOrm::new(odoo, auth_user)
            .call_method(DISCUSSION_MODEL, "action_close", &[id])
            .await
            .context("Failed to delete discussion")?;
        Ok(())
    }

    #[instrument(skip(odoo))]
    pub async fn replies(odoo: &OdooClient, viewer: Option<i64>, id: i64) -> Result<Vec<Value>, AppError> {
        let records = odoo
            .search_read(
                REPLY_MODEL,
                SearchRead::new(
                    Domain::new()
                        .eq("discussion_id", id)
                        .in_("state", ["published", "edited"]),
                )
                .fields(REPLY_FIELDS)
                .order("create_date asc"),
            )
            .await
            .context("Failed to fetch replies")?;

        Ok(thread_replies(
            records.into_iter().map(|r| present(r, viewer)).collect(),
        ))
    }

    #[instrument(skip(odoo, auth_user, dto))]
    pub async fn reply(
        odoo: &OdooClient,
        auth_user: &AuthUser,
        id: i64,
        dto: CreateReplyRequest,
    ) -> Result<Value, AppError> {
        let uid = auth_user.odoo_uid()?;
        Self::read(odoo, id).await?;

        let mut values = Map::new();
        values.insert("discussion_id".into(), json!(id));
        values.insert("content".into(), json!(dto.content));
        values.insert("author_id".into(), json!(uid));
        if let Some(parent_id) = dto.parent_id {
            values.insert("parent_id".into(), json!(parent_id));
        }

        let reply_id = UserOrm::new(odoo, auth_user)
            .create(REPLY_MODEL, Value::Object(values))
            .await
            .context("Failed to create reply")?;
        let reply = odoo
            .read_one(REPLY_MODEL, reply_id, REPLY_FIELDS)
            .await
            .context("Failed to fetch reply")?
            .ok_or_else(|| AppError::internal(anyhow!("Failed to fetch reply")))?;
        Ok(present(reply, Some(uid)))
    }

    /// Toggle the user's upvote.
    #[instrument(skip(odoo, auth_user))]
    pub async fn upvote(odoo: &OdooClient, auth_user: &AuthUser, id: i64) -> Result<UpvoteResult, AppError> {
        let uid = auth_user.odoo_uid()?;
        let before = Self::read(odoo, id).await?;

        let orm = UserOrm::new(odoo, auth_user);
        if orm.acts_as_user() {
            orm.call_method(DISCUSSION_MODEL, "action_upvote", &[id])
                .await
                .context("Failed to upvote discussion")?;
        } else {
            // The service account is not the voter, so toggle the relation directly.
            let command = if contains_id(&before, "upvote_ids", Some(uid)) { 3 } else { 4 };
            odoo.write(DISCUSSION_MODEL, &[id], json!({ "upvote_ids": [[command, uid]] }))
                .await
                .context("Failed to upvote discussion")?;
        }

        let after = odoo
            .read_one(DISCUSSION_MODEL, id, &["upvote_count", "upvote_ids"])
            .await
            .context("Failed to upvote discussion")?
            .unwrap_or(Value::Null);
        Ok(UpvoteResult {
            upvote_count: fields::i64_field(&after, "upvote_count"),
            has_upvoted: contains_id(&after, "upvote_ids", Some(uid)),
        })
    }

    async fn read(odoo: &OdooClient, id: i64) -> Result<Value, AppError> {
        odoo.read_one(DISCUSSION_MODEL, id, DISCUSSION_FIELDS)
            .await
            .context("Failed to fetch discussion")?
            .ok_or_else(|| AppError::not_found(anyhow!("Discussion not found")))
    }

    async fn ensure_author(odoo: &OdooClient, uid: i64, id: i64) -> Result<(), AppError> {
        let record = odoo
            .read_one(DISCUSSION_MODEL, id, &["author_id"])
            .await
            .context("Failed to fetch discussion")?
            .ok_or_else(|| AppError::not_found(anyhow!("Discussion not found")))?;
        if fields::many2one_id(&record, "author_id") != Some(uid) {
            return Err(AppError::forbidden("Only the author can modify this discussion"));
        }
        Ok(())
    }
}
