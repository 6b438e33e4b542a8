use anyhow::{Context, anyhow};
use chrono::Utc;
use serde_json::{Map, Value, json};
use tracing::instrument;

use seitech_core::PaginationParams;
use seitech_odoo::{Domain, OdooClient, SearchRead, fields};

use crate::modules::notifications::model::{
    CreateNotificationRequest, NOTIFICATION_FIELDS, NOTIFICATION_MODEL, Notification,
    NotificationPage, NotificationQuery,
};
use crate::utils::errors::AppError;

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

pub struct NotificationService;

impl NotificationService {
    #[instrument(skip(odoo))]
    pub async fn list(
        odoo: &OdooClient,
        user_id: i64,
        query: NotificationQuery,
    ) -> Result<NotificationPage, AppError> {
        let window = PaginationParams::new(query.page, query.per_page).window(DEFAULT_PER_PAGE, MAX_PER_PAGE);
        let domain = Domain::new()
            .eq("user_id", user_id)
            .when(query.unread_only.unwrap_or(false), |d| d.eq("read", false));

        let (total, unread_count, records) = tokio::try_join!(
            odoo.search_count(NOTIFICATION_MODEL, domain.clone()),
            odoo.search_count(
                NOTIFICATION_MODEL,
                Domain::new().eq("user_id", user_id).eq("read", false)
            ),
            odoo.search_read(
                NOTIFICATION_MODEL,
                SearchRead::new(domain)
                    .fields(NOTIFICATION_FIELDS)
                    .offset(window.offset)
                    .limit(window.limit)
                    .order("create_date desc"),
            ),
        )
        .context("Failed to fetch notifications")?;

        let notifications = records.iter().map(Notification::from_record).collect();
        Ok(NotificationPage::new(
            notifications,
            total,
            window.page,
            window.limit,
            unread_count,
        ))
    }

    #[instrument(skip(odoo, dto))]
    pub async fn create(
        odoo: &OdooClient,
        user_id: i64,
        dto: CreateNotificationRequest,
    ) -> Result<i64, AppError> {
        let mut values = Map::new();
        values.insert("user_id".into(), json!(user_id));
        values.insert("notification_type".into(), json!(dto.notification_type));
        values.insert("title".into(), json!(dto.title));
        values.insert("message".into(), json!(dto.message));
        values.insert("read".into(), json!(false));
        if let Some(link) = dto.link.filter(|l| !l.is_empty()) {
            values.insert("link".into(), json!(link));
        }
        if let Some(data) = dto.data.filter(|d| !d.is_null()) {
            values.insert("data".into(), json!(data.to_string()));
        }
        for (field, id) in [
            ("related_discussion_id", dto.related_discussion_id),
            ("related_study_group_id", dto.related_study_group_id),
            ("related_user_id", dto.related_user_id),
        ] {
            if let Some(id) = id {
                values.insert(field.into(), json!(id));
            }
        }

        let id = odoo
            .create(NOTIFICATION_MODEL, Value::Object(values))
            .await
            .context("Failed to create notification")?;
        Ok(id)
    }

    /// The notification, when it belongs to `user_id`.
    #[instrument(skip(odoo))]
    pub async fn get_owned(odoo: &OdooClient, user_id: i64, id: i64) -> Result<Notification, AppError> {
        let records = odoo
            .search_read(
                NOTIFICATION_MODEL,
                SearchRead::new(Domain::new().eq("id", id).eq("user_id", user_id))
                    .fields(NOTIFICATION_FIELDS)
                    .limit(1),
            )
            .await
            .context("Failed to fetch notification")?;

        records
            .first()
            .map(Notification::from_record)
            .ok_or_else(|| AppError::not_found(anyhow!("Notification not found")))
    }

    #[instrument(skip(odoo))]
    pub async fn delete(odoo: &OdooClient, user_id: i64, id: i64) -> Result<(), AppError> {
        Self::get_owned(odoo, user_id, id).await?;
        odoo.unlink(NOTIFICATION_MODEL, &[id])
            .await
            .context("Failed to delete notification")?;
        Ok(())
    }

    #[instrument(skip(odoo))]
    pub async fn mark_read(odoo: &OdooClient, user_id: i64, id: i64) -> Result<(), AppError> {
        Self::get_owned(odoo, user_id, id).await?;
        odoo.write(NOTIFICATION_MODEL, &[id], read_values())
            .await
            .context("Failed to mark notification as read")?;
        Ok(())
    }

    /// Mark every unread notification of the user; returns how many.
    #[instrument(skip(odoo))]
    pub async fn mark_all_read(odoo: &OdooClient, user_id: i64) -> Result<usize, AppError> {
        let unread = odoo
            .search_read(
                NOTIFICATION_MODEL,
                SearchRead::new(Domain::new().eq("user_id", user_id).eq("read", false)).fields(&["id"]),
            )
            .await
            .context("Failed to mark all notifications as read")?;

        let ids: Vec<i64> = unread
            .iter()
            .filter_map(|record| record.get("id").and_then(Value::as_i64))
            .collect();
        if ids.is_empty() {
            return Ok(0);
        }

        odoo.write(NOTIFICATION_MODEL, &ids, read_values())
            .await
            .context("Failed to mark all notifications as read")?;
        Ok(ids.len())
    }
}

fn read_values() -> Value {
    json!({ "read": true, "read_date": fields::format_datetime(Utc::now()) })
}
