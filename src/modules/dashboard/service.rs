use std::collections::HashMap;

use anyhow::Context;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use seitech_odoo::{BatchClient, Domain, SearchRead, fields};

use crate::modules::dashboard::model::{DashboardCertificate, DashboardData, DashboardEnrollment};
use crate::utils::errors::AppError;

const ENROLLMENT_FIELDS: &[&str] = &[
    "id",
    "channel_id",
    "completion",
    "create_date",
    "expiration_date",
    "completed_date",
    "last_access_date",
    "total_time",
    "certificate_id",
];

const CERTIFICATE_FIELDS: &[&str] = &[
    "id",
    "reference",
    "channel_id",
    "issue_date",
    "expiry_date",
    "template_id",
    "qr_code",
];

const GAMIFICATION_FIELDS: &[&str] = &[
    "total_points",
    "current_streak",
    "longest_streak",
    "student_badge_count",
];

pub struct DashboardService;

impl DashboardService {
    /// Dashboard of an ERP user. Independent lookups go through the batch
    /// queue together.
    #[instrument(skip(batch, odoo_url))]
    pub async fn load(
        batch: &BatchClient,
        odoo_url: &str,
        user_id: i64,
        partner_id: i64,
    ) -> Result<DashboardData, AppError> {
        let (enrollments, certificates, users) = tokio::join!(
            batch.search_read(
                "slide.channel.partner",
                SearchRead::new(Domain::new().eq("partner_id", partner_id))
                    .fields(ENROLLMENT_FIELDS)
                    .order("create_date desc")
                    .limit(10),
            ),
            batch.search_read(
                "slide.channel.certificate",
                SearchRead::new(
                    Domain::new()
                        .eq("partner_id", partner_id)
                        .eq("state", "done"),
                )
                .fields(CERTIFICATE_FIELDS)
                .order("issue_date desc")
                .limit(5),
            ),
            batch.search_read(
                "res.users",
                SearchRead::new(Domain::new().eq("id", user_id))
                    .fields(GAMIFICATION_FIELDS)
                    .limit(1),
            ),
        );
        let enrollments = enrollments.context("Failed to load enrollments")?;
        let certificates = certificates.context("Failed to load certificates")?;

        let course_ids: Vec<i64> = enrollments
            .iter()
            .chain(certificates.iter())
            .filter_map(|record| fields::many2one_id(record, "channel_id"))
            .collect();
        let courses = if course_ids.is_empty() {
            HashMap::new()
        } else {
            batch
                .search_read(
                    "slide.channel",
                    SearchRead::new(Domain::new().in_("id", course_ids))
                        .fields(&["id", "name", "website_slug", "image_512"]),
                )
                .await
                .context("Failed to load courses")?
                .into_iter()
                .map(|course| (fields::i64_field(&course, "id"), course))
                .collect::<HashMap<i64, Value>>()
        };

        let course_of = |record: &Value| {
            fields::many2one_id(record, "channel_id").and_then(|id| courses.get(&id))
        };

        let now = chrono::Utc::now();
        let enrollments: Vec<_> = enrollments
            .iter()
            .map(|record| DashboardEnrollment::build(record, course_of(record), user_id, now))
            .collect();
        let certificates: Vec<_> = certificates
            .iter()
            .map(|record| DashboardCertificate::build(record, course_of(record), odoo_url))
            .collect();

        let gamification = match users {
            Ok(users) => users.into_iter().next().unwrap_or(Value::Null),
            Err(e) => {
                debug!(error = %e, "Gamification fields not available");
                Value::Null
            }
        };

        let mut badges = fields::i64_field(&gamification, "student_badge_count");
        if badges == 0 {
            badges = batch
                .search_count(
                    "seitech.student.badge",
                    Domain::new().eq("user_id", user_id),
                )
                .await
                .unwrap_or_else(|e| {
                    warn!(error = %e, "Failed to count badges");
                    0
                });
        }

        Ok(DashboardData::assemble(
            enrollments,
            certificates,
            fields::i64_field(&gamification, "total_points"),
            badges,
            fields::i64_field(&gamification, "current_streak"),
            fields::i64_field(&gamification, "longest_streak"),
        ))
    }
}
