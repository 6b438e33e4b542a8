use std::collections::{BTreeSet, HashMap};

use anyhow::{Context, anyhow};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::{info, instrument};

use seitech_core::{PageMeta, PaginationParams};
use seitech_odoo::{Domain, OdooClient, SearchRead, fields};

use crate::modules::courses::COURSE_MODEL;
use crate::modules::schedules::model::{
    ATTENDEE_MODEL, Attendee, DETAIL_FIELDS, INSTRUCTOR_MODEL, LIST_FIELDS, REGISTRATION_FIELDS,
    RegistrationRequest, RegistrationResult, SCHEDULE_MODEL, ScheduleCourse, ScheduleDetail,
    ScheduleInstructor, ScheduleList, ScheduleListItem, ScheduleQuery, registration_block,
};
use crate::utils::errors::AppError;

const DEFAULT_LIMIT: i64 = 12;
const MAX_LIMIT: i64 = 100;

pub struct ScheduleService;

impl ScheduleService {
    #[instrument(skip(odoo))]
    pub async fn list(odoo: &OdooClient, query: ScheduleQuery) -> Result<ScheduleList, AppError> {
        let window = PaginationParams::new(query.page, query.limit).window(DEFAULT_LIMIT, MAX_LIMIT);
        let upcoming = query.upcoming.unwrap_or(true);

        let domain = match query.state {
            Some(state) => Domain::new().eq("state", state),
            None if upcoming => Domain::new().eq("state", "scheduled"),
            None => Domain::new(),
        }
        .when(upcoming, |d| {
            d.gt("start_datetime", fields::format_datetime(Utc::now()))
        })
        .when_some(query.course_id, |d, id| d.eq("channel_id", id))
        .when_some(query.instructor_id, |d, id| d.eq("instructor_id", id))
        .when_some(query.meeting_type, |d, kind| d.eq("meeting_type", kind))
        .when_some(query.start_date, |d, start| d.ge("start_datetime", start))
        .when_some(query.end_date, |d, end| d.le("start_datetime", end))
        .when_some(query.search, |d, term| d.ilike("name", term));

        let (records, total) = tokio::try_join!(
            odoo.search_read(
                SCHEDULE_MODEL,
                SearchRead::new(domain.clone())
                    .fields(LIST_FIELDS)
                    .offset(window.offset)
                    .limit(window.limit)
                    .order("start_datetime asc"),
            ),
            odoo.search_count(SCHEDULE_MODEL, domain),
        )
        .context("Failed to fetch schedules")?;

        let instructor_ids = distinct_ids(&records, "instructor_id");
        let course_ids = distinct_ids(&records, "channel_id");
        let (instructors, courses) = tokio::try_join!(
            odoo.read(INSTRUCTOR_MODEL, &instructor_ids, &["id", "image"]),
            odoo.read(COURSE_MODEL, &course_ids, &["id", "name"]),
        )
        .context("Failed to fetch schedules")?;

        let instructor_images: HashMap<i64, String> = instructors
            .iter()
            .filter_map(|i| Some((i.get("id")?.as_i64()?, fields::image_data_url(i, "image")?)))
            .collect();
        let course_names: HashMap<i64, String> = courses
            .iter()
            .filter_map(|c| Some((c.get("id")?.as_i64()?, fields::string(c, "name")?)))
            .collect();

        Ok(ScheduleList {
            schedules: records
                .iter()
                .map(|r| ScheduleListItem::from_record(r, &course_names, &instructor_images))
                .collect(),
            pagination: PageMeta::new(total, &window),
        })
    }

    #[instrument(skip(odoo))]
    pub async fn get(odoo: &OdooClient, id: i64) -> Result<ScheduleDetail, AppError> {
        let record = odoo
            .read_one(SCHEDULE_MODEL, id, DETAIL_FIELDS)
            .await
            .context("Failed to fetch schedule")?
            .ok_or_else(|| AppError::not_found(anyhow!("Schedule not found")))?;

        let instructor_id = fields::many2one_id(&record, "instructor_id");
        let course_id = fields::many2one_id(&record, "channel_id");
        let (instructor, course) = tokio::try_join!(
            async {
                match instructor_id {
                    Some(id) => odoo
                        .read_one(INSTRUCTOR_MODEL, id, &["id", "name", "title", "short_bio", "image"])
                        .await,
                    None => Ok(None),
                }
            },
            async {
                match course_id {
                    Some(id) => odoo.read_one(COURSE_MODEL, id, &["id", "name", "image_512"]).await,
                    None => Ok(None),
                }
            },
        )
        .context("Failed to fetch schedule")?;

        Ok(ScheduleDetail::from_record(
            &record,
            course.as_ref().map(ScheduleCourse::from_record).unwrap_or_default(),
            instructor
                .as_ref()
                .map(ScheduleInstructor::from_record)
                .unwrap_or_default(),
        ))
    }

    #[instrument(skip(odoo, request))]
    pub async fn register(
        odoo: &OdooClient,
        user_id: i64,
        schedule_id: i64,
        request: RegistrationRequest,
    ) -> Result<RegistrationResult, AppError> {
        let schedule = odoo
            .read_one(SCHEDULE_MODEL, schedule_id, REGISTRATION_FIELDS)
            .await
            .context("Failed to register for session")?
            .ok_or_else(|| AppError::not_found(anyhow!("Schedule not found")))?;

        let now = Utc::now();
        if let Some(reason) = registration_block(&schedule, now) {
            return Err(AppError::bad_request(anyhow!(reason)));
        }

        let existing = odoo
            .search_count(
                ATTENDEE_MODEL,
                Domain::new()
                    .eq("schedule_id", schedule_id)
                    .eq("user_id", user_id)
                    .ne("state", "cancelled"),
            )
            .await
            .context("Failed to register for session")?;
        if existing > 0 {
            return Err(AppError::bad_request(anyhow!(
                "You are already registered for this session"
            )));
        }

        let registration_date = fields::format_datetime(now);
        let mut values = json!({
            "schedule_id": schedule_id,
            "user_id": user_id,
            "state": "registered",
            "registration_date": registration_date,
        });
        if let Some(notes) = request.notes.as_deref().filter(|n| !n.is_empty()) {
            values["notes"] = json!(notes);
        }
        let attendee_id = odoo
            .create(ATTENDEE_MODEL, values)
            .await
            .context("Failed to register for session")?;

        let user = odoo
            .read_one("res.users", user_id, &["name", "email"])
            .await
            .context("Failed to register for session")?
            .unwrap_or(Value::Null);

        info!(schedule_id, attendee_id, "Session registration created");
        Ok(RegistrationResult {
            attendee: Attendee {
                id: attendee_id,
                schedule_id,
                user_id,
                user_name: fields::string_or_empty(&user, "name"),
                user_email: fields::string_or_empty(&user, "email"),
                state: "registered".into(),
                registration_date,
                notes: request.notes,
            },
        })
    }
}

fn distinct_ids(records: &[Value], field: &str) -> Vec<i64> {
    records
        .iter()
        .filter_map(|r| fields::many2one_id(r, field))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
