use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use seitech_core::PageMeta;
use seitech_core::serde::{deserialize_optional_bool, deserialize_optional_i64, deserialize_optional_string};
use seitech_core::text::slugify;
use seitech_odoo::fields;

pub const SCHEDULE_MODEL: &str = "seitech.schedule";
pub const ATTENDEE_MODEL: &str = "seitech.schedule.attendee";
pub const INSTRUCTOR_MODEL: &str = "seitech.instructor";

pub const LIST_FIELDS: &[&str] = &[
    "id",
    "name",
    "channel_id",
    "instructor_id",
    "start_datetime",
    "end_datetime",
    "duration",
    "timezone",
    "meeting_type",
    "location",
    "max_attendees",
    "attendee_count",
    "registration_required",
    "registration_deadline",
    "state",
];

pub const DETAIL_FIELDS: &[&str] = &[
    "id",
    "name",
    "channel_id",
    "slide_id",
    "instructor_id",
    "start_datetime",
    "end_datetime",
    "duration",
    "timezone",
    "meeting_type",
    "meeting_url",
    "meeting_id",
    "meeting_password",
    "location",
    "description",
    "max_attendees",
    "attendee_count",
    "registration_required",
    "registration_deadline",
    "state",
    "has_recording",
    "recording_url",
    "create_date",
    "write_date",
];

pub const REGISTRATION_FIELDS: &[&str] = &[
    "id",
    "name",
    "state",
    "max_attendees",
    "attendee_count",
    "registration_deadline",
    "start_datetime",
];

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleQuery {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Defaults to 12, at most 100
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub course_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub instructor_id: Option<i64>,
    /// zoom, teams, meet, jitsi, custom or in_person
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub meeting_type: Option<String>,
    /// Earliest start, as an ERP datetime or date
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    /// Only future scheduled sessions; defaults to true
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub upcoming: Option<bool>,
}

/// Remaining seats, or -1 when the session is uncapped.
pub fn available_spots(max_attendees: i64, attendee_count: i64) -> i64 {
    if max_attendees == 0 {
        -1
    } else {
        (max_attendees - attendee_count).max(0)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleListItem {
    pub id: i64,
    pub name: String,
    pub course_id: i64,
    pub course_name: String,
    pub course_slug: Option<String>,
    pub instructor_id: i64,
    pub instructor_name: String,
    pub instructor_image_url: Option<String>,
    pub start_datetime: Option<String>,
    pub end_datetime: Option<String>,
    pub duration: f64,
    pub meeting_type: Option<String>,
    pub location: Option<String>,
    pub max_attendees: i64,
    pub attendee_count: i64,
    pub available_spots: i64,
    pub registration_required: bool,
    pub registration_deadline: Option<String>,
    pub state: String,
}

impl ScheduleListItem {
    pub fn from_record(record: &Value, course_names: &HashMap<i64, String>, instructor_images: &HashMap<i64, String>) -> Self {
        let course_id = fields::many2one_id(record, "channel_id").unwrap_or_default();
        let instructor_id = fields::many2one_id(record, "instructor_id").unwrap_or_default();
        let max_attendees = fields::i64_field(record, "max_attendees");
        let attendee_count = fields::i64_field(record, "attendee_count");

        Self {
            id: fields::i64_field(record, "id"),
            name: fields::string_or_empty(record, "name"),
            course_id,
            course_name: fields::many2one_name(record, "channel_id").unwrap_or_default(),
            course_slug: course_names
                .get(&course_id)
                .map(|name| slugify(name))
                .filter(|slug| !slug.is_empty()),
            instructor_id,
            instructor_name: fields::many2one_name(record, "instructor_id").unwrap_or_default(),
            instructor_image_url: instructor_images.get(&instructor_id).cloned(),
            start_datetime: fields::string(record, "start_datetime"),
            end_datetime: fields::string(record, "end_datetime"),
            duration: fields::f64_field(record, "duration"),
            meeting_type: fields::string(record, "meeting_type"),
            location: fields::string(record, "location"),
            max_attendees,
            attendee_count,
            available_spots: available_spots(max_attendees, attendee_count),
            registration_required: fields::bool_field(record, "registration_required"),
            registration_deadline: fields::string(record, "registration_deadline"),
            state: fields::string_or_empty(record, "state"),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleList {
    pub schedules: Vec<ScheduleListItem>,
    pub pagination: PageMeta,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleCourse {
    pub id: i64,
    pub name: String,
    pub slug: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl ScheduleCourse {
    pub fn from_record(record: &Value) -> Self {
        let name = fields::string_or_empty(record, "name");
        Self {
            id: fields::i64_field(record, "id"),
            slug: Some(slugify(&name)).filter(|slug| !slug.is_empty()),
            name,
            thumbnail_url: fields::image_data_url(record, "image_512"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInstructor {
    pub id: i64,
    pub name: String,
    pub title: Option<String>,
    pub short_bio: Option<String>,
    pub image_url: Option<String>,
}

impl ScheduleInstructor {
    pub fn from_record(record: &Value) -> Self {
        Self {
            id: fields::i64_field(record, "id"),
            name: fields::string_or_empty(record, "name"),
            title: fields::string(record, "title"),
            short_bio: fields::string(record, "short_bio"),
            image_url: fields::image_data_url(record, "image"),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDetail {
    pub id: i64,
    pub name: String,
    pub course: ScheduleCourse,
    pub instructor: ScheduleInstructor,
    pub start_datetime: Option<String>,
    pub end_datetime: Option<String>,
    pub duration: f64,
    pub timezone: String,
    pub meeting_type: Option<String>,
    pub meeting_url: Option<String>,
    pub meeting_id: Option<String>,
    pub meeting_password: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub max_attendees: i64,
    pub attendee_count: i64,
    pub available_spots: i64,
    pub registration_required: bool,
    pub registration_deadline: Option<String>,
    pub state: String,
    pub has_recording: bool,
    pub recording_url: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl ScheduleDetail {
    pub fn from_record(record: &Value, course: ScheduleCourse, instructor: ScheduleInstructor) -> Self {
        let max_attendees = fields::i64_field(record, "max_attendees");
        let attendee_count = fields::i64_field(record, "attendee_count");
        Self {
            id: fields::i64_field(record, "id"),
            name: fields::string_or_empty(record, "name"),
            course,
            instructor,
            start_datetime: fields::string(record, "start_datetime"),
            end_datetime: fields::string(record, "end_datetime"),
            duration: fields::f64_field(record, "duration"),
            timezone: fields::string(record, "timezone").unwrap_or_else(|| "UTC".into()),
            meeting_type: fields::string(record, "meeting_type"),
            meeting_url: fields::string(record, "meeting_url"),
            meeting_id: fields::string(record, "meeting_id"),
            meeting_password: fields::string(record, "meeting_password"),
            location: fields::string(record, "location"),
            description: fields::string(record, "description"),
            max_attendees,
            attendee_count,
            available_spots: available_spots(max_attendees, attendee_count),
            registration_required: fields::bool_field(record, "registration_required"),
            registration_deadline: fields::string(record, "registration_deadline"),
            state: fields::string_or_empty(record, "state"),
            has_recording: fields::bool_field(record, "has_recording"),
            recording_url: fields::string(record, "recording_url"),
            created_at: fields::string(record, "create_date"),
            updated_at: fields::string(record, "write_date"),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RegistrationRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub id: i64,
    pub schedule_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub state: String,
    pub registration_date: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegistrationResult {
    pub attendee: Attendee,
}

/// Why a session cannot take a registration at `now`, checked in order:
/// state, deadline, capacity, start time.
pub fn registration_block(schedule: &Value, now: DateTime<Utc>) -> Option<&'static str> {
    if fields::string(schedule, "state").as_deref() != Some("scheduled") {
        return Some("This session is not open for registration");
    }
    if fields::datetime_field(schedule, "registration_deadline").is_some_and(|deadline| now > deadline) {
        return Some("Registration deadline has passed");
    }
    let max_attendees = fields::i64_field(schedule, "max_attendees");
    if max_attendees > 0 && fields::i64_field(schedule, "attendee_count") >= max_attendees {
        return Some("This session is fully booked");
    }
    if fields::datetime_field(schedule, "start_datetime").is_some_and(|start| now >= start) {
        return Some("This session has already started");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap()
    }

    fn open_session() -> Value {
        json!({
            "id": 5,
            "state": "scheduled",
            "max_attendees": 10,
            "attendee_count": 4,
            "registration_deadline": "2026-06-10 17:00:00",
            "start_datetime": "2026-06-12 09:00:00",
        })
    }

    #[test]
    fn test_available_spots() {
        assert_eq!(available_spots(0, 7), -1);
        assert_eq!(available_spots(10, 4), 6);
        assert_eq!(available_spots(10, 12), 0);
    }

    #[test]
    fn test_open_session_accepts_registration() {
        assert_eq!(registration_block(&open_session(), now()), None);

        let mut uncapped = open_session();
        uncapped["max_attendees"] = json!(0);
        uncapped["attendee_count"] = json!(500);
        uncapped["registration_deadline"] = json!(false);
        assert_eq!(registration_block(&uncapped, now()), None);
    }

    #[test]
    fn test_registration_blocks_in_order() {
        let mut session = open_session();
        session["state"] = json!("draft");
        session["attendee_count"] = json!(10);
        assert_eq!(
            registration_block(&session, now()),
            Some("This session is not open for registration")
        );

        let mut session = open_session();
        session["registration_deadline"] = json!("2026-05-31 12:00:00");
        assert_eq!(registration_block(&session, now()), Some("Registration deadline has passed"));

        let mut session = open_session();
        session["attendee_count"] = json!(10);
        assert_eq!(registration_block(&session, now()), Some("This session is fully booked"));

        let mut session = open_session();
        session["registration_deadline"] = json!(false);
        session["start_datetime"] = json!("2026-06-01 09:00:00");
        assert_eq!(registration_block(&session, now()), Some("This session has already started"));
    }

    #[test]
    fn test_list_item_slug_and_spots() {
        let record = json!({
            "id": 3,
            "name": "IOSH Managing Safely - June",
            "channel_id": [12, "IOSH Managing Safely"],
            "instructor_id": [2, "Dana Reid"],
            "start_datetime": "2026-06-12 09:00:00",
            "max_attendees": 0,
            "attendee_count": 3,
            "location": false,
            "state": "scheduled",
        });
        let courses = HashMap::from([(12, "IOSH Managing Safely".to_string())]);
        let item = ScheduleListItem::from_record(&record, &courses, &HashMap::new());
        assert_eq!(item.course_slug.as_deref(), Some("iosh-managing-safely"));
        assert_eq!(item.available_spots, -1);
        assert_eq!(item.instructor_name, "Dana Reid");
        assert_eq!(item.location, None);
        assert_eq!(item.instructor_image_url, None);
    }
}
