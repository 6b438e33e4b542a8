use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use seitech_odoo::fields;

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_courses: usize,
    pub completed_courses: usize,
    pub in_progress_courses: usize,
    pub total_certificates: usize,
    pub total_points: i64,
    pub total_badges: i64,
    /// Minutes spent learning
    pub total_time_spent: f64,
    pub current_streak: i64,
    pub longest_streak: i64,
}

impl UserStats {
    /// Figures shown to demo accounts.
    pub fn demo() -> Self {
        Self {
            total_courses: 5,
            completed_courses: 2,
            in_progress_courses: 3,
            total_certificates: 2,
            total_points: 1250,
            total_badges: 8,
            total_time_spent: 3600.0,
            current_streak: 5,
            longest_streak: 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentState {
    Active,
    Pending,
    Completed,
    Expired,
}

/// Completed wins over expired, which wins over never-accessed.
pub fn enrollment_state(record: &Value, now: DateTime<Utc>) -> EnrollmentState {
    if fields::string(record, "completed_date").is_some() {
        EnrollmentState::Completed
    } else if fields::datetime_field(record, "expiration_date").is_some_and(|at| at < now) {
        EnrollmentState::Expired
    } else if fields::string(record, "last_access_date").is_none() {
        EnrollmentState::Pending
    } else {
        EnrollmentState::Active
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardEnrollment {
    pub id: i64,
    pub course_id: i64,
    pub course_name: String,
    pub course_slug: String,
    pub course_image: String,
    pub user_id: i64,
    pub state: EnrollmentState,
    pub progress: f64,
    pub enrollment_date: Option<String>,
    pub expiration_date: Option<String>,
    pub completion_date: Option<String>,
    pub last_access_date: Option<String>,
    pub total_time_spent: f64,
    pub certificate_id: Option<i64>,
    pub certificate_url: Option<String>,
}

impl DashboardEnrollment {
    pub fn build(record: &Value, course: Option<&Value>, user_id: i64, now: DateTime<Utc>) -> Self {
        let certificate_id = fields::many2one_id(record, "certificate_id");
        Self {
            id: fields::i64_field(record, "id"),
            course_id: fields::many2one_id(record, "channel_id").unwrap_or(0),
            course_name: course
                .and_then(|c| fields::string(c, "name"))
                .or_else(|| fields::many2one_name(record, "channel_id"))
                .unwrap_or_default(),
            course_slug: course
                .and_then(|c| fields::string(c, "website_slug"))
                .unwrap_or_default(),
            course_image: course
                .and_then(|c| fields::image_data_url(c, "image_512"))
                .unwrap_or_default(),
            user_id,
            state: enrollment_state(record, now),
            progress: fields::f64_field(record, "completion"),
            enrollment_date: fields::string(record, "create_date"),
            expiration_date: fields::string(record, "expiration_date"),
            completion_date: fields::string(record, "completed_date"),
            last_access_date: fields::string(record, "last_access_date"),
            total_time_spent: fields::f64_field(record, "total_time"),
            certificate_id,
            certificate_url: certificate_id.map(|id| format!("/api/certificates/{id}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCertificate {
    pub id: i64,
    pub reference: String,
    pub course_name: String,
    pub course_slug: String,
    pub issued_date: Option<String>,
    pub expiry_date: Option<String>,
    pub download_url: String,
    pub verification_url: String,
    pub qr_code: String,
    pub template_name: String,
}

impl DashboardCertificate {
    pub fn build(record: &Value, course: Option<&Value>, odoo_url: &str) -> Self {
        let id = fields::i64_field(record, "id");
        let reference =
            fields::string(record, "reference").unwrap_or_else(|| format!("CERT-{id}"));
        Self {
            id,
            course_name: course
                .and_then(|c| fields::string(c, "name"))
                .or_else(|| fields::many2one_name(record, "channel_id"))
                .unwrap_or_default(),
            course_slug: course
                .and_then(|c| fields::string(c, "website_slug"))
                .unwrap_or_default(),
            issued_date: fields::string(record, "issue_date"),
            expiry_date: fields::string(record, "expiry_date"),
            download_url: format!("{odoo_url}/slides/certificate/{id}/download"),
            verification_url: format!("/certificates/verify?ref={reference}"),
            qr_code: fields::image_data_url(record, "qr_code").unwrap_or_default(),
            template_name: fields::many2one_name(record, "template_id")
                .unwrap_or_else(|| "Default Template".to_string()),
            reference,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub stats: UserStats,
    pub recent_enrollments: Vec<DashboardEnrollment>,
    pub recent_certificates: Vec<DashboardCertificate>,
}

impl DashboardData {
    pub fn demo() -> Self {
        Self {
            stats: UserStats::demo(),
            ..Self::default()
        }
    }

    /// Stats are computed over every enrollment; only the first three
    /// unfinished enrollments and the first two certificates are listed.
    pub fn assemble(
        enrollments: Vec<DashboardEnrollment>,
        certificates: Vec<DashboardCertificate>,
        points: i64,
        badges: i64,
        current_streak: i64,
        longest_streak: i64,
    ) -> Self {
        let completed = enrollments
            .iter()
            .filter(|e| e.state == EnrollmentState::Completed)
            .count();
        let in_progress = enrollments
            .iter()
            .filter(|e| matches!(e.state, EnrollmentState::Active | EnrollmentState::Pending))
            .count();

        let stats = UserStats {
            total_courses: enrollments.len(),
            completed_courses: completed,
            in_progress_courses: in_progress,
            total_certificates: certificates.len(),
            total_points: points,
            total_badges: badges,
            total_time_spent: enrollments.iter().map(|e| e.total_time_spent).sum(),
            current_streak,
            longest_streak,
        };

        Self {
            stats,
            recent_enrollments: enrollments
                .into_iter()
                .filter(|e| e.state != EnrollmentState::Completed)
                .take(3)
                .collect(),
            recent_certificates: certificates.into_iter().take(2).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_enrollment_state_precedence() {
        let completed = json!({ "completed_date": "2026-01-01", "expiration_date": "2026-02-01" });
        assert_eq!(enrollment_state(&completed, now()), EnrollmentState::Completed);

        let expired = json!({ "completed_date": false, "expiration_date": "2026-02-01 00:00:00", "last_access_date": "2026-01-15" });
        assert_eq!(enrollment_state(&expired, now()), EnrollmentState::Expired);

        let pending = json!({ "completed_date": false, "expiration_date": false, "last_access_date": false });
        assert_eq!(enrollment_state(&pending, now()), EnrollmentState::Pending);

        let active = json!({ "last_access_date": "2026-05-30 10:00:00", "expiration_date": "2027-01-01" });
        assert_eq!(enrollment_state(&active, now()), EnrollmentState::Active);
    }

    #[test]
    fn test_assemble_counts_and_trims() {
        let record = |id: i64, completed: bool| {
            let completed_date = if completed { json!("2026-01-01") } else { json!(false) };
            json!({
                "id": id,
                "channel_id": [id, format!("Course {id}")],
                "completed_date": completed_date,
                "last_access_date": "2026-05-01",
                "total_time": 30.0,
            })
        };
        let enrollments: Vec<_> = [(1, true), (2, false), (3, false), (4, false), (5, false)]
            .into_iter()
            .map(|(id, done)| DashboardEnrollment::build(&record(id, done), None, 7, now()))
            .collect();

        let data = DashboardData::assemble(enrollments, Vec::new(), 10, 2, 1, 4);
        assert_eq!(data.stats.total_courses, 5);
        assert_eq!(data.stats.completed_courses, 1);
        assert_eq!(data.stats.in_progress_courses, 4);
        assert_eq!(data.stats.total_time_spent, 150.0);
        assert_eq!(data.recent_enrollments.len(), 3);
        assert_eq!(data.recent_enrollments[0].id, 2);
        assert_eq!(data.recent_enrollments[0].course_name, "Course 2");
    }

    #[test]
    fn test_certificate_reference_default() {
        let cert = DashboardCertificate::build(&json!({ "id": 4, "reference": false }), None, "https://erp");
        assert_eq!(cert.reference, "CERT-4");
        assert_eq!(cert.verification_url, "/certificates/verify?ref=CERT-4");
    }

    #[test]
    fn test_demo_stats() {
        let body = serde_json::to_value(DashboardData::demo()).unwrap();
        assert_eq!(body["stats"]["totalPoints"], 1250);
        assert_eq!(body["stats"]["currentStreak"], 5);
        assert!(body["recentEnrollments"].as_array().unwrap().is_empty());
    }
}
