use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnrollmentRequest {
    #[validate(range(min = 1))]
    pub course_id: i64,
    /// Display fields kept with demo enrollments
    pub course_name: Option<String>,
    pub course_slug: Option<String>,
    pub course_image: Option<String>,
}
