//! Roles and the permissions they grant.
//!
//! Permissions are embedded in the session token at login so that route
//! guards never need a round trip to the ERP.
//!
//! # Example
//!
//! ```ignore
//! use seitech_core::permissions::{self, Role};
//!
//! let perms = Role::Instructor.permissions();
//! assert!(perms.contains(&permissions::COURSES_CREATE));
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Users
pub const USERS_VIEW: &str = "users.view";
pub const USERS_CREATE: &str = "users.create";
pub const USERS_EDIT: &str = "users.edit";
pub const USERS_DELETE: &str = "users.delete";

// Instructors
pub const INSTRUCTORS_VIEW: &str = "instructors.view";
pub const INSTRUCTORS_CREATE: &str = "instructors.create";
pub const INSTRUCTORS_EDIT: &str = "instructors.edit";
pub const INSTRUCTORS_DELETE: &str = "instructors.delete";

// Courses
pub const COURSES_VIEW: &str = "courses.view";
pub const COURSES_CREATE: &str = "courses.create";
pub const COURSES_EDIT: &str = "courses.edit";
pub const COURSES_DELETE: &str = "courses.delete";
pub const COURSES_PUBLISH: &str = "courses.publish";

// Enrollments
pub const ENROLLMENTS_VIEW: &str = "enrollments.view";
pub const ENROLLMENTS_CREATE: &str = "enrollments.create";
pub const ENROLLMENTS_EDIT: &str = "enrollments.edit";
pub const ENROLLMENTS_DELETE: &str = "enrollments.delete";

// Certificates
pub const CERTIFICATES_VIEW: &str = "certificates.view";
pub const CERTIFICATES_ISSUE: &str = "certificates.issue";
pub const CERTIFICATES_REVOKE: &str = "certificates.revoke";

// Analytics and settings
pub const ANALYTICS_VIEW: &str = "analytics.view";
pub const SETTINGS_VIEW: &str = "settings.view";
pub const SETTINGS_EDIT: &str = "settings.edit";

const STUDENT_ADMIN: &[&str] = &[USERS_VIEW, ENROLLMENTS_VIEW];

const INSTRUCTOR: &[&str] = &[
    COURSES_VIEW,
    COURSES_CREATE,
    COURSES_EDIT,
    ENROLLMENTS_VIEW,
    CERTIFICATES_VIEW,
    ANALYTICS_VIEW,
];

const MANAGER: &[&str] = &[
    USERS_VIEW,
    USERS_CREATE,
    USERS_EDIT,
    USERS_DELETE,
    INSTRUCTORS_VIEW,
    INSTRUCTORS_CREATE,
    INSTRUCTORS_EDIT,
    INSTRUCTORS_DELETE,
    COURSES_VIEW,
    COURSES_CREATE,
    COURSES_EDIT,
    COURSES_DELETE,
    COURSES_PUBLISH,
    ENROLLMENTS_VIEW,
    ENROLLMENTS_CREATE,
    ENROLLMENTS_EDIT,
    ENROLLMENTS_DELETE,
    CERTIFICATES_VIEW,
    CERTIFICATES_ISSUE,
    ANALYTICS_VIEW,
];

const ADMIN_EXTRA: &[&str] = &[CERTIFICATES_REVOKE, SETTINGS_VIEW, SETTINGS_EDIT];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    StudentAdmin,
    Instructor,
    Manager,
    Admin,
}

impl Role {
    /// Unknown role names fall back to `Student`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "manager" => Role::Manager,
            "instructor" => Role::Instructor,
            "student_admin" => Role::StudentAdmin,
            _ => Role::Student,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::StudentAdmin => "student_admin",
            Role::Instructor => "instructor",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    pub fn permissions(&self) -> Vec<&'static str> {
        match self {
            Role::Student => Vec::new(),
            Role::StudentAdmin => STUDENT_ADMIN.to_vec(),
            Role::Instructor => INSTRUCTOR.to_vec(),
            Role::Manager => MANAGER.to_vec(),
            Role::Admin => MANAGER.iter().chain(ADMIN_EXTRA).copied().collect(),
        }
    }

    pub fn permission_strings(&self) -> Vec<String> {
        self.permissions().into_iter().map(String::from).collect()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_has_no_permissions() {
        assert!(Role::Student.permissions().is_empty());
    }

    #[test]
    fn test_admin_extends_manager() {
        let manager = Role::Manager.permissions();
        let admin = Role::Admin.permissions();
        assert!(manager.iter().all(|p| admin.contains(p)));
        assert!(admin.contains(&SETTINGS_EDIT));
        assert!(!manager.contains(&CERTIFICATES_REVOKE));
        assert_eq!(admin.len(), manager.len() + 3);
    }

    #[test]
    fn test_instructor_permissions() {
        let perms = Role::Instructor.permissions();
        assert!(perms.contains(&COURSES_CREATE));
        assert!(!perms.contains(&COURSES_DELETE));
        assert!(!perms.contains(&USERS_VIEW));
    }

    #[test]
    fn test_parse_roundtrip_and_default() {
        for role in [
            Role::Student,
            Role::StudentAdmin,
            Role::Instructor,
            Role::Manager,
            Role::Admin,
        ] {
            assert_eq!(Role::parse(role.as_str()), role);
        }
        assert_eq!(Role::parse("portal"), Role::Student);
        assert_eq!(Role::parse(" ADMIN "), Role::Admin);
    }
}
