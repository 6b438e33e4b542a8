//! In-memory stores backing demo mode.
//!
//! When the ERP cannot be reached, logins are checked against a small set of
//! seeded demo accounts and enrollments are kept per email address. Nothing
//! here survives a restart.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::warn;
use utoipa::ToSchema;

use seitech_core::permissions::Role;

/// bcrypt cost for demo account hashes.
pub const DEMO_HASH_COST: u32 = 6;

#[derive(Debug, Clone)]
pub struct DemoUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DemoEnrollment {
    pub id: i64,
    pub course_id: i64,
    pub course_name: String,
    pub course_slug: String,
    pub course_image: String,
    pub user_id: String,
    pub state: String,
    pub progress: f64,
    pub enrollment_date: String,
    pub total_time_spent: i64,
}

#[derive(Clone, Debug, Default)]
pub struct DemoStore {
    users: Arc<RwLock<HashMap<String, DemoUser>>>,
    enrollments: Arc<RwLock<HashMap<String, Vec<DemoEnrollment>>>>,
}

const SEEDED_ACCOUNTS: &[(&str, &str, Role)] = &[
    ("admin@seitech.co.uk", "Demo Admin", Role::Admin),
    ("manager@seitech.co.uk", "Demo Manager", Role::Manager),
    ("instructor@seitech.co.uk", "Demo Instructor", Role::Instructor),
    ("student@seitech.co.uk", "Demo Student", Role::Student),
];

impl DemoStore {
    /// Store holding the four seeded accounts, all sharing `password`.
    pub fn seeded(password: &str) -> Self {
        let users = match bcrypt::hash(password, DEMO_HASH_COST) {
            Ok(hash) => SEEDED_ACCOUNTS
                .iter()
                .map(|(email, name, role)| {
                    let user = DemoUser {
                        id: format!("demo_{}", role.as_str()),
                        email: email.to_string(),
                        name: name.to_string(),
                        role: *role,
                        password_hash: hash.clone(),
                    };
                    (email.to_string(), user)
                })
                .collect(),
            Err(e) => {
                warn!(error = %e, "Failed to hash demo password, demo accounts disabled");
                HashMap::new()
            }
        };

        Self {
            users: Arc::new(RwLock::new(users)),
            enrollments: Arc::default(),
        }
    }

    /// The account for `email` when `password` matches its hash.
    pub async fn verify(&self, email: &str, password: &str) -> Option<DemoUser> {
        let user = self.users.read().await.get(&email.to_lowercase()).cloned()?;
        bcrypt::verify(password, &user.password_hash)
            .ok()
            .filter(|valid| *valid)
            .map(|_| user)
    }

    /// Register a student account. Returns `None` when the email is taken.
    pub async fn register(&self, email: &str, name: &str, password: &str) -> Option<DemoUser> {
        let email = email.to_lowercase();
        let password_hash = bcrypt::hash(password, DEMO_HASH_COST).ok()?;

        let mut users = self.users.write().await;
        if users.contains_key(&email) {
            return None;
        }
        let user = DemoUser {
            id: format!("demo_{}", users.len() + 1),
            email: email.clone(),
            name: name.to_string(),
            role: Role::Student,
            password_hash,
        };
        users.insert(email, user.clone());
        Some(user)
    }

    pub async fn enrollments(&self, email: &str) -> Vec<DemoEnrollment> {
        self.enrollments
            .read()
            .await
            .get(&email.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    /// Record an enrollment; `None` when the user is already enrolled.
    pub async fn enroll(
        &self,
        email: &str,
        user_id: &str,
        course_id: i64,
        course_name: Option<String>,
        course_slug: Option<String>,
        course_image: Option<String>,
    ) -> Option<DemoEnrollment> {
        let mut enrollments = self.enrollments.write().await;
        let list = enrollments.entry(email.to_lowercase()).or_default();
        if list.iter().any(|e| e.course_id == course_id) {
            return None;
        }

        let now = Utc::now();
        let enrollment = DemoEnrollment {
            id: now.timestamp_millis(),
            course_id,
            course_name: course_name.unwrap_or_else(|| format!("Course {course_id}")),
            course_slug: course_slug.unwrap_or_else(|| format!("course-{course_id}")),
            course_image: course_image.unwrap_or_default(),
            user_id: user_id.to_string(),
            state: "active".into(),
            progress: 0.0,
            enrollment_date: now.to_rfc3339(),
            total_time_spent: 0,
        };
        list.push(enrollment.clone());
        Some(enrollment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_accounts_verify() {
        let store = DemoStore::seeded("demo1234");
        let admin = store.verify("Admin@SEITECH.co.uk", "demo1234").await.unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.id, "demo_admin");
        assert!(store.verify("admin@seitech.co.uk", "wrong").await.is_none());
        assert!(store.verify("nobody@seitech.co.uk", "demo1234").await.is_none());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let store = DemoStore::seeded("demo1234");
        let user = store.register("new@example.com", "New Learner", "password1").await.unwrap();
        assert_eq!(user.role, Role::Student);
        assert!(store.verify("new@example.com", "password1").await.is_some());
        assert!(store.register("student@seitech.co.uk", "Dup", "password1").await.is_none());
    }

    #[tokio::test]
    async fn test_enroll_once_per_course() {
        let store = DemoStore::default();
        let first = store
            .enroll("a@b.c", "demo_student", 4, Some("Fire Safety".into()), None, None)
            .await
            .unwrap();
        assert_eq!(first.course_slug, "course-4");
        assert!(store.enroll("A@B.C", "demo_student", 4, None, None, None).await.is_none());
        assert_eq!(store.enrollments("a@b.c").await.len(), 1);
    }
}
