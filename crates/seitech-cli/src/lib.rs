//! # SEI Tech CLI
//!
//! Operator commands used by the `seitech-cli` binary:
//!
//! - [`check_odoo`]: check the ERP is reachable and log in with the service account
//! - [`hash_password`]: bcrypt hash for a demo account password
//! - [`issue_token`]: mint a session token for local testing
//! - [`flush_cms_cache`]: drop cached CMS payloads from Redis

use anyhow::{Context, Result, bail};
use serde_json::{Value, json};

use seitech_auth::{SessionIdentity, create_session_token};
use seitech_cache::{CacheConfig, RedisCache, keys};
use seitech_config::{OdooConfig, SessionConfig};
use seitech_core::permissions::Role;
use seitech_odoo::{Domain, OdooClient};

/// Result of an ERP connectivity check.
#[derive(Debug, Clone, PartialEq)]
pub struct OdooReport {
    pub url: String,
    pub database: String,
    pub reachable: bool,
    pub service_login: bool,
    pub published_courses: Option<i64>,
}

impl OdooReport {
    pub fn to_json(&self) -> Value {
        json!({
            "url": self.url,
            "database": self.database,
            "reachable": self.reachable,
            "serviceLogin": self.service_login,
            "publishedCourses": self.published_courses,
        })
    }
}

pub async fn check_odoo(config: OdooConfig) -> Result<OdooReport> {
    let url = config.url.clone();
    let database = config.database.clone();
    let client = OdooClient::new(config).context("Failed to build ERP client")?;

    let reachable = client.is_reachable().await;
    if !reachable {
        return Ok(OdooReport {
            url,
            database,
            reachable,
            service_login: false,
            published_courses: None,
        });
    }

    let service_login = client.service_session_id().await.is_ok();
    let published_courses = if service_login {
        client
            .search_count("slide.channel", Domain::new().eq("website_published", true))
            .await
            .ok()
    } else {
        None
    };

    Ok(OdooReport {
        url,
        database,
        reachable,
        service_login,
        published_courses,
    })
}

pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    if password.len() < 8 {
        bail!("Password must be at least 8 characters");
    }
    bcrypt::hash(password, cost).context("Failed to hash password")
}

/// Sign a session token for a demo identity with the given role.
pub fn issue_token(email: &str, role: &str, config: &SessionConfig) -> Result<String> {
    let role = Role::parse(role);
    let name = email.split('@').next().unwrap_or(email).to_string();
    let identity = SessionIdentity {
        user_id: format!("demo_{}", role.as_str()),
        partner_id: None,
        email: email.to_string(),
        name,
        role,
        avatar: None,
        odoo_session: None,
        demo: true,
    };
    create_session_token(identity, config).context("Failed to sign session token")
}

/// Returns the number of deleted keys, or `None` when Redis is not configured.
pub async fn flush_cms_cache(config: &CacheConfig) -> Result<Option<u64>> {
    let Some(cache) = RedisCache::connect(config).await else {
        return Ok(None);
    };
    let deleted = cache
        .purge(&keys::cms::invalidation_pattern(&config.key_prefix))
        .await
        .context("Failed to invalidate CMS keys")?;
    Ok(Some(deleted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use seitech_auth::verify_session_token;

    fn session_config() -> SessionConfig {
        SessionConfig {
            secret: "cli-test-secret".into(),
            max_age_secs: 3600,
            secure_cookies: false,
        }
    }

    #[test]
    fn test_hash_password_verifies() {
        let hash = hash_password("demo1234", 4).unwrap();
        assert!(bcrypt::verify("demo1234", &hash).unwrap());
    }

    #[test]
    fn test_hash_password_rejects_short() {
        assert!(hash_password("short", 4).is_err());
    }

    #[test]
    fn test_issue_token() {
        let config = session_config();
        let token = issue_token("manager@seitech.co.uk", "manager", &config).unwrap();
        let claims = verify_session_token(&token, &config).unwrap();
        assert_eq!(claims.role, Role::Manager);
        assert!(claims.demo);
        assert_eq!(claims.name, "manager");
    }

    #[tokio::test]
    async fn test_check_unreachable_odoo() {
        let report = check_odoo(OdooConfig::for_url("http://127.0.0.1:9")).await.unwrap();
        assert!(!report.reachable);
        assert_eq!(report.to_json()["publishedCourses"], Value::Null);
    }

    #[tokio::test]
    async fn test_flush_without_redis() {
        assert_eq!(flush_cms_cache(&CacheConfig::disabled()).await.unwrap(), None);
    }
}
