//! ERP connection settings.
//!
//! # Environment Variables
//!
//! - `NEXT_PUBLIC_ODOO_URL` or `ODOO_URL`: Base URL (default `http://localhost:8069`)
//! - `ODOO_DATABASE`: Database name (default `odoo`)
//! - `ODOO_ADMIN_USER` / `ODOO_ADMIN_PASSWORD`: Service account used for
//!   server-side ORM calls (default `admin` / `admin`)
//! - `ODOO_TIMEOUT_SECS`: Per-request timeout (default `30`)
//! - `ODOO_SESSION_TTL_SECS`: How long a service session is reused (default `1800`)

use std::env;
use std::time::Duration;

use crate::env_or;

#[derive(Clone, Debug)]
pub struct OdooConfig {
    pub url: String,
    pub database: String,
    pub admin_user: String,
    pub admin_password: String,
    pub timeout: Duration,
    pub session_ttl: Duration,
}

impl OdooConfig {
    pub fn from_env() -> Self {
        let url = env::var("NEXT_PUBLIC_ODOO_URL")
            .or_else(|_| env::var("ODOO_URL"))
            .unwrap_or_else(|_| "http://localhost:8069".into());

        Self {
            url: url.trim_end_matches('/').to_string(),
            database: env::var("ODOO_DATABASE").unwrap_or_else(|_| "odoo".into()),
            admin_user: env::var("ODOO_ADMIN_USER").unwrap_or_else(|_| "admin".into()),
            admin_password: env::var("ODOO_ADMIN_PASSWORD").unwrap_or_else(|_| "admin".into()),
            timeout: Duration::from_secs(env_or("ODOO_TIMEOUT_SECS", 30)),
            session_ttl: Duration::from_secs(env_or("ODOO_SESSION_TTL_SECS", 1800)),
        }
    }

    /// Configuration pointing at an explicit base URL, used by tests and the CLI.
    pub fn for_url(url: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            database: "odoo".into(),
            admin_user: "admin".into(),
            admin_password: "admin".into(),
            timeout: Duration::from_secs(5),
            session_ttl: Duration::from_secs(1800),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_url_trims_trailing_slash() {
        let config = OdooConfig::for_url("http://erp.local:8069/");
        assert_eq!(config.url, "http://erp.local:8069");
        assert_eq!(
            config.endpoint("/web/dataset/call_kw"),
            "http://erp.local:8069/web/dataset/call_kw"
        );
    }
}
