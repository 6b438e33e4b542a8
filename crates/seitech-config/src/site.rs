//! Public site settings.
//!
//! - `NEXT_PUBLIC_SITE_URL`: Canonical site URL (default `https://seitech.co.uk`)
//! - `ENVIRONMENT`: Deployment name reported by the health check (default `development`)
//! - `DEMO_MODE`: Serve demo accounts and demo payloads when the ERP is down (default `true`)
//! - `DEMO_PASSWORD`: Password shared by the seeded demo accounts (default `demo1234`)

use std::env;

use crate::env_flag;

#[derive(Clone, Debug)]
pub struct SiteConfig {
    pub site_url: String,
    pub environment: String,
    pub demo_mode: bool,
    pub demo_password: String,
}

impl SiteConfig {
    pub fn from_env() -> Self {
        Self {
            site_url: env::var("NEXT_PUBLIC_SITE_URL")
                .unwrap_or_else(|_| "https://seitech.co.uk".into())
                .trim_end_matches('/')
                .to_string(),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            demo_mode: env_flag("DEMO_MODE", true),
            demo_password: env::var("DEMO_PASSWORD").unwrap_or_else(|_| "demo1234".into()),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.site_url, path.trim_start_matches('/'))
    }
}
