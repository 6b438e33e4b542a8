//! # SEI Tech Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`odoo`]: ERP endpoint, database and service credentials
//! - [`session`]: Session token signing and cookie settings
//! - [`site`]: Public site URL, environment name and demo mode
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`rate_limit`]: API rate limiting configuration
//! - [`server`]: Listen address and metrics port
//!
//! # Example
//!
//! ```ignore
//! use seitech_config::{OdooConfig, SessionConfig, SiteConfig};
//!
//! let odoo = OdooConfig::from_env();
//! let session = SessionConfig::from_env();
//! let site = SiteConfig::from_env();
//! ```

pub mod cors;
pub mod odoo;
pub mod rate_limit;
pub mod server;
pub mod session;
pub mod site;

pub use cors::CorsConfig;
pub use odoo::OdooConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;
pub use session::SessionConfig;
pub use site::SiteConfig;

/// Read an environment variable and parse it, falling back to `default`.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read a boolean flag; `false`, `0` and `no` are false, anything else true.
pub(crate) fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "no"))
        .unwrap_or(default)
}
