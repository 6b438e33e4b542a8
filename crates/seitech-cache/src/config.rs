//! CMS cache settings.
//!
//! - `REDIS_URL`: caching is off when unset or blank
//! - `CACHE_TTL_SECONDS`: lifetime of a cached payload (default `300`)
//! - `CACHE_PREFIX`: namespace for every key (default `seitech`)

use std::env;

const DEFAULT_TTL_SECONDS: u64 = 300;
const DEFAULT_PREFIX: &str = "seitech";

#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub redis_url: Option<String>,
    pub default_ttl_seconds: u64,
    pub key_prefix: String,
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self {
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),
            default_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .filter(|ttl| *ttl > 0)
                .unwrap_or(DEFAULT_TTL_SECONDS),
            key_prefix: env::var("CACHE_PREFIX")
                .ok()
                .map(|p| p.trim().trim_end_matches(':').to_string())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| DEFAULT_PREFIX.into()),
        }
    }

    pub fn disabled() -> Self {
        Self {
            redis_url: None,
            default_ttl_seconds: DEFAULT_TTL_SECONDS,
            key_prefix: DEFAULT_PREFIX.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.redis_url.is_some()
    }
}
