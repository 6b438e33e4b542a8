//! # SEI Tech Cache
//!
//! Optional Redis cache for CMS payloads plus the HTTP caching headers the
//! public routes send. The gateway runs unchanged without Redis.
//!
//! ```ignore
//! use seitech_cache::{CacheConfig, RedisCache, keys};
//!
//! let config = CacheConfig::from_env();
//! if let Some(cache) = RedisCache::connect(&config).await {
//!     let key = keys::cms::resource(&config.key_prefix, "faqs", &(path, &filters));
//!     let cached: Option<serde_json::Value> = cache.get(&key).await;
//! }
//! ```

pub mod config;
pub mod keys;
pub mod middleware;
pub mod redis;

pub use config::CacheConfig;
pub use middleware::{CacheControlConfig, cache_control, etag_middleware};
pub use redis::{CacheError, RedisCache};
