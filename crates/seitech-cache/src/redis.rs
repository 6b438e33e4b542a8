//! Redis-backed store for CMS payloads.
//!
//! Values are JSON strings written with `SETEX`. Every read failure is a
//! miss: the gateway always has the ERP (or demo defaults) to fall back on.

use std::time::Duration;

use redis::{AsyncCommands, Client, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, instrument, warn};

use crate::CacheConfig;

/// Keys removed per `UNLINK` when purging.
const PURGE_BATCH: usize = 200;

#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    ttl: Duration,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Could not encode cache value: {0}")]
    Encode(#[from] serde_json::Error),
}

impl RedisCache {
    pub async fn new(redis_url: &str, ttl: Duration) -> Result<Self, CacheError> {
        let conn = ConnectionManager::new(Client::open(redis_url)?).await?;
        Ok(Self { conn, ttl })
    }

    /// `None` when `REDIS_URL` is unset or Redis refuses the connection; the
    /// gateway then serves every CMS request from the ERP.
    pub async fn connect(config: &CacheConfig) -> Option<Self> {
        let url = config.redis_url.as_deref()?;
        match Self::new(url, Duration::from_secs(config.default_ttl_seconds)).await {
            Ok(cache) => {
                info!(ttl_secs = config.default_ttl_seconds, "CMS cache connected to Redis");
                Some(cache)
            }
            Err(e) => {
                warn!(error = %e, "Redis unavailable, CMS caching disabled");
                None
            }
        }
    }

    /// Entries that no longer decode (payload shape changed between
    /// releases) are evicted.
    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = match conn.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Redis GET failed");
                return None;
            }
        };

        let decoded = serde_json::from_str(&raw?);
        match decoded {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "Evicting undecodable cache entry");
                if let Err(e) = conn.del::<_, ()>(key).await {
                    debug!(error = %e, "Eviction failed");
                }
                None
            }
        }
    }

    #[instrument(skip(self, value))]
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let json = serde_json::to_string(value)?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, json, self.ttl.as_secs()).await?;
        Ok(())
    }

    /// Remove every key matching a glob `pattern`. Returns how many went.
    #[instrument(skip(self))]
    pub async fn purge(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();

        let mut keys = Vec::new();
        let mut cursor = 0u64;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(PURGE_BATCH)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        let mut removed = 0u64;
        for chunk in keys.chunks(PURGE_BATCH) {
            removed += conn.unlink::<_, u64>(chunk).await?;
        }
        info!(pattern, removed, "Purged cache keys");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_connect_without_url_is_disabled() {
        assert!(RedisCache::connect(&CacheConfig::disabled()).await.is_none());
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_set_get_purge() {
        let cache = RedisCache::new("redis://localhost:6379", Duration::from_secs(60))
            .await
            .unwrap();

        let payload = json!({ "companyName": "SEI Tech International" });
        cache.set("seitech-test:cms:settings", &payload).await.unwrap();
        let cached: Option<Value> = cache.get("seitech-test:cms:settings").await;
        assert_eq!(cached, Some(payload));

        assert_eq!(cache.purge("seitech-test:cms:*").await.unwrap(), 1);
        let gone: Option<Value> = cache.get("seitech-test:cms:settings").await;
        assert!(gone.is_none());
    }
}
