use anyhow::Context;
use tracing::info;

use seitech_cache::{CacheConfig, RedisCache};
use seitech_config::{CorsConfig, OdooConfig, RateLimitConfig, SessionConfig, SiteConfig};
use seitech_odoo::{BatchClient, OdooClient};

use crate::demo::DemoStore;

#[derive(Clone, Debug)]
pub struct AppState {
    pub odoo: OdooClient,
    pub batch: BatchClient,
    pub cache: Option<RedisCache>,
    pub cache_config: CacheConfig,
    pub session_config: SessionConfig,
    pub site_config: SiteConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub demo: DemoStore,
}

impl AppState {
    /// Assemble state around an ERP client. The batch queue is spawned on
    /// the current runtime.
    pub fn new(
        odoo: OdooClient,
        cache: Option<RedisCache>,
        cache_config: CacheConfig,
        session_config: SessionConfig,
        site_config: SiteConfig,
        cors_config: CorsConfig,
        rate_limit_config: RateLimitConfig,
    ) -> Self {
        let demo = DemoStore::seeded(&site_config.demo_password);
        Self {
            batch: BatchClient::spawn(odoo.clone()),
            odoo,
            cache,
            cache_config,
            session_config,
            site_config,
            cors_config,
            rate_limit_config,
            demo,
        }
    }

    pub fn cache(&self) -> Option<&RedisCache> {
        self.cache.as_ref()
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let odoo_config = OdooConfig::from_env();
    info!(odoo.url = %odoo_config.url, odoo.database = %odoo_config.database, "Configuring ERP client");
    let odoo = OdooClient::new(odoo_config).context("Failed to build ERP client")?;

    let cache_config = CacheConfig::from_env();
    let cache = RedisCache::connect(&cache_config).await;

    Ok(AppState::new(
        odoo,
        cache,
        cache_config,
        SessionConfig::from_env(),
        SiteConfig::from_env(),
        CorsConfig::from_env(),
        RateLimitConfig::from_env(),
    ))
}

/// State pointed at `odoo_url` with caching and rate limiting off.
#[cfg(any(test, feature = "test-utils"))]
pub fn test_state(odoo_url: &str) -> AppState {
    let odoo = match OdooClient::new(OdooConfig::for_url(odoo_url)) {
        Ok(client) => client,
        Err(e) => panic!("failed to build test ERP client: {e}"),
    };

    AppState::new(
        odoo,
        None,
        CacheConfig::disabled(),
        SessionConfig {
            secret: "test-session-secret".into(),
            max_age_secs: 3600,
            secure_cookies: false,
        },
        SiteConfig {
            site_url: "https://seitech.test".into(),
            environment: "test".into(),
            demo_mode: true,
            demo_password: "demo1234".into(),
        },
        CorsConfig {
            allowed_origins: vec!["http://localhost:3000".into()],
        },
        RateLimitConfig::disabled(),
    )
}
