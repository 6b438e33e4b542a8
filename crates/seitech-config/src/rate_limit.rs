//! Rate limiting configuration for API endpoints.
//!
//! Rate limits are enforced with `tower_governor` layers keyed by client
//! address. Authentication endpoints get a stricter bucket to slow down
//! credential stuffing.
//!
//! # Configuration
//!
//! - `RATE_LIMIT_ENABLED`: Toggle enforcement (default: true)
//! - `RATE_LIMIT_GENERAL_PER_SECOND`: Replenish rate for general endpoints (default: 20)
//! - `RATE_LIMIT_GENERAL_BURST_SIZE`: Burst size for general endpoints (default: 60)
//! - `RATE_LIMIT_AUTH_PER_SECOND`: Replenish rate for auth endpoints (default: 2)
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: Burst size for auth endpoints (default: 10)

use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::SmartIpKeyExtractor;

use crate::{env_flag, env_or};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Tokens replenished per second for general endpoints.
    pub general_per_second: u32,
    /// Maximum tokens accumulated for general endpoints.
    pub general_burst_size: u32,
    /// Tokens replenished per second for auth endpoints.
    pub auth_per_second: u32,
    /// Maximum tokens accumulated for auth endpoints.
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            general_per_second: 20,
            general_burst_size: 60,
            auth_per_second: 2,
            auth_burst_size: 10,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_flag("RATE_LIMIT_ENABLED", defaults.enabled),
            general_per_second: env_or("RATE_LIMIT_GENERAL_PER_SECOND", defaults.general_per_second),
            general_burst_size: env_or("RATE_LIMIT_GENERAL_BURST_SIZE", defaults.general_burst_size),
            auth_per_second: env_or("RATE_LIMIT_AUTH_PER_SECOND", defaults.auth_per_second),
            auth_burst_size: env_or("RATE_LIMIT_AUTH_BURST_SIZE", defaults.auth_burst_size),
        }
    }

    /// A configuration with enforcement switched off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Governor for every `/api` route outside `/api/auth`. Keys on the
    /// forwarding headers a proxy sets, else the peer address.
    #[must_use]
    pub fn general_governor_config(
        &self,
    ) -> Option<GovernorConfig<SmartIpKeyExtractor, ::governor::middleware::NoOpMiddleware>> {
        governor_config(self.general_per_second, self.general_burst_size)
    }

    #[must_use]
    pub fn auth_governor_config(
        &self,
    ) -> Option<GovernorConfig<SmartIpKeyExtractor, ::governor::middleware::NoOpMiddleware>> {
        governor_config(self.auth_per_second, self.auth_burst_size)
    }
}

/// Milliseconds between two replenished tokens. Zero rates count as one.
fn replenish_interval_ms(per_second: u32) -> u64 {
    u64::from((1000 / per_second.max(1)).max(1))
}

fn governor_config(
    per_second: u32,
    burst: u32,
) -> Option<GovernorConfig<SmartIpKeyExtractor, ::governor::middleware::NoOpMiddleware>> {
    GovernorConfigBuilder::default()
        .per_millisecond(replenish_interval_ms(per_second))
        .burst_size(burst.max(1))
        .key_extractor(SmartIpKeyExtractor)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.general_per_second, 20);
        assert_eq!(config.auth_burst_size, 10);
    }

    #[test]
    fn test_disabled() {
        let config = RateLimitConfig::disabled();
        assert!(!config.enabled);
        assert_eq!(config.general_burst_size, 60);
    }

    #[test]
    fn test_replenish_interval() {
        assert_eq!(replenish_interval_ms(0), 1000);
        assert_eq!(replenish_interval_ms(1), 1000);
        assert_eq!(replenish_interval_ms(20), 50);
        assert_eq!(replenish_interval_ms(5000), 1);
    }

    #[test]
    fn test_governor_configs_build_with_zero_values() {
        let config = RateLimitConfig {
            enabled: true,
            general_per_second: 0,
            general_burst_size: 0,
            auth_per_second: 0,
            auth_burst_size: 0,
        };
        assert!(config.general_governor_config().is_some());
        assert!(config.auth_governor_config().is_some());
    }
}
