//! RBAC configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Longest accepted cache TTL (one year)
const MAX_CACHE_TTL_SECS: u64 = 86400 * 365;

/// RBAC engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RbacConfig {
    /// How long a resolved permission set is served from cache, in seconds
    /// Env: GAMEFLEET_RBAC_CACHE_TTL
    /// Default: 60 (0 disables the cache)
    pub cache_ttl_secs: u64,

    /// Interval between sweeps of expired cache entries, in seconds
    /// Env: GAMEFLEET_RBAC_CLEANUP_INTERVAL
    /// Default: 300 (5 minutes)
    pub cleanup_interval_secs: u64,
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self { cache_ttl_secs: 60, cleanup_interval_secs: 300 }
    }
}

impl RbacConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(ttl) = env::var("GAMEFLEET_RBAC_CACHE_TTL") {
            if let Ok(t) = ttl.parse() {
                self.cache_ttl_secs = t;
            }
        }

        if let Ok(interval) = env::var("GAMEFLEET_RBAC_CLEANUP_INTERVAL") {
            if let Ok(i) = interval.parse() {
                self.cleanup_interval_secs = i;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cleanup_interval_secs == 0 {
            bail!("Invalid cleanup_interval_secs: must be greater than 0");
        }
        if self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            bail!(
                "Invalid cache_ttl_secs: {} exceeds the maximum of {}",
                self.cache_ttl_secs,
                MAX_CACHE_TTL_SECS
            );
        }
        Ok(())
    }
}
