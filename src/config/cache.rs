//! Person cache configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Person cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Entry lifetime in seconds (25 hours by default)
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// Prefix prepended to every cache and lock key
    #[serde(default)]
    pub key_prefix: String,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ttl_secs == 0 {
            return Err(ValidationError::ZeroDuration("cache.ttl_secs"));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            key_prefix: String::new(),
        }
    }
}

fn default_ttl() -> u64 {
    25 * 60 * 60
}
