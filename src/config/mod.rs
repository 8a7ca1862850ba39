//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PERSON_RATING` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use person_rating::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod cache;
mod database;
mod error;
mod jobs;
mod rating_source;
mod redis;
mod server;

pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use jobs::{EventsConfig, SchedulerSettings, SnapshotBackend, SnapshotConfig};
pub use rating_source::RatingSourceConfig;
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL person store)
    pub database: DatabaseConfig,

    /// Redis configuration (cache, job lock, pub/sub)
    pub redis: RedisConfig,

    /// Person cache TTL and key namespace
    #[serde(default)]
    pub cache: CacheConfig,

    /// Order service endpoint and fan-out limits
    pub rating_source: RatingSourceConfig,

    /// Durable snapshot tier and memory freshness bound
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// Periodic refresh job
    #[serde(default)]
    pub scheduler: SchedulerSettings,

    /// Inbound rating update events
    #[serde(default)]
    pub events: EventsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PERSON_RATING` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PERSON_RATING__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PERSON_RATING__RATING_SOURCE__BASE_URL=...` -> `rating_source.base_url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PERSON_RATING")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.cache.validate()?;
        self.rating_source.validate()?;
        self.snapshot.validate()?;
        self.scheduler.validate()?;
        self.events.validate()?;
        // Instances that lose the lock only learn of a new snapshot on re-check.
        if self.snapshot.max_age() > self.scheduler.interval() {
            return Err(ValidationError::SnapshotMaxAgeTooLong);
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
