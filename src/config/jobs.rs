//! Snapshot storage and background job configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;

/// Where the durable snapshot tier lives
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotBackend {
    /// One Redis key shared by every instance
    #[default]
    Redis,
    /// A local JSON file; only for single-instance deployments
    File,
}

/// Durable snapshot tier
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default)]
    pub backend: SnapshotBackend,

    /// File holding the latest rating snapshot (file backend)
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Seconds the in-memory copy is served before re-checking the durable tier
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
}

impl SnapshotConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.backend == SnapshotBackend::File && self.path.as_os_str().is_empty() {
            return Err(ValidationError::EmptySnapshotPath);
        }
        Ok(())
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            backend: SnapshotBackend::default(),
            path: default_path(),
            max_age_secs: default_max_age(),
        }
    }
}

/// Periodic refresh job
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    /// Run the refresh job in this instance
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Logical job name, shared by every instance
    #[serde(default = "default_job_name")]
    pub job_name: String,

    /// Seconds between ticks
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Lock lease in seconds
    #[serde(default = "default_lock_ttl")]
    pub lock_ttl_secs: u64,
}

impl SchedulerSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.job_name.trim().is_empty() {
            return Err(ValidationError::BlankName("scheduler.job_name"));
        }
        if self.interval_secs == 0 {
            return Err(ValidationError::ZeroDuration("scheduler.interval_secs"));
        }
        if self.lock_ttl_secs == 0 {
            return Err(ValidationError::ZeroDuration("scheduler.lock_ttl_secs"));
        }
        Ok(())
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            job_name: default_job_name(),
            interval_secs: default_interval(),
            lock_ttl_secs: default_lock_ttl(),
        }
    }
}

/// Inbound rating update events
#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// Subscribe to the topic in this instance
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Pub/sub channel carrying rating updates
    #[serde(default = "default_topic")]
    pub topic: String,
}

impl EventsConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.topic.trim().is_empty() {
            return Err(ValidationError::BlankName("events.topic"));
        }
        Ok(())
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            topic: default_topic(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("ratings.json")
}

fn default_max_age() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_job_name() -> String {
    "rating-refresh".to_string()
}

fn default_interval() -> u64 {
    60
}

fn default_lock_ttl() -> u64 {
    120
}

fn default_topic() -> String {
    "orders.update_rating".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_defaults() {
        let config = SchedulerSettings::default();
        assert!(config.enabled);
        assert_eq!(config.job_name, "rating-refresh");
        assert_eq!(config.interval(), Duration::from_secs(60));
        assert_eq!(config.lock_ttl(), Duration::from_secs(120));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let config = SchedulerSettings {
            interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_topic_is_rejected() {
        let config = EventsConfig {
            topic: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::BlankName("events.topic")));
    }

    #[test]
    fn test_snapshot_defaults() {
        let config = SnapshotConfig::default();
        assert_eq!(config.backend, SnapshotBackend::Redis);
        assert_eq!(config.path, PathBuf::from("ratings.json"));
        assert!(config.max_age() <= SchedulerSettings::default().interval());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_path_only_matters_for_file_backend() {
        let redis = SnapshotConfig {
            path: PathBuf::new(),
            ..Default::default()
        };
        assert!(redis.validate().is_ok());

        let file = SnapshotConfig {
            backend: SnapshotBackend::File,
            ..redis
        };
        assert_eq!(file.validate(), Err(ValidationError::EmptySnapshotPath));
    }
}
