//! Order service configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Order service (rating source) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RatingSourceConfig {
    /// Base URL of the order service
    pub base_url: String,

    /// Deadline for a single order request, in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Maximum concurrent order requests during aggregation
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl RatingSourceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("RATING_SOURCE__BASE_URL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidRatingSourceUrl);
        }
        if self.request_timeout_ms == 0 {
            return Err(ValidationError::ZeroDuration("rating_source.request_timeout_ms"));
        }
        if !(1..=1024).contains(&self.max_concurrency) {
            return Err(ValidationError::InvalidConcurrency);
        }
        Ok(())
    }
}

impl Default for RatingSourceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            request_timeout_ms: default_request_timeout_ms(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    2000
}

fn default_max_concurrency() -> usize {
    32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RatingSourceConfig {
        RatingSourceConfig {
            base_url: "http://orders:8080".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = valid();
        assert_eq!(config.request_timeout(), Duration::from_millis(2000));
        assert_eq!(config.max_concurrency, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_http_url_is_rejected() {
        let config = RatingSourceConfig {
            base_url: "orders:8080".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidRatingSourceUrl));
    }

    #[test]
    fn test_concurrency_bounds() {
        let zero = RatingSourceConfig {
            max_concurrency: 0,
            ..valid()
        };
        let huge = RatingSourceConfig {
            max_concurrency: 5000,
            ..valid()
        };
        assert_eq!(zero.validate(), Err(ValidationError::InvalidConcurrency));
        assert_eq!(huge.validate(), Err(ValidationError::InvalidConcurrency));
    }
}
