//! HTTP client for the order service.
//!
//! Calls `GET {base_url}/order_by_person/{person_id}` and decodes the list
//! of orders. Every request carries the configured timeout.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::domain::foundation::PersonId;
use crate::domain::person::Order;
use crate::ports::{RatingSource, RatingSourceError};

/// Configuration for the order service client.
#[derive(Debug, Clone)]
pub struct OrderClientConfig {
    /// Base URL without trailing slash, e.g. `http://orders:8080`.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl OrderClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(2000),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Order service client implementing [`RatingSource`].
#[derive(Debug, Clone)]
pub struct HttpOrderClient {
    client: Client,
    config: OrderClientConfig,
}

impl HttpOrderClient {
    /// Creates a client with its own connection pool.
    pub fn new(config: OrderClientConfig) -> Result<Self, RatingSourceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RatingSourceError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn orders_url(&self, person_id: PersonId) -> String {
        format!("{}/order_by_person/{}", self.config.base_url, person_id)
    }

    fn map_send_error(&self, e: reqwest::Error) -> RatingSourceError {
        if e.is_timeout() {
            RatingSourceError::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            }
        } else if e.is_connect() {
            RatingSourceError::Network(format!("Connection failed: {}", e))
        } else {
            RatingSourceError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl RatingSource for HttpOrderClient {
    async fn orders_for(&self, person_id: PersonId) -> Result<Vec<Order>, RatingSourceError> {
        let response = self
            .client
            .get(self.orders_url(person_id))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RatingSourceError::Status(status.as_u16()));
        }

        response.json::<Vec<Order>>().await.map_err(|e| {
            if e.is_timeout() {
                self.map_send_error(e)
            } else {
                RatingSourceError::Decode(e.to_string())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = HttpOrderClient::new(OrderClientConfig::new("http://orders:8080/")).unwrap();
        assert_eq!(
            client.orders_url(PersonId::new(7)),
            "http://orders:8080/order_by_person/7"
        );
    }

    #[test]
    fn config_default_timeout_is_two_seconds() {
        let config = OrderClientConfig::new("http://orders");
        assert_eq!(config.timeout, Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_network_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let client = HttpOrderClient::new(
            OrderClientConfig::new("http://127.0.0.1:9").with_timeout(Duration::from_millis(500)),
        )
        .unwrap();

        let err = client.orders_for(PersonId::new(1)).await.unwrap_err();
        assert!(matches!(
            err,
            RatingSourceError::Network(_) | RatingSourceError::Timeout { .. }
        ));
    }
}
