//! RatingSource port - the order service queried for raw orders.

use async_trait::async_trait;

use crate::domain::foundation::PersonId;
use crate::domain::person::Order;

/// Errors raised while fetching orders for one person.
///
/// Never escapes the application layer: a failed fetch degrades that
/// person's rating to `0.0`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RatingSourceError {
    #[error("Order service request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Order service unreachable: {0}")]
    Network(String),

    #[error("Order service returned status {0}")]
    Status(u16),

    #[error("Failed to decode orders: {0}")]
    Decode(String),
}

/// Source of orders for a person.
#[async_trait]
pub trait RatingSource: Send + Sync {
    /// Fetches all orders of a person. An empty list is a valid answer.
    async fn orders_for(&self, person_id: PersonId) -> Result<Vec<Order>, RatingSourceError>;
}
