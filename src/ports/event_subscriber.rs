//! EventHandler port - Interface for consuming inbound bus messages.
//!
//! This port defines how handlers process messages delivered on a topic
//! without knowing about the underlying transport mechanism.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::foundation::DomainError;

/// Handler for messages delivered on one topic.
///
/// Implementations should be:
/// - **Idempotent** - Safe to call multiple times with same message
/// - **Isolated** - Errors are logged by the consumer, never stop it
///
/// # Example
///
/// ```ignore
/// struct AuditTrail { /* ... */ }
///
/// #[async_trait]
/// impl EventHandler for AuditTrail {
///     async fn handle(
///         &self,
///         payload: &[u8],
///         _cancel: watch::Receiver<bool>,
///     ) -> Result<(), DomainError> {
///         let event: PersonChanged = serde_json::from_slice(payload)?;
///         // Record the change...
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "AuditTrail"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process one raw message payload.
    ///
    /// `cancel` flips to `true` on consumer shutdown; long-running work
    /// should stop early when it does.
    async fn handle(
        &self,
        payload: &[u8],
        cancel: watch::Receiver<bool>,
    ) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that the trait is object-safe
    #[allow(dead_code)]
    fn assert_handler_object_safe(_: &dyn EventHandler) {}
}
