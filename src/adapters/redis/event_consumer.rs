//! Redis pub/sub consumer.
//!
//! Subscribes to one channel and hands every payload to an [`EventHandler`].
//! The shutdown signal is passed to the handler, so a message in flight
//! stops early on shutdown. Handler failures are logged and the consumer
//! keeps going. If the subscription drops, the consumer reconnects after a
//! delay until shutdown is signalled.

use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::application::cancellation;
use crate::ports::EventHandler;

/// Configuration for the pub/sub consumer.
#[derive(Debug, Clone)]
pub struct EventConsumerConfig {
    /// Channel to subscribe to.
    pub topic: String,

    /// Delay before re-subscribing after the connection drops.
    pub reconnect_delay: Duration,
}

impl EventConsumerConfig {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            reconnect_delay: Duration::from_secs(1),
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

/// Background service feeding a Redis channel into a handler.
pub struct RedisEventConsumer {
    client: redis::Client,
    handler: Arc<dyn EventHandler>,
    config: EventConsumerConfig,
}

enum SessionEnd {
    Shutdown,
    Disconnected,
}

impl RedisEventConsumer {
    pub fn new(
        client: redis::Client,
        handler: Arc<dyn EventHandler>,
        config: EventConsumerConfig,
    ) -> Self {
        Self {
            client,
            handler,
            config,
        }
    }

    /// Run the consumer until shutdown is signalled.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            topic = %self.config.topic,
            handler = self.handler.name(),
            "Event consumer started"
        );

        loop {
            match self.consume(&mut shutdown).await {
                Ok(SessionEnd::Shutdown) => break,
                Ok(SessionEnd::Disconnected) => {
                    tracing::warn!(topic = %self.config.topic, "Subscription closed, reconnecting");
                }
                Err(e) => {
                    tracing::error!(topic = %self.config.topic, error = %e, "Subscription failed");
                }
            }

            tokio::select! {
                _ = cancellation::cancelled(&mut shutdown) => break,
                _ = tokio::time::sleep(self.config.reconnect_delay) => {}
            }
        }

        tracing::info!(topic = %self.config.topic, "Event consumer stopped");
    }

    async fn consume(
        &self,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<SessionEnd, redis::RedisError> {
        let mut pubsub = self.client.get_async_connection().await?.into_pubsub();
        pubsub.subscribe(&self.config.topic).await?;
        let mut messages = pubsub.on_message();

        loop {
            tokio::select! {
                _ = cancellation::cancelled(shutdown) => return Ok(SessionEnd::Shutdown),
                message = messages.next() => match message {
                    Some(message) => {
                        self.dispatch(message.get_payload_bytes(), shutdown.clone()).await
                    }
                    None => return Ok(SessionEnd::Disconnected),
                },
            }
        }
    }

    async fn dispatch(&self, payload: &[u8], cancel: watch::Receiver<bool>) {
        if let Err(e) = self.handler.handle(payload, cancel).await {
            tracing::error!(
                topic = %self.config.topic,
                handler = self.handler.name(),
                error = %e,
                "Event handler failed"
            );
        }
    }
}
