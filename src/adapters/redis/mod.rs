//! Redis adapters - cache, cluster lock, shared snapshot and pub/sub consumer.
//!
//! All adapters share one `MultiplexedConnection` cloned per call, except
//! the consumer which needs a dedicated pub/sub connection.

mod event_consumer;
mod job_lock;
mod person_cache;
mod snapshot_store;

pub use event_consumer::{EventConsumerConfig, RedisEventConsumer};
pub use job_lock::RedisJobLock;
pub use person_cache::RedisPersonCache;
pub use snapshot_store::RedisSnapshotStore;
