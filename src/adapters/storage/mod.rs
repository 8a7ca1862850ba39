//! Storage Adapters
//!
//! Implementations of the SnapshotStore port for persisting the rating snapshot.
//!
//! ## Available Adapters
//!
//! - **FileSnapshotStore** - Stores the snapshot as a JSON document on disk
//! - **InMemorySnapshotStore** - Stores the snapshot in memory (testing/development)
//!
//! The shared Redis store lives with the other Redis adapters.
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileSnapshotStore, InMemorySnapshotStore};
//!
//! // Single instance: file-based storage
//! let store = FileSnapshotStore::new("ratings.json");
//!
//! // Testing: in-memory storage
//! let store = InMemorySnapshotStore::new();
//! ```

mod file_snapshot_store;
mod in_memory_snapshot_store;

pub use file_snapshot_store::FileSnapshotStore;
pub use in_memory_snapshot_store::InMemorySnapshotStore;
