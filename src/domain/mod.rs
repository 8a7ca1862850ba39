//! Domain layer containing business types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `person` - Person records, orders, ratings and the rating snapshot

pub mod foundation;
pub mod person;
