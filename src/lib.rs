//! Person Rating - person records with cached, periodically aggregated ratings.
//!
//! Persons live in PostgreSQL and are cached in Redis. Each person's rating
//! is the mean of their order ratings, fetched concurrently from the order
//! service and published as a snapshot by a cluster-wide refresh job.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
