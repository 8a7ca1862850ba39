//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresPersonRepository` - Authoritative person store

mod person_repository;

pub use person_repository::PostgresPersonRepository;
