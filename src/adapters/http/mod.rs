//! HTTP adapters - REST API implementations.
//!
//! `api_router` assembles the full application: person routes under
//! `/api/v1`, the liveness check at `/alive`, request tracing and a
//! per-request timeout.

pub mod person;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::application::PersonService;

pub use person::{person_router, PersonHandlers};

/// Builds the application router around a shared service.
pub fn api_router(service: Arc<PersonService>, request_timeout: Duration) -> Router {
    Router::new()
        .nest("/api/v1", person_router())
        .route("/alive", get(person::alive))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(PersonHandlers::new(service))
}
