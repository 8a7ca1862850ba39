//! HTTP adapter for person and rating endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, HealthResponse, PersonRequest};
pub use handlers::{alive, PersonHandlers};
pub use routes::person_router;
