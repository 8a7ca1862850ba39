//! HTTP handlers for person and rating endpoints.
//!
//! Status codes follow the public contract of the service: read routes answer
//! every failure with 404, create answers store failures with 409, update
//! answers them with 404. Validation failures are always 400. The error body
//! keeps the real domain code so callers can still tell the cases apart.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::PersonService;
use crate::domain::foundation::{DomainError, ErrorCode, PersonId};

use super::dto::{ErrorResponse, HealthResponse, PersonRequest};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct PersonHandlers {
    service: Arc<PersonService>,
}

impl PersonHandlers {
    pub fn new(service: Arc<PersonService>) -> Self {
        Self { service }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Person handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /persons
pub async fn get_persons(State(handlers): State<PersonHandlers>) -> Response {
    match handlers.service.get_persons().await {
        Ok(persons) => (StatusCode::OK, Json(persons)).into_response(),
        Err(e) => error_response(StatusCode::NOT_FOUND, e),
    }
}

/// GET /person/:id
pub async fn get_person(
    State(handlers): State<PersonHandlers>,
    id: Result<Path<PersonId>, PathRejection>,
) -> Response {
    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return invalid_id(rejection),
    };

    match handlers.service.get_person(id).await {
        Ok(person) => (StatusCode::OK, Json(person)).into_response(),
        Err(e) => error_response(StatusCode::NOT_FOUND, e),
    }
}

/// POST /person
pub async fn create_person(
    State(handlers): State<PersonHandlers>,
    payload: Result<Json<PersonRequest>, JsonRejection>,
) -> Response {
    let draft = match payload {
        Ok(Json(req)) => match req.into_draft() {
            Ok(draft) => draft,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e.into()),
        },
        Err(rejection) => return bad_body(rejection),
    };

    match handlers.service.create_person(draft).await {
        Ok(person) => (StatusCode::CREATED, Json(person)).into_response(),
        Err(e) => error_response(StatusCode::CONFLICT, e),
    }
}

/// PUT /update_person/:id
pub async fn update_person(
    State(handlers): State<PersonHandlers>,
    id: Result<Path<PersonId>, PathRejection>,
    payload: Result<Json<PersonRequest>, JsonRejection>,
) -> Response {
    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return invalid_id(rejection),
    };
    let draft = match payload {
        Ok(Json(req)) => match req.into_draft() {
            Ok(draft) => draft,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e.into()),
        },
        Err(rejection) => return bad_body(rejection),
    };

    match handlers.service.update_person(id, draft).await {
        Ok(person) => (StatusCode::CREATED, Json(person)).into_response(),
        Err(e) => error_response(StatusCode::NOT_FOUND, e),
    }
}

/// DELETE /delete_person/:id
pub async fn delete_person(
    State(handlers): State<PersonHandlers>,
    id: Result<Path<PersonId>, PathRejection>,
) -> Response {
    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return invalid_id(rejection),
    };

    match handlers.service.delete_person(id).await {
        Ok(()) => (StatusCode::OK, Json(format!("person with id: {}", id))).into_response(),
        Err(e) => error_response(StatusCode::NOT_FOUND, e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Rating handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /rating/:id
pub async fn get_rating(
    State(handlers): State<PersonHandlers>,
    id: Result<Path<PersonId>, PathRejection>,
) -> Response {
    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return invalid_id(rejection),
    };

    match handlers.service.get_rating(id).await {
        Ok(rating) => (StatusCode::OK, Json(rating)).into_response(),
        Err(e) => error_response(StatusCode::NOT_FOUND, e),
    }
}

/// GET /ratings/groups - served from the snapshot
pub async fn get_rating_snapshot(State(handlers): State<PersonHandlers>) -> Response {
    match handlers.service.get_rating_snapshot().await {
        Ok(ratings) => (StatusCode::OK, Json(ratings)).into_response(),
        Err(e) => error_response(StatusCode::NOT_FOUND, e),
    }
}

/// GET /ratings/channels - forced recompute
pub async fn recompute_ratings(State(handlers): State<PersonHandlers>) -> Response {
    match handlers.service.recompute_ratings().await {
        Ok(ratings) => (StatusCode::OK, Json(ratings)).into_response(),
        Err(e) => error_response(StatusCode::NOT_FOUND, e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Liveness
// ════════════════════════════════════════════════════════════════════════════

/// GET /alive
pub async fn alive(State(handlers): State<PersonHandlers>) -> Response {
    match handlers.service.health().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse::ok())).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Liveness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(HealthResponse::unavailable())).into_response()
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error mapping
// ════════════════════════════════════════════════════════════════════════════

/// Maps a domain error to a response.
///
/// Validation codes are always 400; everything else uses the route's
/// failure status.
fn error_response(failure: StatusCode, error: DomainError) -> Response {
    let status = status_for(failure, error.code());

    match error.code() {
        ErrorCode::DatabaseError | ErrorCode::InternalError => {
            tracing::error!(error = %error, status = status.as_u16(), "Request failed")
        }
        _ => tracing::debug!(error = %error, status = status.as_u16(), "Request rejected"),
    }

    (status, Json(ErrorResponse::from_domain(&error))).into_response()
}

fn status_for(failure: StatusCode, code: ErrorCode) -> StatusCode {
    if code.is_validation() {
        StatusCode::BAD_REQUEST
    } else {
        failure
    }
}

fn invalid_id(rejection: PathRejection) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::not_found("Person", &rejection.body_text())),
    )
        .into_response()
}

fn bad_body(rejection: JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::bad_request(rejection.body_text())),
    )
        .into_response()
}
