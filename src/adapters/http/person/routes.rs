//! Route configuration for person and rating endpoints.

use axum::routing::{delete, get, post, put};
use axum::Router;

use super::handlers::{
    create_person, delete_person, get_person, get_persons, get_rating, get_rating_snapshot,
    recompute_ratings, update_person, PersonHandlers,
};

/// Creates the person router, to be nested under `/api/v1`.
///
/// Routes:
/// - `GET /persons` - All persons
/// - `GET /person/:id` - One person
/// - `POST /person` - Create a person
/// - `PUT /update_person/:id` - Replace a person's fields
/// - `DELETE /delete_person/:id` - Delete a person
/// - `GET /rating/:id` - Live rating of one person
/// - `GET /ratings/groups` - Ratings from the snapshot
/// - `GET /ratings/channels` - Ratings recomputed now
pub fn person_router() -> Router<PersonHandlers> {
    Router::new()
        .route("/persons", get(get_persons))
        .route("/person", post(create_person))
        .route("/person/:id", get(get_person))
        .route("/update_person/:id", put(update_person))
        .route("/delete_person/:id", delete(delete_person))
        .route("/rating/:id", get(get_rating))
        .route("/ratings/groups", get(get_rating_snapshot))
        .route("/ratings/channels", get(recompute_ratings))
}
