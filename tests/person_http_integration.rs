//! Integration tests for the person and rating HTTP endpoints.
//!
//! The full router runs against in-memory adapters and a stub order
//! service, so these tests cover routing, status codes, body shapes and
//! the cache and snapshot behavior behind them.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use person_rating::adapters::http::api_router;
use person_rating::adapters::{InMemoryPersonCache, InMemoryPersonRepository, InMemorySnapshotStore};
use person_rating::application::{AggregatorConfig, PersonService, RatingAggregator, SnapshotCache};
use person_rating::domain::foundation::{PersonId, Timestamp};
use person_rating::domain::person::Order;
use person_rating::ports::{RatingSource, RatingSourceError};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Order service stand-in keyed by person id.
#[derive(Default)]
struct StubOrders {
    ratings: Mutex<HashMap<PersonId, Vec<f64>>>,
}

impl StubOrders {
    fn set(&self, id: i64, ratings: &[f64]) {
        self.ratings
            .lock()
            .unwrap()
            .insert(PersonId::new(id), ratings.to_vec());
    }
}

#[async_trait]
impl RatingSource for StubOrders {
    async fn orders_for(&self, person_id: PersonId) -> Result<Vec<Order>, RatingSourceError> {
        let ratings = self
            .ratings
            .lock()
            .unwrap()
            .get(&person_id)
            .cloned()
            .unwrap_or_default();

        Ok(ratings
            .into_iter()
            .enumerate()
            .map(|(i, rating)| Order {
                id: i as i64 + 1,
                order_id: 100 + i as i64,
                person_id,
                rating,
                created_at: Timestamp::now(),
            })
            .collect())
    }
}

struct TestApp {
    router: Router,
    repository: InMemoryPersonRepository,
    cache: InMemoryPersonCache,
    orders: Arc<StubOrders>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_cache(InMemoryPersonCache::new(Duration::from_secs(90_000)))
    }

    fn with_cache(cache: InMemoryPersonCache) -> Self {
        let repository = InMemoryPersonRepository::new();
        let orders = Arc::new(StubOrders::default());
        let aggregator = Arc::new(RatingAggregator::new(
            orders.clone(),
            AggregatorConfig::default().with_request_timeout(Duration::from_millis(500)),
        ));
        let snapshots = Arc::new(SnapshotCache::new(Arc::new(InMemorySnapshotStore::new())));
        let service = Arc::new(PersonService::new(
            Arc::new(repository.clone()),
            Arc::new(cache.clone()),
            aggregator,
            snapshots,
        ));

        Self {
            router: api_router(service, Duration::from_secs(5)),
            repository,
            cache,
            orders,
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn create(&self, name: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/person",
                Some(json!({"name": name, "age": 30, "height": "180", "weight": "75"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }
}

fn ratings_by_person(body: &Value) -> HashMap<i64, f64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|r| {
            (
                r["person_id"].as_i64().unwrap(),
                r["rating"].as_f64().unwrap(),
            )
        })
        .collect()
}

// =============================================================================
// Persons
// =============================================================================

#[tokio::test]
async fn create_then_get_returns_created_person() {
    let app = TestApp::new();
    let created = app.create("Ada").await;

    assert_eq!(created["id"], 1);
    assert_eq!(created["name"], "Ada");
    assert_eq!(created["rating_updated"], false);
    assert!(app.cache.cached_person(PersonId::new(1)).await.is_some());

    let (status, fetched) = app.send(Method::GET, "/api/v1/person/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_persons_lists_every_person() {
    let app = TestApp::new();
    app.create("Ada").await;
    app.create("Grace").await;

    let (status, body) = app.send(Method::GET, "/api/v1/persons", None).await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Ada", "Grace"]);
}

#[tokio::test]
async fn unknown_person_is_not_found_with_domain_code() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/v1/person/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PERSON_NOT_FOUND");
}

#[tokio::test]
async fn non_numeric_id_is_not_found() {
    let app = TestApp::new();

    let (status, _) = app.send(Method::GET, "/api/v1/person/abc", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_with_malformed_body_is_bad_request() {
    let app = TestApp::new();

    let (status, body) = app
        .send(Method::POST, "/api/v1/person", Some(json!({"name": "Ada"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(app.repository.is_empty().await);
}

#[tokio::test]
async fn create_with_invalid_fields_is_bad_request() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/person",
            Some(json!({"name": "Ada", "age": 400, "height": "170", "weight": "60"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "OUT_OF_RANGE");
    assert_eq!(body["details"]["field"], "age");
}

#[tokio::test]
async fn create_store_failure_is_conflict() {
    let app = TestApp::new();
    app.repository.set_unavailable(true);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/person",
            Some(json!({"name": "Ada", "age": 36, "height": "170", "weight": "60"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DATABASE_ERROR");
}

#[tokio::test]
async fn update_returns_created_status_and_new_fields() {
    let app = TestApp::new();
    app.create("Ada").await;

    let (status, body) = app
        .send(
            Method::PUT,
            "/api/v1/update_person/1",
            Some(json!({"name": "Ada Lovelace", "age": 36, "height": "165", "weight": "55"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Ada Lovelace");

    let (_, fetched) = app.send(Method::GET, "/api/v1/person/1", None).await;
    assert_eq!(fetched["name"], "Ada Lovelace");
    let (_, list) = app.send(Method::GET, "/api/v1/persons", None).await;
    assert_eq!(list[0]["name"], "Ada Lovelace");
}

#[tokio::test]
async fn update_missing_person_is_not_found() {
    let app = TestApp::new();

    let (status, _) = app
        .send(
            Method::PUT,
            "/api/v1/update_person/9",
            Some(json!({"name": "Nobody", "age": 1, "height": "1", "weight": "1"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_with_invalid_body_is_bad_request() {
    let app = TestApp::new();
    app.create("Ada").await;

    let (status, _) = app
        .send(
            Method::PUT,
            "/api/v1/update_person/1",
            Some(json!({"name": "", "age": 36, "height": "165", "weight": "55"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_confirms_and_removes_person() {
    let app = TestApp::new();
    app.create("Ada").await;
    app.create("Grace").await;

    let (status, body) = app.send(Method::DELETE, "/api/v1/delete_person/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("person with id: 1"));

    let (_, list) = app.send(Method::GET, "/api/v1/persons", None).await;
    let ids: Vec<i64> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![2]);

    let (status, _) = app.send(Method::GET, "/api/v1/person/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_missing_person_is_not_found() {
    let app = TestApp::new();

    let (status, _) = app.send(Method::DELETE, "/api/v1/delete_person/5", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cache_outage_never_fails_requests() {
    let app = TestApp::with_cache(InMemoryPersonCache::unavailable());
    app.create("Ada").await;

    let (status, _) = app.send(Method::GET, "/api/v1/persons", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.send(Method::GET, "/api/v1/person/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada");
    let (status, _) = app.send(Method::DELETE, "/api/v1/delete_person/1", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn store_outage_on_read_is_not_found() {
    let app = TestApp::new();
    app.repository.set_unavailable(true);

    let (status, body) = app.send(Method::GET, "/api/v1/persons", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "DATABASE_ERROR");
}

// =============================================================================
// Ratings
// =============================================================================

#[tokio::test]
async fn rating_is_mean_of_orders() {
    let app = TestApp::new();
    app.create("Ada").await;
    app.orders.set(1, &[4.0, 5.0]);

    let (status, body) = app.send(Method::GET, "/api/v1/rating/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(4.5));
}

#[tokio::test]
async fn rating_of_unknown_person_is_not_found() {
    let app = TestApp::new();

    let (status, _) = app.send(Method::GET, "/api/v1/rating/3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn snapshot_holds_one_rating_per_person() {
    let app = TestApp::new();
    app.create("Ada").await;
    app.create("Grace").await;
    app.orders.set(1, &[4.0, 5.0]);

    let (status, body) = app.send(Method::GET, "/api/v1/ratings/groups", None).await;
    assert_eq!(status, StatusCode::OK);

    let ratings = ratings_by_person(&body);
    assert_eq!(ratings.len(), 2);
    assert_eq!(ratings[&1], 4.5);
    assert_eq!(ratings[&2], 0.0);
}

#[tokio::test]
async fn snapshot_is_served_until_refreshed() {
    let app = TestApp::new();
    app.create("Ada").await;
    app.orders.set(1, &[2.0]);

    let (_, first) = app.send(Method::GET, "/api/v1/ratings/groups", None).await;
    app.orders.set(1, &[5.0]);
    let (_, second) = app.send(Method::GET, "/api/v1/ratings/groups", None).await;
    assert_eq!(first, second);

    let (status, recomputed) = app.send(Method::GET, "/api/v1/ratings/channels", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ratings_by_person(&recomputed)[&1], 5.0);
}

#[tokio::test]
async fn deleted_person_is_absent_from_recomputed_ratings() {
    let app = TestApp::new();
    app.create("Ada").await;
    app.create("Grace").await;

    app.send(Method::DELETE, "/api/v1/delete_person/1", None).await;

    let (_, body) = app.send(Method::GET, "/api/v1/ratings/channels", None).await;
    let ratings = ratings_by_person(&body);
    assert_eq!(ratings.len(), 1);
    assert!(ratings.contains_key(&2));
}

// =============================================================================
// Liveness
// =============================================================================

#[tokio::test]
async fn alive_reports_ok_when_store_answers() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/alive", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn alive_reports_unavailable_when_store_is_down() {
    let app = TestApp::new();
    app.repository.set_unavailable(true);

    let (status, _) = app.send(Method::GET, "/alive", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
