#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use platewatch_api::config::{LogFormat, ServerConfig, StoreBackend};
use platewatch_api::router::build_app_router;
use platewatch_api::state::AppState;
use platewatch_core::aggregation::{PlateCount, PlateTrack};
use platewatch_core::types::DbId;
use platewatch_db::models::sighting::{
    CreateSighting, Sighting, SightingFilter, SightingPage, SightingQuery,
};
use platewatch_db::store::{
    InMemorySightingStore, SightingStore, StoreError, StoreResult, StoreUnavailable,
};
use platewatch_db::PoolSettings;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        store: StoreBackend::Memory,
        database_url: None,
        pool: PoolSettings::default(),
        log_format: LogFormat::Text,
    }
}

/// Build the full application router over the given store, with the same
/// middleware stack production uses.
pub fn build_test_app(store: Arc<dyn SightingStore>) -> Router {
    build_app_router(AppState::new(store), &test_config())
}

/// App backed by a fresh in-memory store.
pub fn memory_app() -> (Router, Arc<InMemorySightingStore>) {
    let store = Arc::new(InMemorySightingStore::new());
    (build_test_app(store.clone()), store)
}

/// App whose store fails every call.
pub fn unavailable_app() -> Router {
    build_test_app(Arc::new(UnavailableStore))
}

/// App whose store is reachable but rejects every call, reporting
/// `constraint` as the violated constraint.
pub fn rejecting_app(constraint: Option<&str>) -> Router {
    build_test_app(Arc::new(RejectingStore {
        constraint: constraint.map(str::to_string),
    }))
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: impl Into<String>) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// A valid create body; override fields with `serde_json` object merges.
pub fn sighting_body(plate: &str, timestamp: &str) -> serde_json::Value {
    serde_json::json!({
        "plateNumber": plate,
        "confidence": 0.9,
        "timestamp": timestamp,
        "location": "Kenyatta Avenue",
        "latitude": -1.2864,
        "longitude": 36.8172,
        "videoId": "cam-01",
    })
}

// ---------------------------------------------------------------------------
// Store doubles
// ---------------------------------------------------------------------------

/// A store whose backend is permanently unreachable.
pub struct UnavailableStore;

fn down<T>(operation: &'static str) -> StoreResult<T> {
    Err(StoreUnavailable::new(operation, "connection refused").into())
}

#[async_trait]
impl SightingStore for UnavailableStore {
    fn backend(&self) -> &'static str {
        "unavailable"
    }

    async fn query(&self, _query: &SightingQuery) -> StoreResult<SightingPage> {
        down("query")
    }

    async fn create(&self, _input: &CreateSighting) -> StoreResult<Sighting> {
        down("create")
    }

    async fn find_by_id(&self, _id: DbId) -> StoreResult<Option<Sighting>> {
        down("find_by_id")
    }

    async fn plate_counts(
        &self,
        _filter: &SightingFilter,
        _limit: i64,
    ) -> StoreResult<Vec<PlateCount>> {
        down("plate_counts")
    }

    async fn tracks(&self, _filter: &SightingFilter) -> StoreResult<Vec<PlateTrack>> {
        down("tracks")
    }

    async fn ping(&self) -> StoreResult<()> {
        down("ping")
    }

    async fn close(&self) {}
}

/// A reachable store that rejects every call, as a database would on a
/// violated constraint or malformed data.
pub struct RejectingStore {
    pub constraint: Option<String>,
}

impl RejectingStore {
    fn reject<T>(&self, operation: &'static str) -> StoreResult<T> {
        Err(StoreError::Failed {
            operation,
            constraint: self.constraint.clone(),
            reason: "new row violates check constraint".to_string(),
        })
    }
}

#[async_trait]
impl SightingStore for RejectingStore {
    fn backend(&self) -> &'static str {
        "rejecting"
    }

    async fn query(&self, _query: &SightingQuery) -> StoreResult<SightingPage> {
        self.reject("query")
    }

    async fn create(&self, _input: &CreateSighting) -> StoreResult<Sighting> {
        self.reject("create")
    }

    async fn find_by_id(&self, _id: DbId) -> StoreResult<Option<Sighting>> {
        self.reject("find_by_id")
    }

    async fn plate_counts(
        &self,
        _filter: &SightingFilter,
        _limit: i64,
    ) -> StoreResult<Vec<PlateCount>> {
        self.reject("plate_counts")
    }

    async fn tracks(&self, _filter: &SightingFilter) -> StoreResult<Vec<PlateTrack>> {
        self.reject("tracks")
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn close(&self) {}
}
