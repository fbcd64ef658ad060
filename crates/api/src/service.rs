//! The sighting query service and its degraded-mode policy.
//!
//! Validation always runs first, so bad input is rejected the same way in
//! both modes. When the store is unavailable, reads are answered from the
//! fixed fallback dataset and writes are acknowledged without being
//! persisted. A store that is reachable but rejects the request is an error,
//! never a degraded response. Both outcomes are distinct typed variants so handlers can flag
//! them to the caller.

use std::sync::Arc;

use platewatch_core::aggregation::{PlateCount, PlateTrack};
use platewatch_core::error::CoreError;
use platewatch_core::types::DbId;
use platewatch_db::fallback;
use platewatch_db::models::sighting::{
    CreateSighting, CreateSightingRequest, Sighting, SightingFilter, SightingPage, SightingQuery,
};
use platewatch_db::models::sighting::constraint_field;
use platewatch_db::store::{SightingStore, StoreError, StoreUnavailable};

/// A read result, tagged with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Served<T> {
    /// Answered by the backing store.
    Live(T),
    /// Answered from fallback data because the store was unavailable.
    Degraded(T),
}

impl<T> Served<T> {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Served::Degraded(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Served::Live(v) | Served::Degraded(v) => v,
        }
    }
}

/// Outcome of a create request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Created {
    /// Stored durably with an assigned id.
    Persisted(Sighting),
    /// Accepted while the store was unavailable; nothing was stored.
    Acknowledged(CreateSighting),
}

/// Query and create operations over an injected [`SightingStore`].
#[derive(Clone)]
pub struct SightingService {
    store: Arc<dyn SightingStore>,
}

impl SightingService {
    pub fn new(store: Arc<dyn SightingStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn SightingStore> {
        &self.store
    }

    /// Matching sightings for one page, with the total match count.
    pub async fn query(&self, query: &SightingQuery) -> Result<Served<SightingPage>, CoreError> {
        serve(self.store.query(query).await, || {
            fallback::fallback_page(&query.page)
        })
    }

    /// Validate and store a new sighting.
    pub async fn create(&self, request: CreateSightingRequest) -> Result<Created, CoreError> {
        let input = request.validate()?;

        match self.store.create(&input).await {
            Ok(sighting) => {
                tracing::info!(
                    id = sighting.id,
                    plate_number = %sighting.plate_number,
                    video_id = %sighting.video_id,
                    "Sighting created",
                );
                Ok(Created::Persisted(sighting))
            }
            Err(StoreError::Unavailable(err)) => {
                log_degraded(&err);
                Ok(Created::Acknowledged(input))
            }
            Err(err) => Err(rejected(err)),
        }
    }

    /// A single sighting by id.
    pub async fn get(&self, id: DbId) -> Result<Served<Sighting>, CoreError> {
        let found = match self.store.find_by_id(id).await {
            Ok(found) => found.map(Served::Live),
            Err(StoreError::Unavailable(err)) => {
                log_degraded(&err);
                fallback::fallback_find(id).map(Served::Degraded)
            }
            Err(err) => return Err(rejected(err)),
        };
        found.ok_or(CoreError::NotFound {
            entity: "Sighting",
            id,
        })
    }

    /// Most-sighted plates among matching sightings.
    pub async fn top_plates(
        &self,
        filter: &SightingFilter,
        limit: i64,
    ) -> Result<Served<Vec<PlateCount>>, CoreError> {
        serve(self.store.plate_counts(filter, limit).await, || {
            fallback::fallback_plate_counts(limit)
        })
    }

    /// Per-plate geocoded paths of matching sightings.
    pub async fn tracks(&self, filter: &SightingFilter) -> Result<Served<Vec<PlateTrack>>, CoreError> {
        serve(self.store.tracks(filter).await, fallback::fallback_tracks)
    }

    /// Whether the store answered a ping.
    pub async fn store_healthy(&self) -> bool {
        self.store.ping().await.is_ok()
    }
}

/// Live result, fallback on unavailability, error on rejection.
fn serve<T>(result: Result<T, StoreError>, fallback: impl FnOnce() -> T) -> Result<Served<T>, CoreError> {
    match result {
        Ok(value) => Ok(Served::Live(value)),
        Err(StoreError::Unavailable(err)) => {
            log_degraded(&err);
            Ok(Served::Degraded(fallback()))
        }
        Err(err) => Err(rejected(err)),
    }
}

/// A store rejection becomes a validation error when a known CHECK
/// constraint names the field, otherwise an internal error.
fn rejected(err: StoreError) -> CoreError {
    if let StoreError::Failed {
        constraint: Some(constraint),
        ..
    } = &err
    {
        if let Some(field) = constraint_field(constraint) {
            return CoreError::validation(field, format!("{field} was rejected by the store"));
        }
    }
    CoreError::Internal(err.to_string())
}

fn log_degraded(err: &StoreUnavailable) {
    tracing::warn!(
        operation = err.operation,
        reason = %err.reason,
        "Sighting store unavailable, serving degraded response",
    );
}
