//! The sighting store abstraction.
//!
//! The API depends on [`SightingStore`] rather than on a pool directly. A
//! single store is built at startup and shared behind an `Arc`; every backend
//! failure is translated into a [`StoreError`] at this boundary so callers
//! never see raw driver errors.

use async_trait::async_trait;
use platewatch_core::aggregation::{group_tracks, rank_plate_counts, PlateCount, PlateTrack, TrackPoint};
use platewatch_core::types::DbId;

use crate::models::sighting::{CreateSighting, Sighting, SightingFilter, SightingPage, SightingQuery};

mod memory;
mod postgres;

pub use memory::InMemorySightingStore;
pub use postgres::PgSightingStore;

/// The backing store could not be reached.
#[derive(Debug, Clone, thiserror::Error)]
#[error("sighting store unavailable during {operation}: {reason}")]
pub struct StoreUnavailable {
    /// Store operation that failed (e.g. `"query"`).
    pub operation: &'static str,
    /// Driver-level cause. Logged, never sent to clients.
    pub reason: String,
}

impl StoreUnavailable {
    pub fn new(operation: &'static str, reason: impl Into<String>) -> Self {
        Self {
            operation,
            reason: reason.into(),
        }
    }
}

/// A failed store call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Infrastructure failure: the caller should serve a degraded response.
    #[error(transparent)]
    Unavailable(#[from] StoreUnavailable),

    /// The store was reachable but rejected the request (bad data, a
    /// violated constraint, or a decoding bug). Never degraded.
    #[error("sighting store rejected {operation}: {reason}")]
    Failed {
        operation: &'static str,
        /// Violated constraint name, when the database reported one.
        constraint: Option<String>,
        reason: String,
    },
}

impl StoreError {
    /// Classify a sqlx error, logging the underlying cause.
    ///
    /// Connection, pool and server-availability errors are
    /// [`StoreError::Unavailable`]; data exceptions (SQLSTATE class 22),
    /// integrity violations (class 23) and everything else are
    /// [`StoreError::Failed`].
    pub fn from_sqlx(operation: &'static str, err: sqlx::Error) -> Self {
        if is_infrastructure(&err) {
            tracing::warn!(operation, error = %err, "Sighting store unreachable");
            return StoreUnavailable::new(operation, err.to_string()).into();
        }

        tracing::error!(operation, error = %err, "Sighting store rejected request");
        let constraint = match &err {
            sqlx::Error::Database(db_err) => db_err.constraint().map(str::to_string),
            _ => None,
        };
        StoreError::Failed {
            operation,
            constraint,
            reason: err.to_string(),
        }
    }
}

/// SQLSTATE classes that mean the server cannot serve requests right now:
/// connection exception, invalid authorization, invalid catalog, transaction
/// rollback, insufficient resources, operator intervention, system error and
/// internal error.
const UNAVAILABLE_SQLSTATE_CLASSES: &[&str] = &["08", "28", "3D", "40", "53", "57", "58", "XX"];

fn is_infrastructure(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db_err) => db_err
            .code()
            .is_some_and(|code| UNAVAILABLE_SQLSTATE_CLASSES.iter().any(|class| code.starts_with(class))),
        _ => false,
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations needed by the sighting service.
#[async_trait]
pub trait SightingStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// One page of matching sightings plus the total match count.
    async fn query(&self, query: &SightingQuery) -> StoreResult<SightingPage>;

    /// Persist a validated sighting and return it with its assigned id.
    async fn create(&self, input: &CreateSighting) -> StoreResult<Sighting>;

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Sighting>>;

    /// Most-sighted plates among matching sightings.
    async fn plate_counts(&self, filter: &SightingFilter, limit: i64)
        -> StoreResult<Vec<PlateCount>>;

    /// Geocoded paths of matching sightings, one per plate.
    async fn tracks(&self, filter: &SightingFilter) -> StoreResult<Vec<PlateTrack>>;

    /// Check the store is reachable.
    async fn ping(&self) -> StoreResult<()>;

    /// Release backend resources on shutdown.
    async fn close(&self);
}

// ---------------------------------------------------------------------------
// Shared shaping helpers
// ---------------------------------------------------------------------------

/// Rank raw per-plate counts, keeping at most `limit` plates.
pub(crate) fn rank_counts(raw: Vec<(String, i64)>, limit: i64) -> Vec<PlateCount> {
    rank_plate_counts(raw, usize::try_from(limit).unwrap_or(0))
}

/// Group geocoded sightings into per-plate tracks; others are skipped.
pub fn tracks_from<'a, I>(sightings: I) -> Vec<PlateTrack>
where
    I: IntoIterator<Item = &'a Sighting>,
{
    group_tracks(sightings.into_iter().filter_map(|s| {
        let (latitude, longitude) = s.coordinates()?;
        Some((
            s.plate_number.clone(),
            TrackPoint {
                sighting_id: s.id,
                timestamp: s.timestamp,
                latitude,
                longitude,
                location: s.location.clone(),
            },
        ))
    }))
}
