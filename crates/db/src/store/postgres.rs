//! Postgres-backed sighting store.

use async_trait::async_trait;
use platewatch_core::aggregation::{PlateCount, PlateTrack};
use platewatch_core::search::MAX_TRACK_POINTS;
use platewatch_core::types::DbId;

use super::{rank_counts, tracks_from, SightingStore, StoreError, StoreResult};
use crate::models::sighting::{CreateSighting, Sighting, SightingFilter, SightingPage, SightingQuery};
use crate::repositories::SightingRepo;
use crate::DbPool;

/// Wraps the shared connection pool. Cloning shares the pool.
#[derive(Clone)]
pub struct PgSightingStore {
    pool: DbPool,
}

impl PgSightingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl SightingStore for PgSightingStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn query(&self, query: &SightingQuery) -> StoreResult<SightingPage> {
        let (records, total) = SightingRepo::page(&self.pool, query)
            .await
            .map_err(|e| StoreError::from_sqlx("query", e))?;

        Ok(SightingPage { records, total })
    }

    async fn create(&self, input: &CreateSighting) -> StoreResult<Sighting> {
        SightingRepo::create(&self.pool, input)
            .await
            .map_err(|e| StoreError::from_sqlx("create", e))
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Sighting>> {
        SightingRepo::find_by_id(&self.pool, id)
            .await
            .map_err(|e| StoreError::from_sqlx("find_by_id", e))
    }

    async fn plate_counts(
        &self,
        filter: &SightingFilter,
        limit: i64,
    ) -> StoreResult<Vec<PlateCount>> {
        let raw = SightingRepo::plate_counts(&self.pool, filter, limit)
            .await
            .map_err(|e| StoreError::from_sqlx("plate_counts", e))?;
        Ok(rank_counts(raw, limit))
    }

    async fn tracks(&self, filter: &SightingFilter) -> StoreResult<Vec<PlateTrack>> {
        let rows = SightingRepo::geocoded(&self.pool, filter, MAX_TRACK_POINTS)
            .await
            .map_err(|e| StoreError::from_sqlx("tracks", e))?;
        Ok(tracks_from(&rows))
    }

    async fn ping(&self) -> StoreResult<()> {
        crate::health_check(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx("ping", e))
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Postgres sighting store closed");
    }
}
