//! In-process sighting store for local development and tests.
//!
//! Evaluates filters with [`SightingFilter::matches`], the in-process twin of
//! the SQL `WHERE` clause, so behaviour matches the Postgres store.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use platewatch_core::aggregation::{PlateCount, PlateTrack};
use platewatch_core::search::{plate_key, MAX_TRACK_POINTS};
use platewatch_core::types::DbId;
use tokio::sync::RwLock;

use super::{rank_counts, tracks_from, SightingStore, StoreResult};
use crate::models::sighting::{CreateSighting, Sighting, SightingFilter, SightingPage, SightingQuery};

#[derive(Default)]
pub struct InMemorySightingStore {
    rows: RwLock<Vec<Sighting>>,
    next_id: AtomicI64,
}

impl InMemorySightingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing rows. New ids continue after the largest.
    pub fn with_rows(rows: Vec<Sighting>) -> Self {
        let max_id = rows.iter().map(|s| s.id).max().unwrap_or(0);
        Self {
            rows: RwLock::new(rows),
            next_id: AtomicI64::new(max_id),
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    /// Matching rows, sorted most recent first.
    async fn matching(&self, filter: &SightingFilter) -> Vec<Sighting> {
        let rows = self.rows.read().await;
        let mut matched: Vec<Sighting> = rows.iter().filter(|s| filter.matches(s)).cloned().collect();
        matched.sort_by(Sighting::recent_first);
        matched
    }
}

#[async_trait]
impl SightingStore for InMemorySightingStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn query(&self, query: &SightingQuery) -> StoreResult<SightingPage> {
        let matched = self.matching(&query.filter).await;
        let total = i64::try_from(matched.len()).unwrap_or(i64::MAX);
        let (start, end) = query.page.bounds(matched.len());

        Ok(SightingPage {
            records: matched[start..end].to_vec(),
            total,
        })
    }

    async fn create(&self, input: &CreateSighting) -> StoreResult<Sighting> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let sighting = Sighting {
            id,
            plate_number: input.plate_number.clone(),
            confidence: input.confidence,
            timestamp: input.timestamp,
            location: input.location.clone(),
            latitude: input.latitude,
            longitude: input.longitude,
            image_url: input.image_url.clone(),
            video_id: input.video_id.clone(),
            created_at: Utc::now(),
        };
        self.rows.write().await.push(sighting.clone());
        Ok(sighting)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Sighting>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|s| s.id == id).cloned())
    }

    async fn plate_counts(
        &self,
        filter: &SightingFilter,
        limit: i64,
    ) -> StoreResult<Vec<PlateCount>> {
        let raw = self
            .matching(filter)
            .await
            .into_iter()
            .map(|s| (plate_key(&s.plate_number), 1));
        Ok(rank_counts(raw.collect(), limit))
    }

    async fn tracks(&self, filter: &SightingFilter) -> StoreResult<Vec<PlateTrack>> {
        let mut geocoded: Vec<Sighting> = self
            .matching(filter)
            .await
            .into_iter()
            .filter(|s| s.coordinates().is_some())
            .collect();
        // Oldest first, as the Postgres store caps the same way.
        geocoded.reverse();
        geocoded.truncate(usize::try_from(MAX_TRACK_POINTS).unwrap_or(usize::MAX));
        Ok(tracks_from(&geocoded))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn close(&self) {
        let rows = self.len().await;
        tracing::info!(rows, "In-memory sighting store closed");
    }
}
