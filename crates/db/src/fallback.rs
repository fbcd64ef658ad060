//! Fixed fallback dataset served while the store is unavailable.
//!
//! Every row carries [`FALLBACK_VIDEO_ID`] so it can never be mistaken for a
//! real detection, and responses built from it are flagged as degraded by the
//! API layer.

use chrono::{TimeZone, Utc};
use platewatch_core::aggregation::{PlateCount, PlateTrack};
use platewatch_core::search::PageWindow;
use platewatch_core::types::DbId;

use crate::models::sighting::{Sighting, SightingPage};
use crate::store::{rank_counts, tracks_from};

/// Source video id stamped on every fallback row.
pub const FALLBACK_VIDEO_ID: &str = "fallback-demo";

/// The demo sightings, most recent first.
pub fn fallback_sightings() -> Vec<Sighting> {
    let row = |id: DbId,
               plate: &str,
               confidence: f64,
               (month, day, hour, minute): (u32, u32, u32, u32),
               location: &str,
               (latitude, longitude): (f64, f64)| {
        let timestamp = Utc
            .with_ymd_and_hms(2023, month, day, hour, minute, 0)
            .single()
            .unwrap_or_default();
        Sighting {
            id,
            plate_number: plate.to_string(),
            confidence,
            timestamp,
            location: Some(location.to_string()),
            latitude: Some(latitude),
            longitude: Some(longitude),
            image_url: None,
            video_id: FALLBACK_VIDEO_ID.to_string(),
            created_at: timestamp,
        }
    };

    vec![
        row(3, "ABC123", 0.98, (11, 15, 14, 30), "Main St & 5th Ave", (40.7128, -74.006)),
        row(2, "XYZ789", 0.95, (11, 14, 9, 15), "Park Rd & Oak St", (40.7328, -73.986)),
        row(1, "DEF456", 0.92, (11, 12, 17, 45), "River Blvd & Pine Ave", (40.7228, -74.026)),
    ]
}

/// One window over the fallback set. Filters are not applied; `total` is
/// always the size of the whole set.
pub fn fallback_page(page: &PageWindow) -> SightingPage {
    let rows = fallback_sightings();
    let total = i64::try_from(rows.len()).unwrap_or(i64::MAX);
    let (start, end) = page.bounds(rows.len());
    SightingPage {
        records: rows[start..end].to_vec(),
        total,
    }
}

pub fn fallback_find(id: DbId) -> Option<Sighting> {
    fallback_sightings().into_iter().find(|s| s.id == id)
}

pub fn fallback_plate_counts(limit: i64) -> Vec<PlateCount> {
    let raw = fallback_sightings()
        .into_iter()
        .map(|s| (s.plate_number, 1))
        .collect();
    rank_counts(raw, limit)
}

pub fn fallback_tracks() -> Vec<PlateTrack> {
    tracks_from(&fallback_sightings())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_non_empty_and_labelled() {
        let page = fallback_page(&PageWindow::default());
        assert_eq!(page.total, 3);
        assert_eq!(page.records.len(), 3);
        assert!(page.records.iter().all(|s| s.video_id == FALLBACK_VIDEO_ID));
    }

    #[test]
    fn fallback_page_honours_window() {
        let page = fallback_page(&PageWindow { limit: 1, offset: 1 });
        assert_eq!(page.total, 3);
        let ids: Vec<_> = page.records.iter().map(|s| s.id).collect();
        assert_eq!(ids, [2]);

        let past_end = fallback_page(&PageWindow { limit: 10, offset: 5 });
        assert!(past_end.records.is_empty());
        assert_eq!(past_end.total, 3);
    }

    #[test]
    fn fallback_is_sorted_recent_first() {
        let rows = fallback_sightings();
        let mut sorted = rows.clone();
        sorted.sort_by(Sighting::recent_first);
        assert_eq!(rows, sorted);
    }

    #[test]
    fn fallback_lookup_by_id() {
        assert_eq!(fallback_find(2).map(|s| s.plate_number), Some("XYZ789".into()));
        assert!(fallback_find(99).is_none());
    }

    #[test]
    fn fallback_aggregates() {
        assert_eq!(fallback_plate_counts(2).len(), 2);
        assert_eq!(fallback_tracks().len(), 3);
    }
}
