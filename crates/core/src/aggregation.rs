//! Dashboard aggregations over sightings: per-plate counts and map tracks.
//!
//! Both the Postgres and in-memory stores feed raw rows through these
//! functions so ranking and grouping rules are identical across backends.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::search::plate_key;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Plate counts
// ---------------------------------------------------------------------------

/// How often a plate was sighted, relative to the most-sighted plate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateCount {
    pub plate_number: String,
    pub count: i64,
    /// `count` as a percentage of the top plate's count, one decimal place.
    pub percentage: f64,
}

/// Merge raw `(plate, count)` pairs by plate key, rank them by count DESC then
/// plate ASC, keep the first `limit`, and attach percentages.
pub fn rank_plate_counts<I>(raw: I, limit: usize) -> Vec<PlateCount>
where
    I: IntoIterator<Item = (String, i64)>,
{
    let mut merged: BTreeMap<String, i64> = BTreeMap::new();
    for (plate, count) in raw {
        *merged.entry(plate_key(&plate)).or_insert(0) += count;
    }

    let mut ranked: Vec<(String, i64)> = merged.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);

    let top = ranked.first().map_or(0, |(_, count)| *count);
    ranked
        .into_iter()
        .map(|(plate_number, count)| PlateCount {
            percentage: percentage_of(count, top),
            plate_number,
            count,
        })
        .collect()
}

fn percentage_of(count: i64, top: i64) -> f64 {
    if top <= 0 {
        return 0.0;
    }
    let pct = count as f64 / top as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Tracks
// ---------------------------------------------------------------------------

/// One geocoded sighting on a plate's path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPoint {
    pub sighting_id: DbId,
    pub timestamp: Timestamp,
    pub latitude: f64,
    pub longitude: f64,
    pub location: Option<String>,
}

/// The time-ordered path of a single plate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateTrack {
    pub plate_number: String,
    pub points: Vec<TrackPoint>,
}

/// Group `(plate, point)` pairs into one track per plate key.
///
/// Tracks are ordered by plate; points by timestamp ASC then id ASC.
pub fn group_tracks<I>(points: I) -> Vec<PlateTrack>
where
    I: IntoIterator<Item = (String, TrackPoint)>,
{
    let mut by_plate: BTreeMap<String, Vec<TrackPoint>> = BTreeMap::new();
    for (plate, point) in points {
        by_plate.entry(plate_key(&plate)).or_default().push(point);
    }

    by_plate
        .into_iter()
        .map(|(plate_number, mut points)| {
            points.sort_by(|a, b| {
                a.timestamp
                    .cmp(&b.timestamp)
                    .then_with(|| a.sighting_id.cmp(&b.sighting_id))
            });
            PlateTrack {
                plate_number,
                points,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn point(id: DbId, hour: u32) -> TrackPoint {
        TrackPoint {
            sighting_id: id,
            timestamp: Utc.with_ymd_and_hms(2023, 11, 15, hour, 0, 0).unwrap(),
            latitude: 40.7,
            longitude: -74.0,
            location: None,
        }
    }

    #[test]
    fn counts_are_ranked_with_percentages() {
        let ranked = rank_plate_counts(
            vec![
                ("XYZ789".to_string(), 36),
                ("ABC123".to_string(), 42),
                ("DEF456".to_string(), 28),
            ],
            5,
        );
        assert_eq!(ranked[0].plate_number, "ABC123");
        assert_eq!(ranked[0].percentage, 100.0);
        assert_eq!(ranked[1].percentage, 85.7);
        assert_eq!(ranked[2].percentage, 66.7);
    }

    #[test]
    fn counts_merge_case_variants() {
        let ranked = rank_plate_counts(
            vec![("kaa 123a".to_string(), 2), ("KAA 123A".to_string(), 3)],
            5,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].plate_number, "KAA 123A");
        assert_eq!(ranked[0].count, 5);
    }

    #[test]
    fn count_ties_break_alphabetically_and_truncate() {
        let ranked = rank_plate_counts(
            vec![
                ("BBB".to_string(), 4),
                ("AAA".to_string(), 4),
                ("CCC".to_string(), 1),
            ],
            2,
        );
        let plates: Vec<_> = ranked.iter().map(|p| p.plate_number.as_str()).collect();
        assert_eq!(plates, ["AAA", "BBB"]);
    }

    #[test]
    fn empty_counts_yield_empty_ranking() {
        assert!(rank_plate_counts(Vec::new(), 5).is_empty());
    }

    #[test]
    fn tracks_group_by_plate_in_time_order() {
        let tracks = group_tracks(vec![
            ("xyz789".to_string(), point(4, 12)),
            ("ABC123".to_string(), point(2, 9)),
            ("ABC123".to_string(), point(1, 14)),
            ("XYZ789".to_string(), point(3, 8)),
        ]);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].plate_number, "ABC123");
        let ids: Vec<_> = tracks[0].points.iter().map(|p| p.sighting_id).collect();
        assert_eq!(ids, [2, 1]);
        let ids: Vec<_> = tracks[1].points.iter().map(|p| p.sighting_id).collect();
        assert_eq!(ids, [3, 4]);
    }
}
