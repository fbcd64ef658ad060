//! Response envelope types for the sighting endpoints.
//!
//! Every payload carries a `degraded` flag so callers can tell fallback data
//! from live data without inspecting records.

use platewatch_db::models::sighting::{Sighting, SightingPage};
use serde::Serialize;

use crate::service::Served;

/// `{ "data": T, "degraded": bool }` envelope for single-resource reads.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
    pub degraded: bool,
}

impl<T: Serialize> From<Served<T>> for DataResponse<T> {
    fn from(served: Served<T>) -> Self {
        let degraded = served.is_degraded();
        Self {
            data: served.into_inner(),
            degraded,
        }
    }
}

/// `GET /sightings` body: `{ records, total, degraded }`.
#[derive(Debug, Serialize)]
pub struct SightingListResponse {
    pub records: Vec<Sighting>,
    pub total: i64,
    pub degraded: bool,
}

impl From<Served<SightingPage>> for SightingListResponse {
    fn from(served: Served<SightingPage>) -> Self {
        let degraded = served.is_degraded();
        let SightingPage { records, total } = served.into_inner();
        Self {
            records,
            total,
            degraded,
        }
    }
}

/// `POST /sightings` body. `persisted: false` means nothing was stored.
#[derive(Debug, Serialize)]
pub struct CreateResponse<T: Serialize> {
    pub data: T,
    pub persisted: bool,
    pub degraded: bool,
}
