//! Sighting entity models, DTOs and query filters.
//!
//! Sightings are immutable once created (no `updated_at`). Wire names are
//! camelCase to match the dashboard client.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use platewatch_core::error::CoreError;
use platewatch_core::search::{contains_ignore_case, PageWindow};
use platewatch_core::time_range::{parse_timestamp, DateRange};
use platewatch_core::types::{DbId, Timestamp};
use platewatch_core::validation::{
    require, validate_min_chars, validate_no_nul, validate_range, validate_unit_range,
    validate_url,
};

/// Minimum length of a plate number, in characters.
pub const MIN_PLATE_NUMBER_CHARS: usize = 2;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `sightings` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sighting {
    pub id: DbId,
    pub plate_number: String,
    pub confidence: f64,
    pub timestamp: Timestamp,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
    pub video_id: String,
    pub created_at: Timestamp,
}

impl Sighting {
    /// Listing order: `timestamp` DESC, then `id` DESC.
    pub fn recent_first(a: &Sighting, b: &Sighting) -> Ordering {
        b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id))
    }

    /// Both coordinates, when the sighting is geocoded.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

// ---------------------------------------------------------------------------
// Create DTOs
// ---------------------------------------------------------------------------

/// Raw `POST /sightings` body.
///
/// Fields stay untyped JSON here so that a missing or mistyped field is
/// reported against its own name by [`CreateSightingRequest::validate`]
/// rather than failing deserialization of the whole body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSightingRequest {
    pub plate_number: Option<Value>,
    pub confidence: Option<Value>,
    pub timestamp: Option<Value>,
    pub location: Option<Value>,
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
    pub image_url: Option<Value>,
    pub video_id: Option<Value>,
}

impl CreateSightingRequest {
    /// Validate into a [`CreateSighting`], failing on the first bad field.
    ///
    /// Checks run in this order:
    ///
    /// 1. presence of `plateNumber`, `videoId`, `timestamp`, `confidence`
    /// 2. JSON types of those four fields
    /// 3. `confidence` within `[0, 1]`
    /// 4. `timestamp` is RFC 3339
    /// 5. `imageUrl` is an absolute URL
    /// 6. `plateNumber` has at least [`MIN_PLATE_NUMBER_CHARS`] characters
    /// 7. `location`, `latitude`, `longitude`
    pub fn validate(self) -> Result<CreateSighting, CoreError> {
        let required = [
            (&self.plate_number, "plateNumber"),
            (&self.video_id, "videoId"),
            (&self.timestamp, "timestamp"),
            (&self.confidence, "confidence"),
        ];
        for (value, field) in required {
            if !is_present(value.as_ref()) {
                return Err(CoreError::validation(field, format!("{field} is required")));
            }
        }

        let plate_number = require(json_text(self.plate_number.as_ref(), "plateNumber")?, "plateNumber")?;
        let video_id = require(json_text(self.video_id.as_ref(), "videoId")?, "videoId")?;
        let raw_timestamp = require(json_text(self.timestamp.as_ref(), "timestamp")?, "timestamp")?;
        let confidence = require(json_number(self.confidence.as_ref(), "confidence")?, "confidence")?;

        validate_unit_range(confidence, "confidence")?;
        let timestamp = parse_timestamp(raw_timestamp, "timestamp")?;

        let image_url = json_text(self.image_url.as_ref(), "imageUrl")?;
        if let Some(url) = image_url {
            validate_url(url, "imageUrl")?;
        }

        validate_min_chars(plate_number, MIN_PLATE_NUMBER_CHARS, "plateNumber")?;

        let location = json_text(self.location.as_ref(), "location")?;
        let latitude = json_number(self.latitude.as_ref(), "latitude")?;
        if let Some(lat) = latitude {
            validate_range(lat, -90.0, 90.0, "latitude")?;
        }
        let longitude = json_number(self.longitude.as_ref(), "longitude")?;
        if let Some(lon) = longitude {
            validate_range(lon, -180.0, 180.0, "longitude")?;
        }

        Ok(CreateSighting {
            plate_number: plate_number.to_string(),
            confidence,
            timestamp,
            location: location.map(str::to_string),
            latitude,
            longitude,
            image_url: image_url.map(str::to_string),
            video_id: video_id.to_string(),
        })
    }
}

/// Present means non-null and, for strings, not blank.
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// Trimmed text, `None` when absent or blank. Non-strings are rejected.
fn json_text<'a>(value: Option<&'a Value>, field: &'static str) -> Result<Option<&'a str>, CoreError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            validate_no_nul(s, field)?;
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then_some(trimmed))
        }
        Some(_) => Err(CoreError::validation(field, format!("{field} must be a string"))),
    }
}

/// A JSON number as `f64`, `None` when absent. Non-numbers are rejected.
fn json_number(value: Option<&Value>, field: &'static str) -> Result<Option<f64>, CoreError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| CoreError::validation(field, format!("{field} is out of range"))),
        Some(_) => Err(CoreError::validation(field, format!("{field} must be a number"))),
    }
}

/// The request field guarded by a `sightings` CHECK constraint.
pub fn constraint_field(constraint: &str) -> Option<&'static str> {
    match constraint {
        "ck_sightings_plate_number_length" => Some("plateNumber"),
        "ck_sightings_confidence_range" => Some("confidence"),
        "ck_sightings_latitude_range" => Some("latitude"),
        "ck_sightings_longitude_range" => Some("longitude"),
        _ => None,
    }
}

/// A validated sighting ready for insertion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSighting {
    pub plate_number: String,
    pub confidence: f64,
    pub timestamp: Timestamp,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
    pub video_id: String,
}

// ---------------------------------------------------------------------------
// Query filters
// ---------------------------------------------------------------------------

/// Validated filter for sighting queries. Absent fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SightingFilter {
    /// Case-insensitive substring of `plate_number`.
    pub plate_number: Option<String>,
    /// Case-insensitive substring of `location`.
    pub location: Option<String>,
    /// Inclusive bounds on `timestamp`.
    pub range: DateRange,
}

impl SightingFilter {
    /// In-process evaluation of the filter, mirroring the SQL `WHERE` clause.
    pub fn matches(&self, sighting: &Sighting) -> bool {
        if let Some(plate) = &self.plate_number {
            if !contains_ignore_case(&sighting.plate_number, plate) {
                return false;
            }
        }
        if let Some(location) = &self.location {
            match &sighting.location {
                Some(loc) if contains_ignore_case(loc, location) => {}
                _ => return false,
            }
        }
        self.range.contains(sighting.timestamp)
    }
}

/// A filter plus the page window to return.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SightingQuery {
    pub filter: SightingFilter,
    pub page: PageWindow,
}

/// One page of sightings plus the total match count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SightingPage {
    pub records: Vec<Sighting>,
    /// Count of all records matching the filter, ignoring the page window.
    pub total: i64,
}
