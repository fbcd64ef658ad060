//! Query parameter types for the sighting endpoints.
//!
//! Values arrive as raw key/value pairs and are validated here, so a bad or
//! repeated `limit` or date is reported against its own field instead of as
//! a generic deserialization failure. Unknown keys are ignored.

use platewatch_core::error::CoreError;
use platewatch_core::search::{parse_limit, PageWindow, DEFAULT_TOP_PLATES_LIMIT, MAX_TOP_PLATES_LIMIT};
use platewatch_core::time_range::DateRange;
use platewatch_core::types::Timestamp;
use platewatch_core::validation::{non_blank, validate_no_nul};
use platewatch_db::models::sighting::{SightingFilter, SightingQuery};

/// `?plateNumber=&location=&startDate=&endDate=&timeRange=&limit=&offset=`
#[derive(Debug, Clone, Default)]
pub struct SightingQueryParams {
    pub plate_number: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub time_range: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl SightingQueryParams {
    /// Collect decoded query pairs, rejecting a repeated known key.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let (slot, field) = match key.as_str() {
                "plateNumber" => (&mut params.plate_number, "plateNumber"),
                "location" => (&mut params.location, "location"),
                "startDate" => (&mut params.start_date, "startDate"),
                "endDate" => (&mut params.end_date, "endDate"),
                "timeRange" => (&mut params.time_range, "timeRange"),
                "limit" => (&mut params.limit, "limit"),
                "offset" => (&mut params.offset, "offset"),
                _ => continue,
            };
            if slot.is_some() {
                return Err(CoreError::validation(
                    field,
                    format!("{field} must be given at most once"),
                ));
            }
            *slot = Some(value);
        }
        Ok(params)
    }

    /// Validate the filter fields. Presets resolve relative to `now`.
    pub fn filter(&self, now: Timestamp) -> Result<SightingFilter, CoreError> {
        let range = DateRange::from_params(
            blank_to_none(&self.start_date),
            blank_to_none(&self.end_date),
            blank_to_none(&self.time_range),
            now,
        )?;

        for (value, field) in [(&self.plate_number, "plateNumber"), (&self.location, "location")] {
            if let Some(value) = value {
                validate_no_nul(value, field)?;
            }
        }

        Ok(SightingFilter {
            plate_number: non_blank(self.plate_number.clone()),
            location: non_blank(self.location.clone()),
            range,
        })
    }

    /// Validate filter and page window for `GET /sightings`.
    pub fn into_query(self, now: Timestamp) -> Result<SightingQuery, CoreError> {
        let filter = self.filter(now)?;
        let page = PageWindow::parse(self.limit.as_deref(), self.offset.as_deref())?;
        Ok(SightingQuery { filter, page })
    }

    /// Validate `limit` for the top-plates ranking (`offset` is ignored).
    pub fn top_plates_limit(&self) -> Result<i64, CoreError> {
        parse_limit(
            self.limit.as_deref(),
            DEFAULT_TOP_PLATES_LIMIT,
            Some(MAX_TOP_PLATES_LIMIT),
        )
    }
}

fn blank_to_none(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
