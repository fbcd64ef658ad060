//! Date-range filters for sighting queries.
//!
//! Bounds are inclusive absolute instants. A bound may be given as an RFC 3339
//! date-time or as a bare `YYYY-MM-DD` UTC date, and the dashboard's
//! "time range" presets resolve to bounds relative to the request instant.

use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Which end of a range a bare date is expanded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    /// Start of the UTC day.
    Start,
    /// Last microsecond of the UTC day.
    End,
}

/// Parse a strict RFC 3339 date-time (used for sighting timestamps).
pub fn parse_timestamp(raw: &str, field: &'static str) -> Result<Timestamp, CoreError> {
    chrono::DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            CoreError::validation(field, format!("{field} must be an RFC 3339 date-time: {e}"))
        })
}

/// Parse a range bound: RFC 3339, or a bare date expanded per `kind`.
pub fn parse_bound(raw: &str, kind: BoundKind, field: &'static str) -> Result<Timestamp, CoreError> {
    let raw = raw.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        CoreError::validation(
            field,
            format!("{field} must be an RFC 3339 date-time or a YYYY-MM-DD date, got '{raw}'"),
        )
    })?;
    Ok(match kind {
        BoundKind::Start => start_of_day(date),
        BoundKind::End => end_of_day(date),
    })
}

fn start_of_day(date: NaiveDate) -> Timestamp {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn end_of_day(date: NaiveDate) -> Timestamp {
    start_of_day(date) + Duration::days(1) - Duration::microseconds(1)
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

/// Time-range presets offered by the search form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRangePreset {
    All,
    Today,
    Yesterday,
    Week,
    Month,
    Custom,
}

impl FromStr for TimeRangePreset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "yesterday" => Ok(Self::Yesterday),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "custom" => Ok(Self::Custom),
            other => Err(CoreError::validation(
                "timeRange",
                format!(
                    "timeRange must be one of all, today, yesterday, week, month, custom; got '{other}'"
                ),
            )),
        }
    }
}

impl TimeRangePreset {
    /// Resolve to concrete bounds, or `None` when the preset defers to
    /// explicit dates (`all`, `custom`).
    pub fn resolve(self, now: Timestamp) -> Option<DateRange> {
        let today = start_of_day(now.date_naive());
        let (start, end) = match self {
            Self::All | Self::Custom => return None,
            Self::Today => (today, now),
            Self::Yesterday => (
                today - Duration::days(1),
                today - Duration::microseconds(1),
            ),
            Self::Week => (now - Duration::days(7), now),
            Self::Month => (now - Duration::days(30), now),
        };
        Some(DateRange {
            start: Some(start),
            end: Some(end),
        })
    }
}

// ---------------------------------------------------------------------------
// Resolved range
// ---------------------------------------------------------------------------

/// Inclusive `[start, end]` bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl DateRange {
    /// Build a range from raw request values.
    ///
    /// Parse errors name the offending field; a preset combined with explicit
    /// dates is rejected on `timeRange`; an inverted range fails with
    /// [`CoreError::InvalidRange`].
    pub fn from_params(
        start_date: Option<&str>,
        end_date: Option<&str>,
        time_range: Option<&str>,
        now: Timestamp,
    ) -> Result<Self, CoreError> {
        let start = start_date
            .map(|raw| parse_bound(raw, BoundKind::Start, "startDate"))
            .transpose()?;
        let end = end_date
            .map(|raw| parse_bound(raw, BoundKind::End, "endDate"))
            .transpose()?;

        let preset = time_range
            .map(TimeRangePreset::from_str)
            .transpose()?
            .and_then(|p| p.resolve(now));

        let range = match preset {
            Some(_) if start.is_some() || end.is_some() => {
                return Err(CoreError::validation(
                    "timeRange",
                    "timeRange presets cannot be combined with startDate/endDate; use timeRange=custom",
                ));
            }
            Some(resolved) => resolved,
            None => DateRange { start, end },
        };

        range.check_order()?;
        Ok(range)
    }

    fn check_order(&self) -> Result<(), CoreError> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(CoreError::InvalidRange { start, end });
            }
        }
        Ok(())
    }

    /// Whether `ts` falls inside the inclusive bounds.
    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start.map_or(true, |start| start <= ts) && self.end.map_or(true, |end| ts <= end)
    }
}
