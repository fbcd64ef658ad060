//! Sighting search constants and helpers.
//!
//! This module lives in `core` (zero internal deps) so the Postgres
//! repository, the in-memory store and the API layer all apply the same
//! pagination policy and text-matching rules.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of sightings per page.
pub const DEFAULT_SIGHTING_LIMIT: i64 = 100;

/// Default number of plates in the top-plates ranking.
pub const DEFAULT_TOP_PLATES_LIMIT: i64 = 5;

/// Maximum number of plates in the top-plates ranking.
pub const MAX_TOP_PLATES_LIMIT: i64 = 100;

/// Upper bound on geocoded points considered when building plate tracks.
pub const MAX_TRACK_POINTS: i64 = 5000;

// ---------------------------------------------------------------------------
// Pagination parsing
// ---------------------------------------------------------------------------

/// A validated `limit`/`offset` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SIGHTING_LIMIT,
            offset: 0,
        }
    }
}

impl PageWindow {
    /// Parse raw `limit`/`offset` query values.
    ///
    /// Unlike clamping, out-of-bounds values are rejected so callers learn
    /// that their request was not honoured as written.
    pub fn parse(limit: Option<&str>, offset: Option<&str>) -> Result<Self, CoreError> {
        Ok(Self {
            limit: parse_limit(limit, DEFAULT_SIGHTING_LIMIT, None)?,
            offset: parse_offset(offset)?,
        })
    }

    /// Slice bounds `[start, end)` of this window over `len` items.
    pub fn bounds(&self, len: usize) -> (usize, usize) {
        let start = usize::try_from(self.offset).unwrap_or(usize::MAX).min(len);
        let end = start
            .saturating_add(usize::try_from(self.limit).unwrap_or(usize::MAX))
            .min(len);
        (start, end)
    }
}

/// Parse a user-provided limit. Blank means `default`; must be positive and,
/// when `max` is given, at most `max`.
pub fn parse_limit(raw: Option<&str>, default: i64, max: Option<i64>) -> Result<i64, CoreError> {
    let Some(value) = parse_integer(raw, "limit")? else {
        return Ok(default);
    };
    if value <= 0 {
        return Err(CoreError::validation("limit", "limit must be greater than 0"));
    }
    if let Some(max) = max.filter(|max| value > *max) {
        return Err(CoreError::validation(
            "limit",
            format!("limit must be at most {max}"),
        ));
    }
    Ok(value)
}

/// Parse a user-provided offset. Blank means `0`; must be non-negative.
pub fn parse_offset(raw: Option<&str>) -> Result<i64, CoreError> {
    let value = parse_integer(raw, "offset")?.unwrap_or(0);
    if value < 0 {
        return Err(CoreError::validation("offset", "offset must be 0 or greater"));
    }
    Ok(value)
}

fn parse_integer(raw: Option<&str>, field: &'static str) -> Result<Option<i64>, CoreError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse::<i64>()
            .map(Some)
            .map_err(|_| CoreError::validation(field, format!("{field} must be an integer, got '{v}'"))),
    }
}

// ---------------------------------------------------------------------------
// Text matching
// ---------------------------------------------------------------------------

/// Escape `%`, `_` and `\` so user input is matched literally inside an
/// `ILIKE '%' || $n || '%'` pattern (PostgreSQL's default escape is `\`).
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Case-insensitive substring test, the in-process twin of `ILIKE '%needle%'`.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Grouping key for a plate: trimmed and upper-cased.
pub fn plate_key(plate_number: &str) -> String {
    plate_number.trim().to_uppercase()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
