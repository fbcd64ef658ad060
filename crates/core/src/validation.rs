//! Shared field validation helpers.
//!
//! Each helper returns a [`CoreError::Validation`] naming the offending field
//! so the API layer can report it back to the caller.

use url::Url;

use crate::error::CoreError;

/// Validate that a value falls within `[0.0, 1.0]`.
///
/// Values outside the range (and NaN) are rejected, never clamped.
pub fn validate_unit_range(value: f64, field: &'static str) -> Result<(), CoreError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CoreError::validation(
            field,
            format!("{field} must be between 0.0 and 1.0, got {value}"),
        ));
    }
    Ok(())
}

/// Validate that a value falls within `[min, max]`.
pub fn validate_range(
    value: f64,
    min: f64,
    max: f64,
    field: &'static str,
) -> Result<(), CoreError> {
    if !(min..=max).contains(&value) {
        return Err(CoreError::validation(
            field,
            format!("{field} must be between {min} and {max}, got {value}"),
        ));
    }
    Ok(())
}

/// Return a required value or a "required" validation error.
pub fn require<T>(value: Option<T>, field: &'static str) -> Result<T, CoreError> {
    value.ok_or_else(|| CoreError::validation(field, format!("{field} is required")))
}

/// Validate a minimum character count (not byte count).
pub fn validate_min_chars(value: &str, min: usize, field: &'static str) -> Result<(), CoreError> {
    if value.chars().count() < min {
        return Err(CoreError::validation(
            field,
            format!("{field} must be at least {min} characters"),
        ));
    }
    Ok(())
}

/// Validate that a string is a well-formed absolute URL with a host.
pub fn validate_url(value: &str, field: &'static str) -> Result<(), CoreError> {
    let parsed = Url::parse(value)
        .map_err(|e| CoreError::validation(field, format!("{field} is not a valid URL: {e}")))?;

    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
        return Err(CoreError::validation(
            field,
            format!("{field} must be an absolute URL with a host"),
        ));
    }
    Ok(())
}

/// Reject text containing NUL characters, which PostgreSQL cannot store.
pub fn validate_no_nul(value: &str, field: &'static str) -> Result<(), CoreError> {
    if value.contains('\0') {
        return Err(CoreError::validation(
            field,
            format!("{field} must not contain NUL characters"),
        ));
    }
    Ok(())
}

/// Treat empty or whitespace-only optional text as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn accepts_boundary_values() {
        assert!(validate_unit_range(0.0, "confidence").is_ok());
        assert!(validate_unit_range(0.5, "confidence").is_ok());
        assert!(validate_unit_range(1.0, "confidence").is_ok());
    }

    #[test]
    fn rejects_below_zero() {
        assert!(validate_unit_range(-0.01, "confidence").is_err());
    }

    #[test]
    fn rejects_above_one_naming_the_field() {
        let err = validate_unit_range(1.5, "confidence").unwrap_err();
        assert_matches!(err, CoreError::Validation { field: "confidence", .. });
    }

    #[test]
    fn rejects_nan() {
        assert!(validate_unit_range(f64::NAN, "confidence").is_err());
    }

    #[test]
    fn range_checks_inclusive_bounds() {
        assert!(validate_range(-90.0, -90.0, 90.0, "latitude").is_ok());
        assert!(validate_range(90.0, -90.0, 90.0, "latitude").is_ok());
        assert!(validate_range(90.1, -90.0, 90.0, "latitude").is_err());
    }

    #[test]
    fn min_chars_counts_characters() {
        assert!(validate_min_chars("AB", 2, "plateNumber").is_ok());
        assert!(validate_min_chars("A", 2, "plateNumber").is_err());
        assert!(validate_min_chars("ÄÖ", 2, "plateNumber").is_ok());
    }

    #[test]
    fn url_requires_absolute_form() {
        assert!(validate_url("https://cdn.example.com/img/1.jpg", "imageUrl").is_ok());
        assert!(validate_url("not a url", "imageUrl").is_err());
        assert!(validate_url("/relative/path.jpg", "imageUrl").is_err());
        assert!(validate_url("mailto:ops@example.com", "imageUrl").is_err());
    }

    #[test]
    fn nul_characters_are_rejected() {
        let err = validate_no_nul("AB\u{0}", "plateNumber").unwrap_err();
        assert_matches!(err, CoreError::Validation { field: "plateNumber", .. });
        assert!(validate_no_nul("KAA 123A", "plateNumber").is_ok());
    }

    #[test]
    fn non_blank_drops_empty_values() {
        assert_eq!(non_blank(Some("".into())), None);
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" abc ".into())), Some("abc".to_string()));
        assert_eq!(non_blank(None), None);
    }
}
