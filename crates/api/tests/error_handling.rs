//! Tests for `AppError` → HTTP response mapping.
//!
//! These tests verify that each `AppError` variant produces the correct HTTP
//! status code, error code, and message. They do NOT need an HTTP server --
//! they call `IntoResponse` directly on `AppError` values.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use platewatch_api::error::AppError;
use platewatch_core::error::CoreError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: CoreError::NotFound maps to 404 with NOT_FOUND code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Sighting",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Sighting with id 42 not found");
    assert!(json.get("field").is_none());
}

// ---------------------------------------------------------------------------
// Test: CoreError::Validation maps to 400 and names the field
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_error_returns_400_with_field() {
    let err = AppError::Core(CoreError::validation(
        "confidence",
        "confidence must be between 0 and 1",
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "confidence must be between 0 and 1");
    assert_eq!(json["field"], "confidence");
}

// ---------------------------------------------------------------------------
// Test: CoreError::InvalidRange maps to 400 against startDate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_range_returns_400_with_start_date_field() {
    let err = AppError::Core(CoreError::InvalidRange {
        start: Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2023, 11, 1, 0, 0, 0).unwrap(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_RANGE");
    assert_eq!(json["field"], "startDate");
    assert!(json["error"].as_str().unwrap().contains("after endDate"));
}

// ---------------------------------------------------------------------------
// Test: extractor rejections become validation errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rejection_maps_to_validation_error() {
    let err = AppError::rejected("body", "Failed to parse the request body as JSON");

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["field"], "body");
}

// ---------------------------------------------------------------------------
// Test: AppError::InternalError maps to 500 and sanitizes the message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("secret database credentials leaked".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");

    // The response body must NOT contain the underlying error details.
    let body_text = json.to_string();
    assert!(
        !body_text.contains("secret"),
        "Internal error response must not leak sensitive details"
    );
    assert_eq!(json["error"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// Test: CoreError::Internal maps to 500 and sanitizes like InternalError
// ---------------------------------------------------------------------------

#[tokio::test]
async fn core_internal_error_returns_500_and_sanitizes() {
    let err = AppError::Core(CoreError::Internal("panic stack trace here".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");

    let body_text = json.to_string();
    assert!(
        !body_text.contains("panic stack trace"),
        "Core internal error must not leak details"
    );
    assert_eq!(json["error"], "An internal error occurred");
}
