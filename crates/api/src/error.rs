use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use platewatch_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
/// Store outages never reach this type: the service turns them into
/// degraded responses. Store rejections arrive as [`CoreError`].
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `platewatch_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An internal error with a human-readable message (logged, not sent).
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Report an extractor rejection as a validation error on `field`.
    pub fn rejected(field: &'static str, rejection: impl std::fmt::Display) -> Self {
        AppError::Core(CoreError::validation(field, rejection.to_string()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let field = match &self {
            AppError::Core(core) => core.field(),
            AppError::InternalError(_) => None,
        };

        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation { message, .. } => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message.clone())
                }
                CoreError::InvalidRange { .. } => {
                    (StatusCode::BAD_REQUEST, "INVALID_RANGE", core.to_string())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = match field {
            Some(field) => json!({ "error": message, "code": code, "field": field }),
            None => json!({ "error": message, "code": code }),
        };

        (status, axum::Json(body)).into_response()
    }
}
