use crate::types::{DbId, Timestamp};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed on {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Invalid range: startDate {start} is after endDate {end}")]
    InvalidRange { start: Timestamp, end: Timestamp },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::Validation`] on a named field.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        CoreError::Validation {
            field,
            message: message.into(),
        }
    }

    /// The request field this error refers to, if any.
    ///
    /// Inverted ranges are reported against `startDate`.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            CoreError::Validation { field, .. } => Some(field),
            CoreError::InvalidRange { .. } => Some("startDate"),
            CoreError::NotFound { .. } | CoreError::Internal(_) => None,
        }
    }
}
