//! Error handling module.
//!
//! This module provides unified error handling with proper HTTP status code mapping
//! and standardized API error responses.

pub mod codes;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

pub use codes::ErrorCode;

/// Application-level error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed configuration input. Never retried.
    #[error("Invalid parameter {field}: {value:?}")]
    BadParameter {
        /// Offending field.
        field: &'static str,
        /// Offending value as supplied.
        value: String,
    },

    /// The requested amount exceeds the unused permutations of the space,
    /// or the collision walk ran out of slots mid-generation.
    #[error("Not enough permutations: {remaining} remaining, {requested} requested")]
    CapacityExceeded {
        /// Slots still available when the request was evaluated.
        remaining: u64,
        /// Amount asked for.
        requested: u64,
    },

    /// Request body could not be decoded.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AppError {
    /// Shorthand for [`AppError::BadParameter`].
    pub fn bad_parameter(field: &'static str, value: impl Into<String>) -> Self {
        Self::BadParameter {
            field,
            value: value.into(),
        }
    }

    /// Get the error code for this error.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::BadParameter { .. } => ErrorCode::INVALID_PARAM,
            Self::CapacityExceeded { .. } => ErrorCode::CAPACITY_EXCEEDED,
            Self::BadRequest(_) => ErrorCode::BAD_REQUEST,
            Self::NotFound(_) => ErrorCode::NOT_FOUND,
            Self::Storage(StorageError::Timeout(_)) => ErrorCode::SERVICE_UNAVAILABLE,
            Self::Storage(_) => ErrorCode::STORAGE_ERROR,
        }
    }

    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadParameter { .. } | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::CapacityExceeded { .. } => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::Timeout(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code().as_i32();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(
                error_code = code,
                status = %status,
                message = %message,
                "Request failed"
            );
        } else {
            tracing::warn!(
                error_code = code,
                status = %status,
                message = %message,
                "Request rejected"
            );
        }

        let body = Json(json!({
            "code": code,
            "message": message,
            "data": null
        }));

        (status, body).into_response()
    }
}

/// Storage-specific error type.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Lock acquisition failed.
    #[error("Failed to acquire lock: {0}")]
    LockFailed(String),

    /// A store call did not answer in time.
    #[error("Storage call timed out: {0}")]
    Timeout(String),

    /// File I/O error.
    #[error("File I/O error: {0}")]
    FileIO(String),

    /// Backend not available.
    #[error("Storage backend unavailable")]
    Unavailable,
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::FileIO(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias using `StorageError`.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
