//! Application error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("not found")]
    NotFound,

    /// Authorization failure, including invalid or mismatched preview
    /// tokens. Deliberately opaque: the response never reveals which
    /// part of the request was rejected.
    #[error("forbidden")]
    Forbidden,

    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
}

impl AppError {
    /// Shorthand for a field-level validation failure.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            // A conflict that escapes the allocation retry loop is a bug
            // in the caller, not a user error.
            StoreError::SlugConflict => {
                AppError::Internal(anyhow::anyhow!("unresolved slug conflict"))
            }
            StoreError::Other(e) => AppError::Internal(e),
        }
    }
}

/// JSON error body returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        };

        let body = match self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                ErrorBody {
                    error: "internal server error".to_string(),
                    field: None,
                }
            }
            AppError::Validation { field, message } => ErrorBody {
                error: message,
                field: Some(field),
            },
            other => ErrorBody {
                error: other.to_string(),
                field: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
