//! # API Error Types
//!
//! [`AppError`] implements `IntoResponse` and maps domain errors to HTTP
//! status codes with a JSON body of the form
//! `{"error": {"code", "message", "details"}}`. Internal error messages are
//! logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use testament_core::FieldError;
use testament_store::StoreError;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable code, e.g. `NOT_FOUND`, `INVALID_DRAFT`.
    pub code: String,
    pub message: String,
    /// Field errors for `INVALID_DRAFT`; absent otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Error, Debug)]
pub enum AppError {
    /// 404.
    #[error("not found: {0}")]
    NotFound(String),

    /// 422.
    #[error("validation error: {0}")]
    Validation(String),

    /// The draft failed validation (422). Carries the field errors.
    #[error("draft has {} invalid field(s)", .0.len())]
    InvalidDraft(Vec<FieldError>),

    /// 400.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// 409.
    #[error("conflict: {0}")]
    Conflict(String),

    /// 500. Logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::InvalidDraft(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_DRAFT"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let details = match self {
            Self::InvalidDraft(errors) => serde_json::to_value(errors).ok(),
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<testament_core::ValidationError> for AppError {
    fn from(err: testament_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::NotFound { .. } => Self::NotFound(err.to_string()),
            StoreError::KeyMismatch { .. } => Self::BadRequest(err.to_string()),
            StoreError::Corrupt { .. } | StoreError::Database(_) | StoreError::Migration(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}
