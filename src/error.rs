//! Error types for smartcert
//!
//! `VerifyError` is the domain taxonomy; `ApiError` maps it onto HTTP
//! responses for axum handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::VerifyStage;

/// Result type for verification core operations
pub type VerifyResult<T> = std::result::Result<T, VerifyError>;

/// Domain errors of the verification core.
///
/// Nothing here is fatal to the process; every variant is recoverable
/// by resubmission or by correcting the input.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Bad submission; the caller must fix the input before retrying
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The analyzer did not respond within the stage timeout
    #[error("Stage timed out: {stage}")]
    StageTimeout { stage: VerifyStage },

    /// The analyzer collaborator failed; cause surfaced verbatim
    #[error("Analyzer failed during {stage}: {cause}")]
    Analyzer { stage: VerifyStage, cause: String },

    /// Fusion received zero indicators; never defaults to a score
    #[error("Insufficient evidence: fusion requires at least one indicator")]
    InsufficientEvidence,

    /// A result with this id already exists in history
    #[error("Duplicate result: {0}")]
    DuplicateResult(Uuid),

    /// Unknown request or result id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Registry persistence error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal invariant violation
    #[error("Internal error: {0}")]
    Internal(String),
}

/// API error type for axum handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - e.g. duplicate result id
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<VerifyError> for ApiError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::InvalidInput(msg) => ApiError::BadRequest(msg),
            VerifyError::NotFound(msg) => ApiError::NotFound(msg),
            VerifyError::DuplicateResult(id) => {
                ApiError::Conflict(format!("Result already recorded: {}", id))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Other(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_error_maps_to_api_status() {
        let api: ApiError = VerifyError::InvalidInput("too large".into()).into();
        assert!(matches!(api, ApiError::BadRequest(_)));

        let api: ApiError = VerifyError::NotFound("nope".into()).into();
        assert!(matches!(api, ApiError::NotFound(_)));

        let api: ApiError = VerifyError::DuplicateResult(Uuid::new_v4()).into();
        assert!(matches!(api, ApiError::Conflict(_)));

        let api: ApiError = VerifyError::InsufficientEvidence.into();
        assert!(matches!(api, ApiError::Internal(_)));
    }

    #[test]
    fn stage_timeout_message_names_stage() {
        let err = VerifyError::StageTimeout {
            stage: VerifyStage::Visual,
        };
        assert_eq!(err.to_string(), "Stage timed out: Visual analysis");
    }
}
