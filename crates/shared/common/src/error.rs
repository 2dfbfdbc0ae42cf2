//! Unified error handling.
//!
//! Every repository operation reports caller-visible failures through
//! [`AppError`], which carries an HTTP-like status code and a detail
//! string and converts into an Axum response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    // Resource errors
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    // Input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Storage failures caught at an operation boundary
    #[error("{0}")]
    Persistence(String),

    // Internal
    #[error("{0}")]
    Internal(String),
}

/// Error response body for HTTP
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AppError::Persistence(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Numeric status, for callers that branch on the code
    pub fn status_code(&self) -> u16 {
        self.status().as_u16()
    }

    /// Human-readable detail
    pub fn detail(&self) -> &str {
        match self {
            AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::InvalidArgument(msg)
            | AppError::Persistence(msg)
            | AppError::Internal(msg) => msg,
        }
    }

    /// Get user-facing message
    fn user_message(&self) -> String {
        match self {
            AppError::Persistence(msg) => {
                tracing::error!("Database error: {}", msg);
                msg.clone()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                msg.clone()
            }
            _ => self.to_string(),
        }
    }
}

// =============================================================================
// HTTP Response (Axum)
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Decode(msg) => AppError::InvalidArgument(msg),
            other @ (DomainError::UnknownColumn { .. } | DomainError::TypeMismatch { .. }) => {
                AppError::Internal(other.to_string())
            }
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, detail: impl Into<String>) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, detail: impl Into<String>) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(detail.into()))
    }
}

/// Convenience constructors
impl AppError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        AppError::NotFound(detail.into())
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        AppError::Conflict(detail.into())
    }

    pub fn invalid_argument(detail: impl Into<String>) -> Self {
        AppError::InvalidArgument(detail.into())
    }

    pub fn persistence(detail: impl Into<String>) -> Self {
        AppError::Persistence(detail.into())
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        AppError::Internal(detail.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_variant() {
        assert_eq!(AppError::not_found("x").status_code(), 404);
        assert_eq!(AppError::conflict("x").status_code(), 409);
        assert_eq!(AppError::internal("x").status_code(), 500);
        assert_eq!(AppError::persistence("x").status_code(), 500);
        assert_eq!(AppError::invalid_argument("x").status_code(), 400);
    }

    #[test]
    fn type_mismatch_is_reported_as_internal() {
        let err = AppError::from(DomainError::TypeMismatch {
            entity: "User",
            column: "name".into(),
            expected: "text".into(),
            actual: "int".into(),
        });
        assert_eq!(err.status_code(), 500);
        assert_eq!(
            err.detail(),
            "Invalid type for field 'User.name': expected text, got int"
        );
    }

    #[test]
    fn decode_failures_are_invalid_arguments() {
        let err = AppError::from(DomainError::decode("expected an object, got array"));
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn renders_json_body() {
        let response = AppError::conflict("User with email a@b.c already exists").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "CONFLICT");
        assert_eq!(
            body["error"]["message"],
            "User with email a@b.c already exists"
        );
    }
}
