//! Domain-level errors.
//!
//! These errors describe schema and payload problems detected before
//! anything reaches a session. They are independent of infrastructure
//! concerns (HTTP, database).

use thiserror::Error;

/// Domain-specific errors for schema and payload violations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// The entity has no column with this name
    #[error("{entity} does not have field '{column}'")]
    UnknownColumn { entity: &'static str, column: String },

    /// A value does not fit the declared column type
    #[error("Invalid type for field '{entity}.{column}': expected {expected}, got {actual}")]
    TypeMismatch {
        entity: &'static str,
        column: String,
        expected: String,
        actual: String,
    },

    /// A payload could not be turned into column values
    #[error("Cannot decode payload: {0}")]
    Decode(String),

    /// Internal domain error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Create an unknown column error
    pub fn unknown_column(entity: &'static str, column: impl Into<String>) -> Self {
        DomainError::UnknownColumn {
            entity,
            column: column.into(),
        }
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        DomainError::Decode(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal(msg.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
