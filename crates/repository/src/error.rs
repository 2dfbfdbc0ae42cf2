//! Persistence-layer failures.
//!
//! A `StoreError` is what a session reports when the storage itself fails.
//! Repository operations never let these escape: the guard rolls the
//! session back and translates them into `AppError::Persistence`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),

    #[error("{entity} has no column '{column}'")]
    UnknownColumn { entity: &'static str, column: String },

    #[error("{entity} with ID {id} already exists in storage")]
    DuplicateKey { entity: &'static str, id: String },

    #[error("{0} is not persistent")]
    Detached(String),

    /// Failure scheduled on an in-memory store
    #[error("{0}")]
    Injected(String),
}

impl StoreError {
    pub fn unknown_column(entity: &'static str, column: impl Into<String>) -> Self {
        StoreError::UnknownColumn {
            entity,
            column: column.into(),
        }
    }

    pub fn detached(entity: impl Into<String>) -> Self {
        StoreError::Detached(entity.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
