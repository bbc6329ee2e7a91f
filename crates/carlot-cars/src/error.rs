//! Error types for car operations.

use crate::validation::ValidationError;

/// Errors that can occur during car operations.
#[derive(Debug, thiserror::Error)]
pub enum CarError {
    /// No car is stored under the given plate.
    #[error("car not found: {0}")]
    NotFound(String),

    /// A car is already stored under the given plate.
    #[error("car already exists: {0}")]
    AlreadyExists(String),

    /// The request body broke one or more field rules.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An in-memory aggregate was asked to reduce zero rows.
    #[error("cannot compute an average over an empty collection")]
    EmptyCollection,

    /// SQLite failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}
