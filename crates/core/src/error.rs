//! Storage boundary error taxonomy.

use thiserror::Error;

use crate::entity::EntityId;

/// Errors surfaced by the storage boundary.
///
/// `Conflict` and `Timeout` are the retriable classes: `Conflict` after a
/// refetch (the caller decides whether its intent survived the conflicting
/// change), `Timeout` as-is. Neither is retried automatically.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Optimistic version check failed. Carries the currently stored
    /// version so the caller can refetch and decide whether to retry.
    #[error("stale version for {id}: expected {expected}, stored {current}")]
    Conflict {
        /// Entity whose write was rejected
        id: EntityId,
        /// Version the caller expected
        expected: u64,
        /// Version currently stored
        current: u64,
    },

    /// No entity with the given id exists.
    #[error("entity not found: {0}")]
    NotFound(EntityId),

    /// Input rejected before any state mutation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An I/O-bound operation exceeded its time budget. Retriable; never
    /// indicates a partial mutation.
    #[error("storage operation timed out: {0}")]
    Timeout(String),

    /// Entity payload could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database error from the SQLite backend.
    #[cfg(feature = "sqlite")]
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
