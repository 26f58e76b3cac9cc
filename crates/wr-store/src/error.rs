//! Store errors, kept strictly apart from domain errors.

use thiserror::Error;

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures of the persistence layer.
///
/// These are unexpected, internal conditions; unlike
/// [`wr_core::ChallengeError`] they are never shown as a game-rule message
/// and must not be swallowed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the store file failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store file is not valid JSON or does not match the schema.
    #[error("corrupt store: {0}")]
    Json(#[from] serde_json::Error),

    /// The store was written by an incompatible version.
    #[error("store schema version {found} is not supported (expected {expected})")]
    SchemaMismatch {
        /// Version found in the file.
        found: u32,
        /// Version this build understands.
        expected: u32,
    },
}
