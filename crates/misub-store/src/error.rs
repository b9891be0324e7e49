//! Error types for the storage layer.

use thiserror::Error;

use crate::Version;

/// A result type using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional write found a different version than expected.
    #[error("version conflict on key {key}: expected {expected:?}, found {actual:?}")]
    Conflict {
        /// The key being written.
        key: String,
        /// The version the writer read.
        expected: Option<Version>,
        /// The version currently stored.
        actual: Option<Version>,
    },

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Returns true if this error is a lost compare-and-swap race.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
