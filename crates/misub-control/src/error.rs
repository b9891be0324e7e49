//! Error types for the control plane.
//!
//! This module defines all errors that can occur while reading or mutating
//! subscription data and node groups.

use thiserror::Error;

/// A result type using `ControlError`.
pub type Result<T> = std::result::Result<T, ControlError>;

/// Errors that can occur in control plane operations.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The request is missing a required field or has one of the wrong shape.
    #[error("{0}")]
    Validation(String),

    /// Another node group already uses this name.
    #[error("group name already exists: {0}")]
    DuplicateName(String),

    /// No node group has the given id.
    #[error("node group not found: {0}")]
    GroupNotFound(String),

    /// Every compare-and-swap attempt lost to a concurrent writer.
    #[error("node groups changed concurrently; gave up after {attempts} attempts")]
    WriteContention {
        /// Number of read-modify-write cycles attempted.
        attempts: u32,
    },

    /// Storage layer error.
    #[error("storage error: {0}")]
    Store(#[from] misub_store::StoreError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ControlError {
    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::DuplicateName(_) => 400,
            Self::GroupNotFound(_) => 404,
            Self::WriteContention { .. } => 409,
            Self::Store(_) | Self::Internal(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_codes() {
        assert_eq!(ControlError::Validation("x".into()).http_status_code(), 400);
        assert_eq!(ControlError::DuplicateName("x".into()).http_status_code(), 400);
        assert_eq!(ControlError::GroupNotFound("x".into()).http_status_code(), 404);
        assert_eq!(
            ControlError::WriteContention { attempts: 5 }.http_status_code(),
            409
        );
        assert_eq!(
            ControlError::Store(misub_store::StoreError::Database("x".into())).http_status_code(),
            500
        );
    }
}
