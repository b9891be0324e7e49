//! Authentication error types.

use thiserror::Error;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur during authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The submitted password does not match the configured one.
    #[error("invalid password")]
    InvalidPassword,

    /// No admin password is configured, so nobody can log in.
    #[error("admin password not configured")]
    PasswordNotConfigured,

    /// The request carried no session cookie.
    #[error("missing session")]
    MissingSession,

    /// The session token has expired.
    #[error("session expired")]
    TokenExpired,

    /// The session token signature is invalid.
    #[error("invalid signature")]
    InvalidSignature,

    /// The session token is malformed or has unexpected claims.
    #[error("invalid session token: {0}")]
    InvalidToken(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidPassword
            | Self::PasswordNotConfigured
            | Self::MissingSession
            | Self::TokenExpired
            | Self::InvalidSignature
            | Self::InvalidToken(_) => 401,
            Self::Internal(_) => 500,
        }
    }
}
