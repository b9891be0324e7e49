//! Cookie session authentication for the MiSub console server.
//!
//! There is a single administrator identified by a shared password. A
//! successful login issues a signed, expiring session token in an `HttpOnly`
//! cookie; every protected request presents that cookie back.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────────┐
//! │   Gateway        │────▶│  SessionAuthority    │
//! │   (HTTP)         │     │  (trait)             │
//! └──────────────────┘     └──────────┬───────────┘
//!                                     │
//!                          ┌──────────▼───────────┐
//!                          │  SignedSessions      │
//!                          │  (HS256 + blake3)    │
//!                          └──────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use misub_auth::{AuthConfig, SessionAuthority, SignedSessions};
//!
//! let auth = SignedSessions::new(AuthConfig {
//!     admin_password: Some("correct horse".to_string()),
//!     ..AuthConfig::default()
//! });
//!
//! let session = auth.login("correct horse").unwrap();
//! let set_cookie = auth.login_cookie(&session);
//! assert!(set_cookie.contains("HttpOnly"));
//!
//! let cookie_header = format!("misub_session={}", session.token);
//! assert!(auth.authenticate(&[cookie_header.as_str()]).is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::fmt;

pub mod cookie;
pub mod error;
pub mod session;

pub use error::{AuthError, Result};
pub use session::{IssuedSession, SessionAuthority, SessionClaims, SignedSessions};

/// Default session lifetime: seven days.
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "misub_session";

/// Configuration for admin authentication.
#[derive(Clone)]
pub struct AuthConfig {
    /// The shared admin password. `None` disables login.
    pub admin_password: Option<String>,
    /// Secret used to derive the token signing key.
    pub session_secret: Option<String>,
    /// How long a session stays valid, in seconds.
    pub session_ttl_seconds: u64,
    /// Name of the session cookie.
    pub cookie_name: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field("session_secret", &self.session_secret.as_ref().map(|_| "<redacted>"))
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .field("cookie_name", &self.cookie_name)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_password: None,
            session_secret: None,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AuthConfig::default();
        assert!(config.admin_password.is_none());
        assert_eq!(config.session_ttl_seconds, 604_800);
        assert_eq!(config.cookie_name, "misub_session");
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = AuthConfig {
            admin_password: Some("hunter2".to_string()),
            session_secret: Some("s3cret".to_string()),
            ..AuthConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn auth_error_status_codes() {
        assert_eq!(AuthError::InvalidPassword.http_status_code(), 401);
        assert_eq!(AuthError::MissingSession.http_status_code(), 401);
        assert_eq!(AuthError::TokenExpired.http_status_code(), 401);
        assert_eq!(AuthError::Internal("x".into()).http_status_code(), 500);
    }
}
