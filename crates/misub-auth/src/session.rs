//! Signed session tokens.
//!
//! A successful login yields an HS256 JWT carried in an `HttpOnly` cookie.
//! Expiry is checked here on every request, not just by the browser.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::cookie;
use crate::error::{AuthError, Result};
use crate::AuthConfig;

const KEY_CONTEXT: &str = "misub 2024-06 session signing key";
const SUBJECT: &str = "admin";
const MAX_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// The signed token to put in the cookie.
    pub token: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Claims recovered from a valid session token.
#[derive(Debug, Clone)]
pub struct SessionClaims {
    /// Unique id of this login.
    pub session_id: String,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
}

/// Trait for issuing and checking admin sessions.
pub trait SessionAuthority: Send + Sync {
    /// Whether an admin password is configured at all.
    fn has_password(&self) -> bool;

    /// Name of the session cookie.
    fn cookie_name(&self) -> &str;

    /// Lifetime of a session in seconds.
    fn session_ttl_seconds(&self) -> u64;

    /// Check a password and issue a session on success.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidPassword` on mismatch, or
    /// `AuthError::PasswordNotConfigured` when no password is set.
    fn login(&self, password: &str) -> Result<IssuedSession>;

    /// Validate a session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is malformed, forged, or expired.
    fn validate(&self, token: &str) -> Result<SessionClaims>;

    /// Validate the session cookie found in a request's `Cookie` headers.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingSession` if there is no session cookie,
    /// otherwise whatever [`SessionAuthority::validate`] reports.
    fn authenticate(&self, cookie_headers: &[&str]) -> Result<SessionClaims> {
        let token = cookie::find_cookie(cookie_headers, self.cookie_name())
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingSession)?;
        self.validate(&token)
    }

    /// `Set-Cookie` value installing `session`.
    fn login_cookie(&self, session: &IssuedSession) -> String {
        cookie::session_cookie(
            self.cookie_name(),
            &session.token,
            session.expires_at,
            self.session_ttl_seconds(),
        )
    }

    /// `Set-Cookie` value clearing the session.
    fn logout_cookie(&self) -> String {
        cookie::clear_cookie(self.cookie_name())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    jti: String,
    iat: i64,
    exp: i64,
}

/// HS256-signed sessions keyed from the configured secret.
pub struct SignedSessions {
    config: AuthConfig,
    password_hash: Option<blake3::Hash>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SignedSessions {
    /// Build the authority from configuration.
    ///
    /// The signing key is derived from `session_secret`, falling back to the
    /// admin password, falling back to a random per-process key.
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let key = match (&config.session_secret, &config.admin_password) {
            (Some(secret), _) => blake3::derive_key(KEY_CONTEXT, secret.as_bytes()),
            (None, Some(password)) => blake3::derive_key(KEY_CONTEXT, password.as_bytes()),
            (None, None) => {
                tracing::warn!("No session secret or admin password; sessions end at restart");
                blake3::derive_key(KEY_CONTEXT, uuid::Uuid::new_v4().as_bytes())
            }
        };

        let password_hash = config
            .admin_password
            .as_deref()
            .filter(|password| !password.is_empty())
            .map(|password| blake3::hash(password.as_bytes()));

        Self {
            config,
            password_hash,
            encoding_key: EncodingKey::from_secret(&key),
            decoding_key: DecodingKey::from_secret(&key),
        }
    }

    fn issue(&self) -> Result<IssuedSession> {
        let now = Utc::now();
        let ttl = i64::try_from(self.config.session_ttl_seconds)
            .unwrap_or(i64::MAX)
            .min(MAX_TTL_SECONDS);
        let expires_at = now + Duration::seconds(ttl);
        let claims = Claims {
            sub: SUBJECT.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(IssuedSession { token, expires_at })
    }
}

impl SessionAuthority for SignedSessions {
    fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    fn session_ttl_seconds(&self) -> u64 {
        self.config.session_ttl_seconds
    }

    fn login(&self, password: &str) -> Result<IssuedSession> {
        let expected = self.password_hash.ok_or(AuthError::PasswordNotConfigured)?;

        // blake3::Hash equality is constant-time.
        if blake3::hash(password.as_bytes()) != expected {
            return Err(AuthError::InvalidPassword);
        }

        self.issue()
    }

    fn validate(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        let claims = data.claims;
        if claims.sub != SUBJECT {
            return Err(AuthError::InvalidToken("unexpected subject".to_string()));
        }

        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AuthError::InvalidToken("invalid exp timestamp".to_string()))?;

        Ok(SessionClaims {
            session_id: claims.jti,
            expires_at,
        })
    }
}
