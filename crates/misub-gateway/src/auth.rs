//! Authentication extractors.
//!
//! This module provides the `AdminSession` extractor that validates the
//! session cookie on protected routes.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};

use misub_auth::{SessionAuthority, SessionClaims};
use misub_control::AdminPlane;

use crate::error::ApiError;
use crate::state::GatewayState;

/// An authenticated administrator.
///
/// Extracting this rejects the request with 401 unless a valid, unexpired
/// session cookie is present.
#[derive(Debug, Clone)]
pub struct AdminSession {
    /// Unique id of the login that issued the cookie.
    pub session_id: String,
    /// When the session stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl From<SessionClaims> for AdminSession {
    fn from(claims: SessionClaims) -> Self {
        Self {
            session_id: claims.session_id,
            expires_at: claims.expires_at,
        }
    }
}

#[async_trait]
impl<C, A> FromRequestParts<Arc<GatewayState<C, A>>> for AdminSession
where
    C: AdminPlane + 'static,
    A: SessionAuthority + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<GatewayState<C, A>>,
    ) -> Result<Self, Self::Rejection> {
        let cookies: Vec<&str> = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();

        let claims = state.sessions.authenticate(&cookies)?;
        Ok(Self::from(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn admin_session_from_claims() {
        let now = Utc::now();
        let claims = SessionClaims {
            session_id: "abc".to_string(),
            expires_at: now + Duration::days(7),
        };

        let session = AdminSession::from(claims);
        assert_eq!(session.session_id, "abc");
        assert_eq!(session.expires_at, now + Duration::days(7));
    }
}
