//! Login and logout endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use misub_auth::SessionAuthority;
use misub_control::AdminPlane;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::GatewayState;

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginBody {
    /// The admin password. Missing reads as empty.
    #[serde(default)]
    pub password: String,
}

/// Bare success acknowledgement.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    /// Always `true`.
    pub success: bool,
}

impl SuccessResponse {
    const OK: Self = Self { success: true };
}

/// Exchange the admin password for a session cookie.
///
/// # Errors
///
/// Returns 401 without a cookie if the password is wrong or none is
/// configured.
pub async fn login<C, A>(
    State(state): State<Arc<GatewayState<C, A>>>,
    ApiJson(body): ApiJson<LoginBody>,
) -> Result<impl IntoResponse, ApiError>
where
    C: AdminPlane + 'static,
    A: SessionAuthority + 'static,
{
    let session = state.sessions.login(&body.password).map_err(|err| {
        tracing::info!(reason = %err, "Admin login rejected");
        ApiError::from(err)
    })?;

    tracing::info!(expires_at = %session.expires_at, "Admin logged in");

    let cookie = state.sessions.login_cookie(&session);
    Ok(([(SET_COOKIE, cookie)], Json(SuccessResponse::OK)))
}

/// Clear the session cookie.
///
/// Always succeeds, whether or not the caller was logged in.
pub async fn logout<C, A>(State(state): State<Arc<GatewayState<C, A>>>) -> impl IntoResponse
where
    C: AdminPlane + 'static,
    A: SessionAuthority + 'static,
{
    let cookie = state.sessions.logout_cookie();
    ([(SET_COOKIE, cookie)], Json(SuccessResponse::OK))
}
