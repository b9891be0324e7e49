//! Subscription data endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use misub_auth::SessionAuthority;
use misub_control::{AdminPlane, SaveMisubsRequest};

use crate::auth::AdminSession;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::GatewayState;

/// Response for a successful write.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Always `true`.
    pub success: bool,
    /// What happened.
    pub message: &'static str,
}

/// Load subscriptions, profiles and worker settings.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn get_data<C, A>(
    State(state): State<Arc<GatewayState<C, A>>>,
    _session: AdminSession,
) -> Result<impl IntoResponse, ApiError>
where
    C: AdminPlane + 'static,
    A: SessionAuthority + 'static,
{
    let data = state.control.load_dashboard().await?;
    Ok(Json(data))
}

/// Replace the subscription and profile collections.
///
/// # Errors
///
/// Returns 400 unless both collections are arrays.
pub async fn save_misubs<C, A>(
    State(state): State<Arc<GatewayState<C, A>>>,
    session: AdminSession,
    ApiJson(body): ApiJson<SaveMisubsRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    C: AdminPlane + 'static,
    A: SessionAuthority + 'static,
{
    tracing::debug!(
        session_id = %session.session_id,
        session_expires_at = %session.expires_at,
        "Saving subscription data"
    );
    state.control.save_misubs(body).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "subscriptions saved",
    }))
}
