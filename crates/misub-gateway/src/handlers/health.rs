//! Public endpoints: health, diagnostics, and the endpoint listing.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use misub_auth::SessionAuthority;
use misub_control::AdminPlane;

use crate::error::ApiError;
use crate::state::GatewayState;

/// Every route the gateway serves.
pub const ENDPOINTS: &[&str] = &[
    "POST /api/login",
    "ANY /api/logout",
    "GET /api/data",
    "POST /api/misubs",
    "GET /api/node-groups",
    "POST /api/node-groups",
    "DELETE /api/node-groups?id=",
    "GET /api/debug",
    "GET /health",
];

/// Diagnostic payload.
#[derive(Debug, Serialize)]
pub struct DebugResponse {
    /// Always `true`.
    pub success: bool,
    /// Service version.
    pub version: &'static str,
    /// Server time, RFC 3339.
    pub timestamp: String,
    /// Whether anyone can log in.
    pub has_admin_password: bool,
    /// Whether data survives a restart.
    pub has_kv_binding: bool,
    /// Which store backs the data.
    pub kv_backend: &'static str,
}

/// Endpoint listing.
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    /// Always `true`.
    pub success: bool,
    /// Service name.
    pub name: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Available routes.
    pub endpoints: &'static [&'static str],
}

/// Health check handler.
///
/// ```text
/// GET /health
///
/// Response: 200 OK
/// "OK"
/// ```
pub async fn health() -> impl IntoResponse {
    Json("OK")
}

/// Report whether the required external configuration is present.
pub async fn debug<C, A>(State(state): State<Arc<GatewayState<C, A>>>) -> impl IntoResponse
where
    C: AdminPlane + 'static,
    A: SessionAuthority + 'static,
{
    Json(DebugResponse {
        success: true,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
        has_admin_password: state.sessions.has_password(),
        has_kv_binding: state.kv_binding.is_some(),
        kv_backend: state.control.backend(),
    })
}

/// List the available endpoints.
pub async fn index() -> impl IntoResponse {
    Json(index_response())
}

fn index_response() -> IndexResponse {
    IndexResponse {
        success: true,
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ENDPOINTS,
    }
}

/// Answer a request no route matched.
///
/// Returns 404, or the endpoint listing when the legacy fallback is enabled.
pub async fn fallback<C, A>(
    State(state): State<Arc<GatewayState<C, A>>>,
    method: Method,
    uri: Uri,
) -> Response
where
    C: AdminPlane + 'static,
    A: SessionAuthority + 'static,
{
    if state.config.legacy_fallback {
        return Json(index_response()).into_response();
    }

    tracing::debug!(%method, path = uri.path(), "No route matched");
    ApiError::NotFound(format!("no route for {method} {}", uri.path())).into_response()
}
