//! Cross-origin envelope.
//!
//! The outermost middleware. Pre-flight requests are answered here without
//! reaching the router; every other response, including rejections produced
//! by inner layers, leaves with the same fixed CORS header set. Plain-text
//! body-limit and timeout rejections are rewritten into the error envelope.

use std::any::Any;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_LENGTH, CONTENT_TYPE, VARY,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use misub_auth::SessionAuthority;
use misub_control::AdminPlane;

use crate::error::{ApiError, ErrorDetail};
use crate::state::GatewayState;

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Apply the CORS envelope to a request.
pub async fn cors_envelope<C, A>(
    State(state): State<Arc<GatewayState<C, A>>>,
    request: Request,
    next: Next,
) -> Response
where
    C: AdminPlane + 'static,
    A: SessionAuthority + 'static,
{
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        let response = next.run(request).await;
        envelope_layer_rejection(response)
    };

    if let Some(detail) = response.extensions_mut().remove::<ErrorDetail>() {
        if state.config.expose_error_details {
            response = expose_detail(response, detail);
        }
    }

    apply_cors_headers(response.headers_mut(), &state.config.cors_origin);
    response
}

/// Replace a non-JSON 413 or 408 produced by an inner layer with the envelope.
fn envelope_layer_rejection(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if is_json {
        return response;
    }

    match response.status() {
        StatusCode::PAYLOAD_TOO_LARGE => {
            ApiError::PayloadTooLarge("request body too large".to_string()).into_response()
        }
        StatusCode::REQUEST_TIMEOUT => {
            tracing::warn!("Request timed out");
            ApiError::Timeout("request timed out".to_string()).into_response()
        }
        _ => response,
    }
}

/// Stamp the fixed CORS header set onto `headers`.
pub fn apply_cors_headers(headers: &mut HeaderMap, origin: &str) {
    match HeaderValue::from_str(origin) {
        Ok(origin) => {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        }
        Err(_) => tracing::warn!(origin, "Configured CORS origin is not a valid header value"),
    }
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(VARY, HeaderValue::from_static("Origin"));
}

fn expose_detail(response: Response, detail: ErrorDetail) -> Response {
    let (mut parts, body) = response.into_parts();
    match serde_json::to_vec(&detail.exposed()) {
        Ok(bytes) => {
            parts.headers.remove(CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(_) => Response::from_parts(parts, body),
    }
}

/// Turn a handler panic into an internal error response.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError::Internal(format!("handler panicked: {message}")).into_response()
}
