//! API error types and responses.
//!
//! Every failure leaves the gateway in the same envelope:
//!
//! ```text
//! { "success": false, "code": "bad_request", "message": "group name is required" }
//! ```
//!
//! Internal errors carry their diagnostic text in an [`ErrorDetail`] response
//! extension. The envelope middleware adds it to the body as `"detail"` only
//! when the gateway is configured to expose it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use misub_auth::AuthError;
use misub_control::ControlError;

/// API error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Invalid request body or parameters.
    #[error("{0}")]
    BadRequest(String),

    /// The requested resource or route was not found.
    #[error("{0}")]
    NotFound(String),

    /// The request lost to concurrent writers.
    #[error("{0}")]
    Conflict(String),

    /// The request body exceeded the configured limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// The request did not complete within the configured timeout.
    #[error("{0}")]
    Timeout(String),

    /// Anything else. The payload is diagnostic detail, not client text.
    #[error("internal server error")]
    Internal(String),
}

/// The unified error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    /// Always `false`.
    pub success: bool,
    /// Machine-readable error class.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Diagnostic detail, present only when exposed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Diagnostic detail attached to an internal error response.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    /// The envelope as sent.
    pub envelope: ErrorEnvelope,
    /// The withheld detail.
    pub detail: String,
}

impl ErrorDetail {
    /// The envelope with `detail` filled in.
    #[must_use]
    pub fn exposed(self) -> ErrorEnvelope {
        ErrorEnvelope {
            detail: Some(self.detail),
            ..self.envelope
        }
    }
}

impl ApiError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::Timeout(_) => "request_timeout",
            Self::Internal(_) => "internal_error",
        }
    }

    /// The envelope this error renders as, without detail.
    #[must_use]
    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            success: false,
            code: self.code(),
            message: self.to_string(),
            detail: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let envelope = self.envelope();

        let Self::Internal(detail) = self else {
            return (status, Json(envelope)).into_response();
        };

        tracing::error!(error = %detail, "Request failed");

        let mut response = (status, Json(envelope.clone())).into_response();
        response
            .extensions_mut()
            .insert(ErrorDetail { envelope, detail });
        response
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidPassword => Self::Unauthorized("invalid password".to_string()),
            AuthError::PasswordNotConfigured => {
                tracing::warn!("Login attempted but no admin password is configured");
                Self::Unauthorized("invalid password".to_string())
            }
            AuthError::MissingSession
            | AuthError::TokenExpired
            | AuthError::InvalidSignature
            | AuthError::InvalidToken(_) => {
                tracing::debug!(reason = %err, "Rejected session");
                Self::Unauthorized("unauthorized".to_string())
            }
            AuthError::Internal(msg) => Self::Internal(format!("auth: {msg}")),
        }
    }
}

impl From<ControlError> for ApiError {
    fn from(err: ControlError) -> Self {
        match err {
            ControlError::Validation(msg) => Self::BadRequest(msg),
            ControlError::DuplicateName(_) => {
                Self::BadRequest("group name already exists".to_string())
            }
            ControlError::GroupNotFound(_) => Self::NotFound("node group not found".to_string()),
            ControlError::WriteContention { .. } => Self::Conflict(err.to_string()),
            ControlError::Store(_) | ControlError::Internal(_) => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use misub_store::StoreError;

    #[test]
    fn error_status_codes() {
        assert_eq!(
            ApiError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::PayloadTooLarge("x".into()).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::Timeout("x".into()).status_code(),
            StatusCode::REQUEST_TIMEOUT
        );
        assert_eq!(
            ApiError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_message_hides_detail() {
        let err = ApiError::Internal("rocksdb: IO error".into());
        let envelope = err.envelope();
        assert_eq!(envelope.code, "internal_error");
        assert_eq!(envelope.message, "internal server error");
        assert!(envelope.detail.is_none());
    }

    #[test]
    fn internal_response_carries_detail_extension() {
        let response = ApiError::Internal("boom".into()).into_response();
        let detail = response.extensions().get::<ErrorDetail>().unwrap();
        assert_eq!(detail.detail, "boom");
        assert_eq!(detail.clone().exposed().detail.as_deref(), Some("boom"));

        let response = ApiError::BadRequest("nope".into()).into_response();
        assert!(response.extensions().get::<ErrorDetail>().is_none());
    }

    #[test]
    fn control_errors_map_to_envelope() {
        let err = ApiError::from(ControlError::DuplicateName("Asia".into()));
        assert_eq!(err.code(), "bad_request");
        assert_eq!(err.to_string(), "group name already exists");

        let err = ApiError::from(ControlError::GroupNotFound("g1".into()));
        assert_eq!(err.code(), "not_found");

        let err = ApiError::from(ControlError::WriteContention { attempts: 5 });
        assert_eq!(err.code(), "conflict");

        let err = ApiError::from(ControlError::Store(StoreError::Database("disk".into())));
        assert_eq!(err.code(), "internal_error");
    }

    #[test]
    fn auth_errors_are_unauthorized() {
        for err in [
            AuthError::InvalidPassword,
            AuthError::PasswordNotConfigured,
            AuthError::MissingSession,
            AuthError::TokenExpired,
        ] {
            assert_eq!(ApiError::from(err).code(), "unauthorized");
        }
        assert_eq!(
            ApiError::from(AuthError::Internal("x".into())).code(),
            "internal_error"
        );
    }
}
