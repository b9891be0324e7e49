//! Request body extraction.

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON body extractor whose rejections use the API error envelope.
///
/// The body is parsed as JSON whatever the `Content-Type` header says. A body
/// that cannot be read or parsed is an unexpected failure (500), not a
/// validation error; field-level problems are reported by the handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = match Bytes::from_request(req, state).await {
            Ok(bytes) => bytes,
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                return Err(ApiError::PayloadTooLarge(
                    "request body too large".to_string(),
                ));
            }
            Err(rejection) => {
                return Err(ApiError::Internal(format!(
                    "failed to read request body: {}",
                    rejection.body_text()
                )));
            }
        };

        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|err| ApiError::Internal(format!("failed to parse request body: {err}")))
    }
}
