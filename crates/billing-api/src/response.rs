//! # Response Formatting
//!
//! Every JSON body the API produces goes through [`write_json`], so success
//! values and errors share one envelope contract:
//!
//! - success: the value itself, `200 OK`
//! - error: `{"error":{"message":"..."}}`, `400 Bad Request`
//! - encoding failure: `500`, no body, logged server side

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use billing_core::BillingError;
use serde::Serialize;
use tracing::{error, warn};

/// Error envelope body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorMessage,
}

#[derive(Debug, Serialize)]
pub struct ErrorMessage {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: ErrorMessage {
                message: message.into(),
            },
        }
    }
}

impl From<&BillingError> for ErrorResponse {
    fn from(err: &BillingError) -> Self {
        Self::new(err.client_message())
    }
}

/// Handler error rendered through the shared envelope
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub BillingError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        write_json::<()>(Err(self.0))
    }
}

/// Render a success value or an error as a JSON response
pub fn write_json<T: Serialize>(result: Result<T, BillingError>) -> Response {
    match result {
        Ok(value) => encode(StatusCode::OK, &value),
        Err(err) => {
            warn!("Request failed: {}", err);
            encode(StatusCode::BAD_REQUEST, &ErrorResponse::from(&err))
        }
    }
}

fn encode<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => (
            status,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode JSON response: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_value() {
        let response = write_json(Ok(json!({ "id": "cs_test_123" })));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(body_json(response).await, json!({ "id": "cs_test_123" }));
    }

    #[tokio::test]
    async fn test_provider_error_uses_provider_message() {
        let response = write_json::<Value>(Err(BillingError::ProviderError {
            provider: "stripe".to_string(),
            message: "No such checkout.session: 'cs_nope'".to_string(),
        }));

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": { "message": "No such checkout.session: 'cs_nope'" } })
        );
    }

    #[tokio::test]
    async fn test_other_error_uses_display_text() {
        let response = ApiError::from(BillingError::NetworkError("timed out".into())).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": { "message": "Network error: timed out" } })
        );
    }

    #[tokio::test]
    async fn test_encoding_failure_is_500_without_body() {
        // JSON object keys must be strings
        let mut unencodable = BTreeMap::new();
        unencodable.insert(vec![1u8, 2], 3u8);

        let response = write_json(Ok(unencodable));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }
}
