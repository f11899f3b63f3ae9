//! # Request Extractors

use crate::handlers::ErrorResponse;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// JSON body extractor that ignores `Content-Type` and reports failures as
/// `500 {"error": ...}`.
///
/// An empty body reads as `{}`, so every field is left unset and relayed
/// as absent.
pub struct RelayJson<T>(pub T);

impl<S, T> FromRequest<S> for RelayJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = (StatusCode, axum::Json<ErrorResponse>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| rejection(e.body_text()))?;

        let value = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Object(Default::default())
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|e| rejection(format!("Failed to parse request body: {}", e)))?
        };

        serde_json::from_value(value)
            .map(Self)
            .map_err(|e| rejection(format!("Failed to read request body: {}", e)))
    }
}

fn rejection(message: String) -> (StatusCode, axum::Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(ErrorResponse::new(message)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use relay_core::{PushPaymentRequest, RegisterUrlsRequest};

    fn request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_reads_json_without_content_type() {
        let RelayJson(body) = RelayJson::<RegisterUrlsRequest>::from_request(
            request(r#"{"confirmationURL": "https://a.example/c"}"#),
            &(),
        )
        .await
        .unwrap();
        assert_eq!(body.confirmation_url.as_deref(), Some("https://a.example/c"));
        assert!(body.validation_url.is_none());
    }

    #[tokio::test]
    async fn test_empty_body_is_empty_object() {
        let RelayJson(body) = RelayJson::<PushPaymentRequest>::from_request(request(""), &())
            .await
            .unwrap();
        assert_eq!(body, PushPaymentRequest::default());
    }

    #[tokio::test]
    async fn test_malformed_body_is_server_error() {
        let Err((status, axum::Json(body))) =
            RelayJson::<PushPaymentRequest>::from_request(request("{amount:"), &()).await
        else {
            panic!("malformed body was accepted");
        };
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.error.as_str().unwrap().starts_with("Failed to parse"));

        let Err((status, _)) =
            RelayJson::<PushPaymentRequest>::from_request(request(r#"{"description": 5}"#), &())
                .await
        else {
            panic!("mistyped body was accepted");
        };
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
