//! # Request Handlers
//!
//! Axum request handlers for the relay API.
//! Each handler makes at most one gateway call and returns the upstream
//! JSON as-is. Request bodies are relayed without local validation.

use crate::extract::RelayJson;
use crate::state::AppState;
use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse, Json};
use relay_core::{
    Acknowledgement, GatewayResponse, PushPaymentRequest, RegisterUrlsRequest, RelayError,
};
use relay_mpesa::receive_callback;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument};

// =============================================================================
// Response Types
// =============================================================================

/// Token response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Error response.
///
/// `error` holds the gateway's JSON body when it sent one, otherwise a message.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: Value,
}

impl ErrorResponse {
    pub fn new(error: impl Into<Value>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn relay_error_to_response(err: RelayError) -> ApiError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::new(err.error_payload())))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "mpesa-relay",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Fetch a bearer token from the gateway
#[instrument(skip(state))]
pub async fn get_token(State(state): State<AppState>) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.gateway.fetch_access_token().await.map_err(|e| {
        error!("Failed to fetch access token: {}", e);
        relay_error_to_response(e)
    })?;

    Ok(Json(TokenResponse {
        access_token: token.access_token,
    }))
}

/// Send an STK push to the customer's phone
#[instrument(skip(state, request), fields(amount = ?request.amount))]
pub async fn stk_push(
    State(state): State<AppState>,
    RelayJson(request): RelayJson<PushPaymentRequest>,
) -> Result<Json<GatewayResponse>, ApiError> {
    info!(
        "STK push requested: account_reference={}",
        request.account_reference()
    );

    let response = state.gateway.initiate_push(&request).await.map_err(|e| {
        error!("STK push failed: {}", e);
        relay_error_to_response(e)
    })?;

    Ok(Json(response))
}

/// Register C2B confirmation and validation URLs
#[instrument(skip(state, request))]
pub async fn register_c2b(
    State(state): State<AppState>,
    RelayJson(request): RelayJson<RegisterUrlsRequest>,
) -> Result<Json<GatewayResponse>, ApiError> {
    let response = state
        .gateway
        .register_callback_urls(&request)
        .await
        .map_err(|e| {
            error!("C2B URL registration failed: {}", e);
            relay_error_to_response(e)
        })?;

    Ok(Json(response))
}

/// Receive a gateway notification.
///
/// Takes the raw body so malformed payloads are still acknowledged.
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn callback(State(state): State<AppState>, body: Bytes) -> Json<Acknowledgement> {
    Json(receive_callback(state.callbacks.as_ref(), &body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::UpstreamDetail;
    use serde_json::json;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error");
        assert_eq!(err.error, json!("Test error"));
    }

    #[test]
    fn test_relay_error_conversion() {
        let err = RelayError::UpstreamAuth(UpstreamDetail::Body {
            status: 401,
            body: json!({"errorMessage": "Invalid credentials"}),
        });
        let (status, Json(body)) = relay_error_to_response(err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, json!({"errorMessage": "Invalid credentials"}));

        let err = RelayError::UpstreamPayment(UpstreamDetail::Message("connection reset".into()));
        let (status, Json(body)) = relay_error_to_response(err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, json!("connection reset"));
    }
}
