//! # Gateway Trait
//!
//! The seam between the HTTP layer and an upstream mobile-money provider.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 MobileMoneyGateway (trait)                  │
//! │  ├── fetch_access_token()                                   │
//! │  ├── initiate_push()                                        │
//! │  ├── register_callback_urls()                               │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                    ┌───────┴───────┐
//!                    │ MpesaGateway  │
//!                    │ (relay-mpesa) │
//!                    └───────────────┘
//! ```

use crate::error::RelayResult;
use crate::payment::{AccessToken, GatewayResponse, PushPaymentRequest, RegisterUrlsRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// Outbound operations a mobile-money provider must support.
///
/// Every call is independent: implementations hold no per-request state.
#[async_trait]
pub trait MobileMoneyGateway: Send + Sync {
    /// Exchange client credentials for a bearer token.
    async fn fetch_access_token(&self) -> RelayResult<AccessToken>;

    /// Send a push-payment prompt to the customer's phone.
    ///
    /// Returns the gateway's JSON response untouched.
    async fn initiate_push(&self, request: &PushPaymentRequest) -> RelayResult<GatewayResponse>;

    /// Register confirmation and validation URLs for C2B payments.
    ///
    /// Returns the gateway's JSON response untouched.
    async fn register_callback_urls(
        &self,
        request: &RegisterUrlsRequest,
    ) -> RelayResult<GatewayResponse>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedGateway = Arc<dyn MobileMoneyGateway>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RelayError, UpstreamDetail};
    use serde_json::json;

    struct FixedGateway;

    #[async_trait]
    impl MobileMoneyGateway for FixedGateway {
        async fn fetch_access_token(&self) -> RelayResult<AccessToken> {
            Ok(AccessToken::new("fixed"))
        }

        async fn initiate_push(
            &self,
            request: &PushPaymentRequest,
        ) -> RelayResult<GatewayResponse> {
            Ok(json!({"Amount": request.amount}))
        }

        async fn register_callback_urls(
            &self,
            _request: &RegisterUrlsRequest,
        ) -> RelayResult<GatewayResponse> {
            Err(RelayError::UpstreamRegistration(UpstreamDetail::Message(
                "unavailable".into(),
            )))
        }

        fn provider_name(&self) -> &'static str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_dynamic_dispatch() {
        let gateway: BoxedGateway = Arc::new(FixedGateway);

        assert_eq!(gateway.provider_name(), "fixed");
        assert_eq!(
            gateway.fetch_access_token().await.unwrap().access_token,
            "fixed"
        );
        assert_eq!(
            gateway
                .initiate_push(&PushPaymentRequest::new(5, "254700000000"))
                .await
                .unwrap(),
            json!({"Amount": 5})
        );
        assert!(gateway
            .register_callback_urls(&RegisterUrlsRequest::default())
            .await
            .is_err());
    }
}
