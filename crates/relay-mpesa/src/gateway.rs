//! # M-Pesa Gateway
//!
//! Wires the Daraja components together behind [`MobileMoneyGateway`].

use crate::c2b::WebhookRegistrar;
use crate::config::MpesaConfig;
use crate::stk::PaymentInitiator;
use crate::token::TokenProvider;
use async_trait::async_trait;
use relay_core::{
    AccessToken, GatewayResponse, MobileMoneyGateway, PushPaymentRequest, RegisterUrlsRequest,
    RelayResult,
};
use reqwest::Client;
use std::sync::Arc;

/// Daraja gateway client
///
/// One shared HTTP client and configuration; each component performs its
/// own token exchange per call.
pub struct MpesaGateway {
    tokens: Arc<TokenProvider>,
    payments: PaymentInitiator,
    registrar: WebhookRegistrar,
}

impl MpesaGateway {
    /// Create a new gateway client
    pub fn new(config: MpesaConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create with a caller-supplied HTTP client
    pub fn with_client(config: MpesaConfig, client: Client) -> Self {
        let config = Arc::new(config);
        let tokens = Arc::new(TokenProvider::new(config.clone(), client.clone()));
        let payments = PaymentInitiator::new(config.clone(), client.clone(), tokens.clone());
        let registrar = WebhookRegistrar::new(config, client, tokens.clone());

        Self {
            tokens,
            payments,
            registrar,
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::new(MpesaConfig::from_env())
    }
}

#[async_trait]
impl MobileMoneyGateway for MpesaGateway {
    async fn fetch_access_token(&self) -> RelayResult<AccessToken> {
        self.tokens.fetch_access_token().await
    }

    async fn initiate_push(&self, request: &PushPaymentRequest) -> RelayResult<GatewayResponse> {
        self.payments.initiate_push(request).await
    }

    async fn register_callback_urls(
        &self,
        request: &RegisterUrlsRequest,
    ) -> RelayResult<GatewayResponse> {
        self.registrar.register_callback_urls(request).await
    }

    fn provider_name(&self) -> &'static str {
        "mpesa"
    }
}
