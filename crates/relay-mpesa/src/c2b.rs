//! # C2B URL Registration
//!
//! Tells the gateway where to deliver customer-to-business confirmations
//! and validation requests for the configured shortcode.

use crate::config::MpesaConfig;
use crate::token::TokenProvider;
use crate::upstream::post_authorized;
use relay_core::{GatewayResponse, RegisterUrlsRequest, RelayError, RelayResult};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Gateway completes the transaction if the validation URL is unreachable
pub const RESPONSE_TYPE: &str = "Completed";

/// Registers C2B callback URLs
pub struct WebhookRegistrar {
    config: Arc<MpesaConfig>,
    client: Client,
    tokens: Arc<TokenProvider>,
}

impl WebhookRegistrar {
    pub fn new(config: Arc<MpesaConfig>, client: Client, tokens: Arc<TokenProvider>) -> Self {
        Self {
            config,
            client,
            tokens,
        }
    }

    /// Register the URLs in `request` as given. Missing URLs are sent as
    /// absent fields and left for the gateway to reject.
    #[instrument(skip(self, request))]
    pub async fn register_callback_urls(
        &self,
        request: &RegisterUrlsRequest,
    ) -> RelayResult<GatewayResponse> {
        let token = self.tokens.fetch_access_token().await?;
        let payload = RegisterUrlPayload::build(&self.config, request);

        info!(
            "Registering C2B URLs: confirmation={:?}, validation={:?}",
            payload.confirmation_url, payload.validation_url
        );

        post_authorized(
            &self.client,
            &self.config.register_url_endpoint(),
            &token,
            &payload,
            RelayError::UpstreamRegistration,
        )
        .await
    }
}

/// Body of `POST /mpesa/c2b/v1/registerurl`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterUrlPayload {
    #[serde(rename = "ShortCode")]
    pub short_code: String,
    #[serde(rename = "ResponseType")]
    pub response_type: String,
    #[serde(rename = "ConfirmationURL", skip_serializing_if = "Option::is_none")]
    pub confirmation_url: Option<String>,
    #[serde(rename = "ValidationURL", skip_serializing_if = "Option::is_none")]
    pub validation_url: Option<String>,
}

impl RegisterUrlPayload {
    pub fn build(config: &MpesaConfig, request: &RegisterUrlsRequest) -> Self {
        Self {
            short_code: config.shortcode.clone(),
            response_type: RESPONSE_TYPE.to_string(),
            confirmation_url: request.confirmation_url.clone(),
            validation_url: request.validation_url.clone(),
        }
    }
}
