//! # STK Push
//!
//! Lipa Na M-Pesa Online: prompts the customer's phone to authorize a
//! payment to the configured shortcode.

use crate::config::MpesaConfig;
use crate::token::TokenProvider;
use crate::upstream::post_authorized;
use base64::{prelude::BASE64_STANDARD, Engine};
use chrono::{DateTime, Utc};
use relay_core::{GatewayResponse, PushPaymentRequest, RelayError, RelayResult};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

/// Paybill transaction type used for every push
pub const TRANSACTION_TYPE: &str = "CustomerPayBillOnline";

/// Sends signed STK push requests
pub struct PaymentInitiator {
    config: Arc<MpesaConfig>,
    client: Client,
    tokens: Arc<TokenProvider>,
}

impl PaymentInitiator {
    pub fn new(config: Arc<MpesaConfig>, client: Client, tokens: Arc<TokenProvider>) -> Self {
        Self {
            config,
            client,
            tokens,
        }
    }

    /// Fetch a fresh token, sign the payload, and submit it.
    ///
    /// A failed token exchange surfaces as `UpstreamAuth`; a rejected push
    /// as `UpstreamPayment`.
    #[instrument(skip(self, request), fields(amount = ?request.amount))]
    pub async fn initiate_push(&self, request: &PushPaymentRequest) -> RelayResult<GatewayResponse> {
        let token = self.tokens.fetch_access_token().await?;
        let payload = StkPushPayload::build(&self.config, request, Utc::now());

        info!(
            "Sending STK push: account_reference={}, timestamp={}",
            payload.account_reference, payload.timestamp
        );

        let response = post_authorized(
            &self.client,
            &self.config.stk_push_url(),
            &token,
            &payload,
            RelayError::UpstreamPayment,
        )
        .await?;

        info!(
            "STK push accepted: checkout_request_id={}",
            response
                .get("CheckoutRequestID")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
        );

        Ok(response)
    }
}

/// Body of `POST /mpesa/stkpush/v1/processrequest`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkPushPayload {
    pub business_short_code: String,
    pub password: String,
    pub timestamp: String,
    pub transaction_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_a: Option<Value>,
    pub party_b: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<Value>,
    #[serde(rename = "CallBackURL")]
    pub callback_url: String,
    pub account_reference: String,
    pub transaction_desc: String,
}

impl StkPushPayload {
    /// Build the payload for `request` as of the instant `at`
    pub fn build(config: &MpesaConfig, request: &PushPaymentRequest, at: DateTime<Utc>) -> Self {
        let timestamp = stk_timestamp(at);
        let password = stk_password(&config.shortcode, &config.passkey, &timestamp);

        Self {
            business_short_code: config.shortcode.clone(),
            password,
            timestamp,
            transaction_type: TRANSACTION_TYPE.to_string(),
            amount: request.amount.clone(),
            party_a: request.phone.clone(),
            party_b: config.shortcode.clone(),
            phone_number: request.phone.clone(),
            callback_url: config.callback_url.clone(),
            account_reference: request.account_reference().to_string(),
            transaction_desc: request.description().to_string(),
        }
    }
}

/// `YYYYMMDDHHMMSS` in UTC
pub fn stk_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d%H%M%S").to_string()
}

/// base64(shortcode + passkey + timestamp)
pub fn stk_password(shortcode: &str, passkey: &str, timestamp: &str) -> String {
    BASE64_STANDARD.encode(format!("{}{}{}", shortcode, passkey, timestamp))
}
