//! # Payment Types
//!
//! Provider-neutral request and response types that flow between the HTTP
//! layer and a gateway implementation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Account reference used when the caller does not supply one
pub const DEFAULT_ACCOUNT_REFERENCE: &str = "BOOK";

/// Transaction description used when the caller does not supply one
pub const DEFAULT_TRANSACTION_DESC: &str = "Hotel booking";

/// Raw upstream JSON, returned to callers verbatim
pub type GatewayResponse = serde_json::Value;

/// Push-payment request as received from a client application.
///
/// `amount` and `phone` are relayed exactly as sent; the gateway judges
/// them. Absent values are left out of the upstream payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPaymentRequest {
    /// Amount in whole currency units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Value>,
    /// Customer phone number in international format (2547XXXXXXXX)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PushPaymentRequest {
    pub fn new(amount: u64, phone: impl Into<String>) -> Self {
        Self {
            amount: Some(Value::from(amount)),
            phone: Some(Value::String(phone.into())),
            account_reference: None,
            description: None,
        }
    }

    /// Builder: set the account reference
    pub fn with_account_reference(mut self, reference: impl Into<String>) -> Self {
        self.account_reference = Some(reference.into());
        self
    }

    /// Builder: set the transaction description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Account reference, falling back to [`DEFAULT_ACCOUNT_REFERENCE`]
    pub fn account_reference(&self) -> &str {
        self.account_reference
            .as_deref()
            .unwrap_or(DEFAULT_ACCOUNT_REFERENCE)
    }

    /// Description, falling back to [`DEFAULT_TRANSACTION_DESC`]
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(DEFAULT_TRANSACTION_DESC)
    }
}

/// C2B URL registration request.
///
/// Both URLs are optional here: nothing is validated locally, absent values
/// are simply left out of the upstream call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterUrlsRequest {
    #[serde(
        rename = "confirmationURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub confirmation_url: Option<String>,
    #[serde(
        rename = "validationURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub validation_url: Option<String>,
}

impl RegisterUrlsRequest {
    pub fn new(confirmation_url: impl Into<String>, validation_url: impl Into<String>) -> Self {
        Self {
            confirmation_url: Some(confirmation_url.into()),
            validation_url: Some(validation_url.into()),
        }
    }
}

/// Bearer token issued by the gateway's authorization endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    /// Lifetime in seconds as reported by the gateway
    pub expires_in: Option<u64>,
}

impl AccessToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_in: None,
        }
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// Fixed reply sent back to the gateway for every inbound notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(rename = "ResultCode")]
    pub result_code: i32,
    #[serde(rename = "ResultDesc")]
    pub result_desc: String,
}

impl Acknowledgement {
    pub fn accepted() -> Self {
        Self {
            result_code: 0,
            result_desc: "Accepted".to_string(),
        }
    }
}

impl Default for Acknowledgement {
    fn default() -> Self {
        Self::accepted()
    }
}
