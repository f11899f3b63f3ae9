//! # Relay Error Types
//!
//! Typed error handling for the mpesa-relay gateway client.
//! All gateway operations return `Result<T, RelayError>`.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// What the gateway told us when a call failed.
///
/// Either the gateway answered (with a status and a body), or the request
/// never produced a usable response and all we have is a message.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamDetail {
    /// The gateway responded with a non-success status
    Body { status: u16, body: Value },
    /// Transport failure or unreadable response
    Message(String),
}

impl UpstreamDetail {
    /// Build a detail from a raw response body.
    ///
    /// JSON bodies are kept structured, anything else is kept as text.
    /// An empty body is replaced with a message naming the status.
    pub fn from_response(status: u16, text: &str) -> Self {
        if let Ok(body) = serde_json::from_str::<Value>(text) {
            return Self::Body { status, body };
        }
        if text.trim().is_empty() {
            return Self::Body {
                status,
                body: Value::String(format!("Request failed with status code {}", status)),
            };
        }
        Self::Body {
            status,
            body: Value::String(text.to_string()),
        }
    }

    /// Upstream HTTP status, if the gateway answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamDetail::Body { status, .. } => Some(*status),
            UpstreamDetail::Message(_) => None,
        }
    }

    /// JSON value surfaced to API callers under `error`
    pub fn to_json(&self) -> Value {
        match self {
            UpstreamDetail::Body { body, .. } => body.clone(),
            UpstreamDetail::Message(message) => Value::String(message.clone()),
        }
    }
}

impl fmt::Display for UpstreamDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamDetail::Body { status, body } => write!(f, "HTTP {}: {}", status, body),
            UpstreamDetail::Message(message) => f.write_str(message),
        }
    }
}

/// Core error type for all relay operations
#[derive(Debug, Error)]
pub enum RelayError {
    /// Configuration errors (missing credentials, invalid values)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Token exchange with the authorization endpoint failed
    #[error("Upstream authorization failed: {0}")]
    UpstreamAuth(UpstreamDetail),

    /// Push-payment request was rejected or could not be sent
    #[error("Upstream payment request failed: {0}")]
    UpstreamPayment(UpstreamDetail),

    /// Callback URL registration was rejected or could not be sent
    #[error("Upstream URL registration failed: {0}")]
    UpstreamRegistration(UpstreamDetail),
}

impl RelayError {
    /// Returns the HTTP status code appropriate for this error.
    ///
    /// Every failure surfaces as a 500 to callers of the relay.
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::Configuration(_) => 500,
            RelayError::UpstreamAuth(_) => 500,
            RelayError::UpstreamPayment(_) => 500,
            RelayError::UpstreamRegistration(_) => 500,
        }
    }

    /// Upstream detail carried by this error, if any
    pub fn upstream_detail(&self) -> Option<&UpstreamDetail> {
        match self {
            RelayError::Configuration(_) => None,
            RelayError::UpstreamAuth(detail)
            | RelayError::UpstreamPayment(detail)
            | RelayError::UpstreamRegistration(detail) => Some(detail),
        }
    }

    /// Payload for the `error` field of an API error response.
    ///
    /// The gateway's own body when one was received, otherwise a message.
    pub fn error_payload(&self) -> Value {
        match self.upstream_detail() {
            Some(detail) => detail.to_json(),
            None => Value::String(self.to_string()),
        }
    }
}

/// Result type alias for relay operations
pub type RelayResult<T> = Result<T, RelayError>;
