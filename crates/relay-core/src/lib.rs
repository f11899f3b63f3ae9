//! # relay-core
//!
//! Core types and traits for the mpesa-relay gateway client.
//!
//! This crate provides:
//! - `MobileMoneyGateway` trait implemented by upstream providers
//! - `PushPaymentRequest` and `RegisterUrlsRequest` as received from clients
//! - `AccessToken` and `Acknowledgement`
//! - `RelayError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use relay_core::{MobileMoneyGateway, PushPaymentRequest};
//!
//! let request = PushPaymentRequest::new(100, "254712345678");
//! let response = gateway.initiate_push(&request).await?;
//!
//! // response carries CheckoutRequestID, ResponseCode, ...
//! ```

pub mod error;
pub mod gateway;
pub mod payment;

// Re-exports for convenience
pub use error::{RelayError, RelayResult, UpstreamDetail};
pub use gateway::{BoxedGateway, MobileMoneyGateway};
pub use payment::{
    AccessToken, Acknowledgement, GatewayResponse, PushPaymentRequest, RegisterUrlsRequest,
    DEFAULT_ACCOUNT_REFERENCE, DEFAULT_TRANSACTION_DESC,
};
