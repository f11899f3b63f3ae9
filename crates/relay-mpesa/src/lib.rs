//! # relay-mpesa
//!
//! M-Pesa Daraja gateway client for mpesa-relay.
//!
//! Components:
//!
//! 1. **TokenProvider** - client-credentials OAuth exchange
//! 2. **PaymentInitiator** - signed STK push (Lipa Na M-Pesa Online)
//! 3. **WebhookRegistrar** - C2B confirmation/validation URL registration
//! 4. **callback** - inbound notification receipt and acknowledgement
//!
//! `MpesaGateway` bundles the first three behind `relay_core::MobileMoneyGateway`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use relay_mpesa::MpesaGateway;
//! use relay_core::{MobileMoneyGateway, PushPaymentRequest};
//!
//! let gateway = MpesaGateway::from_env();
//! let response = gateway
//!     .initiate_push(&PushPaymentRequest::new(100, "254712345678"))
//!     .await?;
//! ```
//!
//! ## Callback Handling
//!
//! ```rust,ignore
//! use relay_mpesa::callback::{receive_callback, CallbackHandler, StkCallbackData, CallbackError};
//!
//! struct MyHandler;
//!
//! impl CallbackHandler for MyHandler {
//!     fn on_stk_result(&self, data: StkCallbackData) -> Result<(), CallbackError> {
//!         println!("Checkout {} finished with {}", data.checkout_request_id, data.result_code);
//!         Ok(())
//!     }
//! }
//!
//! // In your callback endpoint:
//! let ack = receive_callback(&MyHandler, &body);
//! ```

pub mod c2b;
pub mod callback;
pub mod config;
pub mod gateway;
pub mod stk;
pub mod token;
mod upstream;

// Re-exports
pub use c2b::{RegisterUrlPayload, WebhookRegistrar};
pub use callback::{
    dispatch_callback, receive_callback, C2bConfirmationData, CallbackError, CallbackHandler,
    LoggingCallbackHandler, StkCallbackData,
};
pub use config::MpesaConfig;
pub use gateway::MpesaGateway;
pub use stk::{stk_password, stk_timestamp, PaymentInitiator, StkPushPayload};
pub use token::{TokenCache, TokenProvider};
