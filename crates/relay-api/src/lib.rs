//! # relay-api
//!
//! HTTP API layer for mpesa-relay.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Endpoints that forward to the M-Pesa gateway
//! - Callback receiver for gateway notifications
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/token` | Fetch an access token |
//! | POST | `/stkpush` | Initiate STK push |
//! | POST | `/c2b/register` | Register C2B URLs |
//! | POST | `/callback` | Gateway notifications |

pub mod extract;
pub mod handlers;
pub mod routes;
pub mod shutdown;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
