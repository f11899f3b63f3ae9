//! # Routes
//!
//! Axum router configuration for the relay API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /token        - Fetch a gateway access token
/// - POST /stkpush      - Initiate an STK push
/// - POST /c2b/register - Register C2B callback URLs
/// - POST /callback     - Gateway notifications (always acknowledged)
/// - GET  /health, /    - Health check
pub fn create_router(state: AppState) -> Router {
    // Browser clients call /stkpush directly
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        // Gateway operations
        .route("/token", get(handlers::get_token))
        .route("/stkpush", post(handlers::stk_push))
        .route("/c2b/register", post(handlers::register_c2b))
        // Inbound notifications
        .route("/callback", post(handlers::callback))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        // State
        .with_state(state)
}
