//! # mpesa-relay
//!
//! HTTP relay in front of the M-Pesa Daraja API.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export MPESA_CONSUMER_KEY=...
//! export MPESA_CONSUMER_SECRET=...
//! export MPESA_SHORTCODE=174379
//! export MPESA_PASSKEY=...
//! export MPESA_CALLBACK_URL=https://yourdomain.com/callback
//!
//! # Run the server (LOG_FORMAT=json for structured logs)
//! mpesa-relay
//! ```

use relay_api::{routes, shutdown::shutdown_signal, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    init_tracing();

    // Print banner
    print_banner();

    // Initialize application state
    let state = AppState::new();

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment provider: {}", state.gateway.provider_name());

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("Mpesa-relay starting on http://{}", addr);

    if !is_prod {
        info!("STK push: POST http://{}/stkpush", addr);
        info!("Callback: POST http://{}/callback", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn print_banner() {
    println!(
        r#"
  mpesa-relay
  ━━━━━━━━━━━━━━━━━━━━━━━
  Daraja STK push relay
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
