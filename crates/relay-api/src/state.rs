//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the gateway client, the callback handler, and server configuration.

use relay_core::BoxedGateway;
use relay_mpesa::{CallbackHandler, LoggingCallbackHandler, MpesaConfig, MpesaGateway};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Upstream gateway client
    pub gateway: BoxedGateway,
    /// Receives parsed gateway notifications
    pub callbacks: Arc<dyn CallbackHandler>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState backed by the Daraja gateway.
    ///
    /// Missing credentials only produce a warning; gateway calls will fail
    /// until they are provided.
    pub fn new() -> Self {
        let config = AppConfig::from_env();
        let mpesa = MpesaConfig::from_env();

        if let Err(e) = mpesa.validate() {
            warn!("{}; gateway calls will fail until these are set", e);
        }
        if let Some(ttl) = mpesa.token_cache_ttl {
            info!("Access token cache enabled: ttl={}s", ttl.as_secs());
        }
        info!(
            "Daraja endpoint: {} (sandbox={})",
            mpesa.base_url,
            mpesa.is_sandbox()
        );

        Self::with_gateway(Arc::new(MpesaGateway::new(mpesa)), config)
    }

    /// Create with an explicit gateway (for testing)
    pub fn with_gateway(gateway: BoxedGateway, config: AppConfig) -> Self {
        Self {
            gateway,
            callbacks: Arc::new(LoggingCallbackHandler),
            config,
        }
    }

    /// Builder: replace the callback handler
    pub fn with_callback_handler(mut self, handler: Arc<dyn CallbackHandler>) -> Self {
        self.callbacks = handler;
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
