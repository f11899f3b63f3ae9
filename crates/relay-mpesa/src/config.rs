//! # M-Pesa Configuration
//!
//! Configuration management for the Daraja integration.
//! All secrets are loaded from environment variables once at startup and
//! handed to each component explicitly.

use base64::{prelude::BASE64_STANDARD, Engine};
use relay_core::{RelayError, RelayResult};
use std::env;
use std::fmt;
use std::time::Duration;

/// Daraja sandbox endpoint
pub const SANDBOX_BASE_URL: &str = "https://sandbox.safaricom.co.ke";

/// Placeholder used when `MPESA_CALLBACK_URL` is not set
pub const DEFAULT_CALLBACK_URL: &str = "https://yourdomain.com/callback";

/// Daraja API configuration
#[derive(Clone)]
pub struct MpesaConfig {
    /// App consumer key from the Daraja portal
    pub consumer_key: String,

    /// App consumer secret from the Daraja portal
    pub consumer_secret: String,

    /// Paybill or till number
    pub shortcode: String,

    /// Lipa Na M-Pesa Online passkey
    pub passkey: String,

    /// API base URL (sandbox, production, or a mock server)
    pub base_url: String,

    /// Where the gateway posts STK push results
    pub callback_url: String,

    /// Reuse tokens for this long. `None` fetches a fresh token every call.
    pub token_cache_ttl: Option<Duration>,
}

impl MpesaConfig {
    /// Load configuration from environment variables.
    ///
    /// Env vars:
    /// - `MPESA_CONSUMER_KEY`, `MPESA_CONSUMER_SECRET`
    /// - `MPESA_SHORTCODE`, `MPESA_PASSKEY`
    /// - `MPESA_BASE_URL` (defaults to the sandbox)
    /// - `MPESA_CALLBACK_URL` (defaults to a placeholder)
    /// - `MPESA_TOKEN_CACHE_TTL_SECS` (optional, caching is off without it)
    ///
    /// Missing credentials are not an error here; see [`MpesaConfig::validate`].
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token_cache_ttl = var("MPESA_TOKEN_CACHE_TTL_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self {
            consumer_key: var("MPESA_CONSUMER_KEY").unwrap_or_default(),
            consumer_secret: var("MPESA_CONSUMER_SECRET").unwrap_or_default(),
            shortcode: var("MPESA_SHORTCODE").unwrap_or_default(),
            passkey: var("MPESA_PASSKEY").unwrap_or_default(),
            base_url: var("MPESA_BASE_URL").unwrap_or_else(|| SANDBOX_BASE_URL.to_string()),
            callback_url: var("MPESA_CALLBACK_URL")
                .unwrap_or_else(|| DEFAULT_CALLBACK_URL.to_string()),
            token_cache_ttl,
        }
    }

    /// Create config with explicit values (for testing)
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        shortcode: impl Into<String>,
        passkey: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            shortcode: shortcode.into(),
            passkey: passkey.into(),
            base_url: SANDBOX_BASE_URL.to_string(),
            callback_url: DEFAULT_CALLBACK_URL.to_string(),
            token_cache_ttl: None,
        }
    }

    /// Names of the credential variables that are not set
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        [
            ("MPESA_CONSUMER_KEY", &self.consumer_key),
            ("MPESA_CONSUMER_SECRET", &self.consumer_secret),
            ("MPESA_SHORTCODE", &self.shortcode),
            ("MPESA_PASSKEY", &self.passkey),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Check that every credential is present
    pub fn validate(&self) -> RelayResult<()> {
        let missing = self.missing_credentials();
        if missing.is_empty() {
            return Ok(());
        }
        Err(RelayError::Configuration(format!(
            "missing credentials: {}",
            missing.join(", ")
        )))
    }

    /// Check if pointed at the sandbox
    pub fn is_sandbox(&self) -> bool {
        self.base_url.contains("sandbox")
    }

    /// Get the Basic authorization header value for the token exchange
    pub fn basic_auth_header(&self) -> String {
        let credentials = format!("{}:{}", self.consumer_key, self.consumer_secret);
        format!("Basic {}", BASE64_STANDARD.encode(credentials))
    }

    /// OAuth token endpoint
    pub fn token_url(&self) -> String {
        format!(
            "{}/oauth/v1/generate?grant_type=client_credentials",
            self.api_root()
        )
    }

    /// STK push endpoint
    pub fn stk_push_url(&self) -> String {
        format!("{}/mpesa/stkpush/v1/processrequest", self.api_root())
    }

    /// C2B URL registration endpoint
    pub fn register_url_endpoint(&self) -> String {
        format!("{}/mpesa/c2b/v1/registerurl", self.api_root())
    }

    fn api_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder: set the STK result callback URL
    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = url.into();
        self
    }

    /// Builder: enable token reuse for `ttl`
    pub fn with_token_cache_ttl(mut self, ttl: Duration) -> Self {
        self.token_cache_ttl = Some(ttl);
        self
    }
}

impl fmt::Debug for MpesaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MpesaConfig")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("shortcode", &self.shortcode)
            .field("passkey", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("callback_url", &self.callback_url)
            .field("token_cache_ttl", &self.token_cache_ttl)
            .finish()
    }
}
