//! # OAuth Token Exchange
//!
//! Client-credentials exchange against the Daraja authorization endpoint.
//!
//! By default every call performs a fresh exchange; nothing is reused across
//! requests. Setting `token_cache_ttl` on [`MpesaConfig`] opts into a
//! [`TokenCache`].

use crate::config::MpesaConfig;
use crate::upstream::read_json;
use relay_core::{AccessToken, RelayError, RelayResult, UpstreamDetail};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Fetches bearer tokens for the other Daraja components
pub struct TokenProvider {
    config: Arc<MpesaConfig>,
    client: Client,
    cache: Option<TokenCache>,
}

impl TokenProvider {
    pub fn new(config: Arc<MpesaConfig>, client: Client) -> Self {
        let cache = config.token_cache_ttl.map(TokenCache::new);
        Self {
            config,
            client,
            cache,
        }
    }

    /// Check if tokens are reused between calls
    pub fn is_caching(&self) -> bool {
        self.cache.is_some()
    }

    /// Get a bearer token, from the cache when enabled and still fresh.
    #[instrument(skip(self))]
    pub async fn fetch_access_token(&self) -> RelayResult<AccessToken> {
        if let Some(cache) = &self.cache {
            if let Some(token) = cache.get().await {
                debug!("Reusing cached Daraja access token");
                return Ok(token);
            }
        }

        let token = self.request_token().await?;

        if let Some(cache) = &self.cache {
            cache.store(token.clone()).await;
        }

        Ok(token)
    }

    async fn request_token(&self) -> RelayResult<AccessToken> {
        let response = self
            .client
            .get(self.config.token_url())
            .header(AUTHORIZATION, self.config.basic_auth_header())
            .send()
            .await
            .map_err(|e| RelayError::UpstreamAuth(UpstreamDetail::Message(e.to_string())))?;

        let body = read_json(response, RelayError::UpstreamAuth).await?;
        let token = parse_token_response(&body)?;

        debug!(expires_in = ?token.expires_in, "Obtained Daraja access token");
        Ok(token)
    }
}

/// Pull the token out of `{"access_token": "...", "expires_in": "3599"}`.
///
/// Daraja sends `expires_in` as a string; numbers are accepted too.
fn parse_token_response(body: &Value) -> RelayResult<AccessToken> {
    let access_token = body
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            RelayError::UpstreamAuth(UpstreamDetail::Message(format!(
                "Token response missing access_token: {}",
                body
            )))
        })?;

    let expires_in = body.get("expires_in").and_then(|v| {
        v.as_u64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
    });

    Ok(AccessToken {
        access_token: access_token.to_string(),
        expires_in,
    })
}

/// Single-slot token cache with a fixed time-to-live.
///
/// A token expires at whichever comes first: the configured TTL or the
/// lifetime the gateway reported.
pub struct TokenCache {
    ttl: Duration,
    slot: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    token: AccessToken,
    expires_at: Instant,
}

impl TokenCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Cached token, if one is stored and not yet expired
    pub async fn get(&self) -> Option<AccessToken> {
        let slot = self.slot.lock().await;
        slot.as_ref()
            .filter(|cached| Instant::now() < cached.expires_at)
            .map(|cached| cached.token.clone())
    }

    pub async fn store(&self, token: AccessToken) {
        let lifetime = token
            .expires_in
            .map(Duration::from_secs)
            .map_or(self.ttl, |reported| reported.min(self.ttl));

        *self.slot.lock().await = Some(CachedToken {
            token,
            expires_at: Instant::now() + lifetime,
        });
    }

    pub async fn clear(&self) {
        *self.slot.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer, ttl: Option<Duration>) -> TokenProvider {
        let mut config =
            MpesaConfig::new("key", "secret", "174379", "test").with_base_url(server.uri());
        config.token_cache_ttl = ttl;
        TokenProvider::new(Arc::new(config), Client::new())
    }

    #[test]
    fn test_parse_token_response() {
        let token =
            parse_token_response(&json!({"access_token": "abc", "expires_in": "3599"})).unwrap();
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.expires_in, Some(3599));

        let token = parse_token_response(&json!({"access_token": "abc", "expires_in": 60}))
            .unwrap();
        assert_eq!(token.expires_in, Some(60));

        assert!(matches!(
            parse_token_response(&json!({"expires_in": "3599"})),
            Err(RelayError::UpstreamAuth(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_returns_token_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/v1/generate"))
            .and(query_param("grant_type", "client_credentials"))
            .and(header("Authorization", "Basic a2V5OnNlY3JldA=="))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "c9SQxWWhmdVRlyh0zh8gZDTkubVF", "expires_in": "3599"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server, None);
        let token = provider.fetch_access_token().await.unwrap();

        assert_eq!(token.access_token, "c9SQxWWhmdVRlyh0zh8gZDTkubVF");
        assert_eq!(token.expires_in, Some(3599));
    }

    #[tokio::test]
    async fn test_fetch_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/v1/generate"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "resultCode": "401.002.01",
                "resultDesc": "Error Occurred - Invalid Access Token"
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server, None);
        let err = provider.fetch_access_token().await.unwrap_err();

        match err {
            RelayError::UpstreamAuth(detail) => {
                assert_eq!(detail.status(), Some(401));
                assert_eq!(detail.to_json()["resultCode"], "401.002.01");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_no_cache_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/v1/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t"})))
            .expect(2)
            .mount(&server)
            .await;

        let provider = provider_for(&server, None);
        assert!(!provider.is_caching());
        provider.fetch_access_token().await.unwrap();
        provider.fetch_access_token().await.unwrap();
    }

    #[tokio::test]
    async fn test_cache_reuses_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/v1/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "t", "expires_in": "3599"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server, Some(Duration::from_secs(300)));
        assert!(provider.is_caching());
        let first = provider.fetch_access_token().await.unwrap();
        let second = provider.fetch_access_token().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_expiry() {
        let cache = TokenCache::new(Duration::from_secs(60));
        assert!(cache.get().await.is_none());

        cache.store(AccessToken::new("t")).await;
        assert!(cache.get().await.is_some());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_honors_reported_lifetime() {
        let cache = TokenCache::new(Duration::from_secs(600));
        cache
            .store(AccessToken {
                access_token: "t".into(),
                expires_in: Some(30),
            })
            .await;

        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(cache.get().await.is_none());

        cache.store(AccessToken::new("u")).await;
        cache.clear().await;
        assert!(cache.get().await.is_none());
    }
}
