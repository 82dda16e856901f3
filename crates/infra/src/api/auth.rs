//! Client-credentials authentication with cached tokens
//!
//! Tokens are fetched from the configured token endpoint and reused until
//! they come within five minutes of expiry.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dbaas_domain::constants::{TOKEN_LIFETIME_SECS, TOKEN_REFRESH_THRESHOLD_SECS};
use dbaas_domain::{AuthConfig, DbaasError, Result};
use reqwest::Method;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::http::HttpClient;

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token, refreshing it if needed
    async fn access_token(&self) -> Result<String>;

    /// Drop any cached token so the next call fetches a new one
    async fn invalidate(&self);
}

/// Access token with its expiry
#[derive(Debug, Clone)]
pub struct TokenSet {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    /// Token issued at `now`, living `expires_in` seconds (55 minutes when absent)
    pub fn issued(access_token: String, expires_in: Option<i64>, now: DateTime<Utc>) -> Self {
        let lifetime = expires_in.filter(|secs| *secs > 0).unwrap_or(TOKEN_LIFETIME_SECS);
        Self { access_token, expires_at: now + Duration::seconds(lifetime) }
    }

    /// True within the refresh threshold of expiry
    pub fn should_refresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_REFRESH_THRESHOLD_SECS) >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// OAuth client-credentials grant against the suite's auth endpoint
pub struct ClientCredentialsAuth {
    http: HttpClient,
    config: AuthConfig,
    cache: RwLock<Option<TokenSet>>,
}

impl ClientCredentialsAuth {
    pub fn new(http: HttpClient, config: AuthConfig) -> Self {
        Self { http, config, cache: RwLock::new(None) }
    }

    /// Expiry of the cached token, if any
    pub async fn cached_expiry(&self) -> Option<DateTime<Utc>> {
        self.cache.read().await.as_ref().map(|token| token.expires_at)
    }

    #[instrument(skip(self), fields(auth_url = %self.config.url, client_id = %self.config.client_id))]
    async fn fetch(&self) -> Result<TokenSet> {
        let form = [
            ("grant_type", self.config.grant_type.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];
        let request = self.http.request(Method::POST, &self.config.url).form(&form);
        let response = self.http.send(request).await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DbaasError::Auth(format!("Auth failed: could not read response: {e}")))?;
        if !status.is_success() {
            return Err(DbaasError::Auth(format!("Auth failed: {} {body}", status.as_u16())));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| DbaasError::Auth(format!("Auth failed: malformed token response: {e}")))?;
        let token = TokenSet::issued(parsed.access_token, parsed.expires_in, Utc::now());
        info!(expires_at = %token.expires_at, "access_token_refreshed");
        Ok(token)
    }
}

#[async_trait]
impl AccessTokenProvider for ClientCredentialsAuth {
    async fn access_token(&self) -> Result<String> {
        {
            let cached = self.cache.read().await;
            if let Some(token) = cached.as_ref().filter(|token| !token.should_refresh(Utc::now())) {
                return Ok(token.access_token.clone());
            }
        }

        let mut cache = self.cache.write().await;
        // another task may have refreshed while we waited for the lock
        if let Some(token) = cache.as_ref().filter(|token| !token.should_refresh(Utc::now())) {
            return Ok(token.access_token.clone());
        }
        let token = self.fetch().await?;
        let access_token = token.access_token.clone();
        *cache = Some(token);
        Ok(access_token)
    }

    async fn invalidate(&self) {
        debug!("access_token_invalidated");
        *self.cache.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use dbaas_domain::HttpSettings;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn http() -> HttpClient {
        HttpClient::from_settings(&HttpSettings::default()).unwrap()
    }

    fn auth(server: &MockServer) -> ClientCredentialsAuth {
        let config = AuthConfig::new(format!("{}/token", server.uri()), "suite-client", "s3cr3t");
        ClientCredentialsAuth::new(http(), config)
    }

    #[test]
    fn token_refreshes_within_five_minutes_of_expiry() {
        let now = Utc::now();
        let token = TokenSet::issued("t".into(), Some(600), now);

        assert!(!token.should_refresh(now));
        assert!(!token.should_refresh(now + Duration::seconds(299)));
        assert!(token.should_refresh(now + Duration::seconds(300)));
    }

    #[test]
    fn missing_expiry_defaults_to_55_minutes() {
        let now = Utc::now();
        assert_eq!(TokenSet::issued("t".into(), None, now).expires_at, now + Duration::minutes(55));
        assert_eq!(TokenSet::issued("t".into(), Some(0), now).expires_at, now + Duration::minutes(55));
    }

    #[tokio::test]
    async fn caches_token_until_invalidated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=suite-client"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": "abc", "expires_in": 3600})),
            )
            .expect(2)
            .mount(&server)
            .await;
        let auth = auth(&server);

        assert_eq!(auth.access_token().await.unwrap(), "abc");
        assert_eq!(auth.access_token().await.unwrap(), "abc");
        auth.invalidate().await;
        assert!(auth.cached_expiry().await.is_none());
        assert_eq!(auth.access_token().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn short_lived_token_is_fetched_every_time() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": "brief", "expires_in": 120})),
            )
            .expect(2)
            .mount(&server)
            .await;
        let auth = auth(&server);

        auth.access_token().await.unwrap();
        auth.access_token().await.unwrap();
    }

    #[tokio::test]
    async fn rejected_credentials_report_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
            .mount(&server)
            .await;

        let err = auth(&server).access_token().await.unwrap_err();

        match err {
            DbaasError::Auth(message) => {
                assert_eq!(message, "Auth failed: 401 invalid_client");
                assert!(!message.contains("s3cr3t"));
            }
            other => panic!("expected auth error, got {other:?}"),
        }
    }
}
