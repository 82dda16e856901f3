use std::time::Duration;

use dbaas_domain::{DbaasError, HttpSettings, Result};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

const USER_AGENT: &str = concat!("dbaas-e2e/", env!("CARGO_PKG_VERSION"));
const DEFAULT_BACKOFF: Duration = Duration::from_millis(200);

/// reqwest client with a per-request attempt budget.
///
/// [`HttpClient::send`] repeats a request on a 5xx response or a
/// connect/timeout failure, up to `max_attempts`. Requests that must
/// reach the server at most once go through [`HttpClient::send_once`].
#[derive(Clone)]
pub struct HttpClient {
    inner: ReqwestClient,
    max_attempts: usize,
    backoff: Duration,
}

impl HttpClient {
    /// Client configured from the suite's transport settings.
    pub fn from_settings(settings: &HttpSettings) -> Result<Self> {
        Self::with_backoff(settings, DEFAULT_BACKOFF)
    }

    /// Like [`Self::from_settings`] with an explicit base delay between attempts.
    pub fn with_backoff(settings: &HttpSettings, backoff: Duration) -> Result<Self> {
        let inner = ReqwestClient::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent(USER_AGENT)
            .no_proxy()
            .build()
            .map_err(|err| DbaasError::from(InfraError::from(err)))?;

        Ok(Self { inner, max_attempts: settings.max_attempts.max(1), backoff })
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.inner.request(method, url)
    }

    /// Send with the configured attempt budget.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        self.send_with_attempts(builder, self.max_attempts).await
    }

    /// Send exactly once.
    pub async fn send_once(&self, builder: RequestBuilder) -> Result<Response> {
        self.send_with_attempts(builder, 1).await
    }

    async fn send_with_attempts(&self, builder: RequestBuilder, attempts: usize) -> Result<Response> {
        let mut attempt = 1;
        loop {
            let request = builder
                .try_clone()
                .ok_or_else(|| DbaasError::Config("streaming request bodies cannot be sent".into()))?
                .build()
                .map_err(|err| DbaasError::from(InfraError::from(err)))?;
            let method = request.method().clone();
            let path = request.url().path().to_string();

            let outcome = self.inner.execute(request).await;
            let retryable = match &outcome {
                Ok(response) => {
                    debug!(attempt, %method, path = %path, status = %response.status(), "http_response_received");
                    response.status().is_server_error()
                }
                Err(err) => {
                    debug!(attempt, %method, path = %path, error = %err, "http_request_failed");
                    err.is_timeout() || err.is_connect()
                }
            };

            if !retryable || attempt >= attempts {
                return outcome.map_err(|err| InfraError::from(err).into());
            }
            tokio::time::sleep(self.delay_after(attempt)).await;
            attempt += 1;
        }
    }

    /// Doubling delay, capped at 2^8 times the base.
    fn delay_after(&self, attempt: usize) -> Duration {
        let exponent = u32::try_from(attempt.saturating_sub(1).min(8)).unwrap_or(8);
        self.backoff.saturating_mul(1 << exponent)
    }
}
