//! reqwest-backed [`ApiTransport`]

use std::sync::Arc;

use async_trait::async_trait;
use dbaas_core::{ApiRequest, ApiResponse, ApiTransport, HttpMethod};
use dbaas_domain::{DbaasError, Result, SuiteConfig};
use reqwest::{Method, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

use super::auth::{AccessTokenProvider, ClientCredentialsAuth};
use crate::http::HttpClient;

/// Sends control-plane requests with a bearer token
///
/// GET requests may be retried inside the HTTP client; POST and PATCH are
/// sent once. A `401` drops the cached token and the request is repeated
/// once with a fresh one.
pub struct ControlPlaneTransport {
    http: HttpClient,
    base_url: Url,
    auth: Arc<dyn AccessTokenProvider>,
}

impl ControlPlaneTransport {
    /// Transport and client-credentials auth built from the suite config
    pub fn from_config(config: &SuiteConfig) -> Result<Self> {
        let http = HttpClient::from_settings(&config.http)?;
        let auth = Arc::new(ClientCredentialsAuth::new(http.clone(), config.auth.clone()));
        Self::new(&config.base_url, http, auth)
    }

    pub fn new(base_url: &str, http: HttpClient, auth: Arc<dyn AccessTokenProvider>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| DbaasError::Config(format!("Invalid base URL '{base_url}': {e}")))?;
        Ok(Self { http, base_url, auth })
    }

    fn url(&self, request: &ApiRequest) -> Result<Url> {
        let joined = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), request.path);
        let mut url = Url::parse(&joined)
            .map_err(|e| DbaasError::Config(format!("Invalid request path '{}': {e}", request.path)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }

    async fn send(&self, request: &ApiRequest, url: &Url) -> Result<reqwest::Response> {
        let token = self.auth.access_token().await?;
        let mut builder = self
            .http
            .request(method(request.method), url.clone())
            .bearer_auth(token)
            .header("Accept", "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        if request.method.is_idempotent() {
            self.http.send(builder).await
        } else {
            self.http.send_once(builder).await
        }
    }
}

#[async_trait]
impl ApiTransport for ControlPlaneTransport {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.url(&request)?;

        let mut response = self.send(&request, &url).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("access_token_rejected_retrying");
            self.auth.invalidate().await;
            response = self.send(&request, &url).await?;
        }

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| DbaasError::Network(format!("failed to read response body: {e}")))?;
        debug!(status, "control_plane_response");
        Ok(ApiResponse::new(status, body))
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
    }
}
