//! Port interfaces for the control-plane suite
//!
//! These traits define the boundaries between the operation logic and
//! the infrastructure that talks HTTP or produces randomness.

use std::fmt;

use async_trait::async_trait;
use dbaas_domain::{DbaasError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// HTTP verbs used against the manager APIs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
}

impl HttpMethod {
    /// Only reads may be repeated by a transport without changing meaning
    pub const fn is_idempotent(self) -> bool {
        matches!(self, Self::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
        })
    }
}

/// Request relative to the control-plane base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: HttpMethod::Get, path: path.into(), query: Vec::new(), body: None }
    }

    pub fn post(path: impl Into<String>, body: Option<Value>) -> Self {
        Self { method: HttpMethod::Post, path: path.into(), query: Vec::new(), body }
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self { method: HttpMethod::Patch, path: path.into(), query: Vec::new(), body: Some(body) }
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

/// Raw response; status codes are interpreted by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    /// Deserialize the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            DbaasError::Decode(format!("{e} (status {}, body: {})", self.status, self.body))
        })
    }

    /// Fail unless the response carries `expected`
    pub fn expect_status(self, action: &str, expected: u16) -> Result<Self> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(DbaasError::from_status(action, expected, self.status, &self.body))
        }
    }
}

/// Executes requests against the control plane
///
/// Implementations attach credentials and map transport failures to
/// [`DbaasError::Network`]. Non-2xx responses are returned, not raised.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Source of randomness for generated test data
///
/// Production uses the thread RNG; tests substitute a seeded generator
/// to replay the same names and values.
pub trait RandomSource: Send + Sync {
    /// Uniform integer in `0..upper` (`upper` must be non-zero)
    fn below(&self, upper: u64) -> u64;
}
