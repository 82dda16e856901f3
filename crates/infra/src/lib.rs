//! # DBaaS Infrastructure
//!
//! Infrastructure implementations of the `dbaas-core` ports.
//!
//! This crate contains:
//! - The reqwest-backed HTTP client and control-plane transport
//! - Client-credentials token acquisition
//! - Configuration loading (environment, `.env`, TOML/JSON files)
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements traits defined in `dbaas-core`
//! - Contains all "impure" code (network, environment, files)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{AccessTokenProvider, ClientCredentialsAuth, ControlPlaneTransport, TokenSet};
pub use errors::InfraError;
pub use http::HttpClient;
pub use observability::{init_tracing, LogFormat};
