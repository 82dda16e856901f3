//! Control-plane access: token acquisition and the HTTP transport
//!
//! [`ControlPlaneTransport`] is the `ApiTransport` used by the operations
//! in `dbaas-core`. It attaches a bearer token from an
//! [`AccessTokenProvider`] to every request.

pub mod auth;
pub mod transport;

pub use auth::{AccessTokenProvider, ClientCredentialsAuth, TokenSet};
pub use transport::ControlPlaneTransport;
