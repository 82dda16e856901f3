//! Shared helpers for `dbaas-infra` integration tests.
//!
//! Each test starts a wiremock server that serves both the token endpoint
//! and the control plane.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use dbaas_core::SuiteContext;
use dbaas_domain::{AuthConfig, PollPolicy, PollingConfig, SuiteConfig};
use dbaas_infra::ControlPlaneTransport;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PROJECT: &str = "proj-http";
pub const TOKEN: &str = "token-1";

/// Base path of the MySQL manager for the test project
pub fn mysql_base() -> String {
    format!("/mysql-manager/api/v1/projects/{PROJECT}")
}

pub fn config(server: &MockServer) -> SuiteConfig {
    let auth = AuthConfig::new(format!("{}/auth/token", server.uri()), "suite-client", "s3cr3t");
    let mut config = SuiteConfig::new(PROJECT, auth);
    config.base_url = server.uri();
    config.polling = PollingConfig::uniform(
        PollPolicy::new(Duration::from_millis(20), Duration::from_secs(5)),
        Duration::from_millis(20),
    );
    config
}

/// Token endpoint handing out [`TOKEN`] for an hour
pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": TOKEN, "expires_in": 3600})),
        )
        .mount(server)
        .await;
}

pub fn transport(server: &MockServer) -> Arc<ControlPlaneTransport> {
    Arc::new(ControlPlaneTransport::from_config(&config(server)).expect("transport"))
}

/// Route suite logs through the test harness' captured output
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("dbaas=debug")
        .with_test_writer()
        .try_init();
}

pub fn context(server: &MockServer) -> SuiteContext {
    init_test_tracing();
    SuiteContext::new(config(server), transport(server))
}
