//! Shared test helpers for `dbaas-core` integration tests.
//!
//! A scripted in-memory transport stands in for the control plane so
//! operations can be driven end to end and their request order observed.

#![allow(dead_code)]

pub mod fixtures;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use dbaas_core::{SeededRandom, SuiteContext};
use dbaas_domain::{AuthConfig, PollPolicy, PollingConfig, SuiteConfig};

pub use self::transport::ScriptedTransport;

pub const PROJECT: &str = "proj-test";

/// Context with second-scale poll budgets, for paused-time tests
pub fn context(transport: Arc<ScriptedTransport>) -> SuiteContext {
    let mut config =
        SuiteConfig::new(PROJECT, AuthConfig::new("http://auth.invalid", "client", "secret"));
    config.polling = PollingConfig::uniform(
        PollPolicy::new(Duration::from_secs(1), Duration::from_secs(60)),
        Duration::from_secs(1),
    );
    SuiteContext::new(config, transport).with_random(Arc::new(SeededRandom::new(11)))
}
