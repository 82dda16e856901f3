//! # DBaaS Core
//!
//! Control-plane logic of the managed-database test suite, independent
//! of any HTTP client.
//!
//! This crate contains:
//! - Port interfaces (traits) for the transport and randomness
//! - The generic poller every asynchronous operation runs on
//! - The cluster readiness check, order builders and data generators
//! - Product operations and the end-to-end collections built on them
//!
//! ## Architecture Principles
//! - Only depends on `dbaas-domain`
//! - No HTTP or credential handling; that lives behind [`ApiTransport`]
//! - State flows through an explicit [`SuiteContext`]

pub mod client;
pub mod context;
pub mod generators;
pub mod operations;
pub mod orders;
pub mod poller;
pub mod ports;
pub mod scenarios;
pub mod status;

pub use client::ManagerClient;
pub use context::SuiteContext;
pub use generators::{SeededRandom, TestDataGenerator, ThreadRandom};
pub use operations::{ClusterOperations, MySqlOperations, OpenSearchOperations, RedisOperations};
pub use orders::{build_order, OrderInputs};
pub use poller::{PollStep, Poller};
pub use ports::{ApiRequest, ApiResponse, ApiTransport, HttpMethod, RandomSource};
pub use scenarios::{run_collection, ScenarioReport, StepRecord};
pub use status::{check_cluster_status, Readiness};
