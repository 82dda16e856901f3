//! # DBaaS Domain
//!
//! Data types shared by every layer of the managed-database test suite.
//!
//! This crate contains:
//! - Order, item and command models as the control plane returns them
//! - Product/topology descriptors and the static region table
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other suite crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
