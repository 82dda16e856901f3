//! HTTP client shared by the token provider and the control-plane transport

pub mod client;

pub use client::HttpClient;
