//! HTTP module
//!
//! Single-page fetcher for SODA endpoints.
//!
//! # Features
//!
//! - **App token**: every request carries `X-App-Token`
//! - **Bounded retry**: a fixed attempt budget, transport errors and non-200
//!   statuses consume attempts alike
//! - **Audit trail**: one audit log line per call, never per attempt

mod client;

pub use client::{
    FetchOutcome, HttpClientConfig, HttpClientConfigBuilder, SodaClient, APP_TOKEN_HEADER,
    DEFAULT_MAX_ATTEMPTS,
};
