//! # soda-fetch
//!
//! Paginated record extraction from Socrata Open Data API (SODA) endpoints.
//!
//! ## Features
//!
//! - **Offset pagination**: `$offset` advances by `$limit` until an empty page
//! - **Bounded retry**: failed pages are skipped, never fatal to the run
//! - **Audit log**: one line per request outcome in `<output>.log`
//! - **Pluggable sinks**: JSON lines, in-memory, Parquet snapshot, no-op
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use soda_fetch::config::SessionConfig;
//! use soda_fetch::engine::{Session, SyncEngine};
//! use soda_fetch::http::HttpClientConfig;
//! use soda_fetch::output::JsonLinesSink;
//!
//! #[tokio::main]
//! async fn main() -> soda_fetch::Result<()> {
//!     let config = SessionConfig::new(
//!         "https://data.sfgov.org/resource/wr8u-xric.json",
//!         "my-app-token",
//!         "fire.json",
//!     )
//!     .filter("battalion", "B02");
//!
//!     let mut session = Session::new(config);
//!     let mut engine = SyncEngine::for_session(&session, HttpClientConfig::default())?;
//!     let stats = engine.run(&mut session, &mut JsonLinesSink::new()).await?;
//!     println!("{} records", stats.records_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//!  SessionConfig ──► Session (config + cursor)
//!                        │
//!          ┌─────────────┴──────────────┐
//!          ▼                            │ advance offset
//!   query::build_query_url              │ after every page
//!          │                            │
//!          ▼                            │
//!   SodaClient::fetch_page ──► AuditLog │
//!          │                            │
//!          ▼                            │
//!     PageOutcome ──────────────────────┘
//!     ├─ Records   ─► PageSink::on_page
//!     ├─ Failed    ─► skip
//!     └─ Exhausted ─► PageSink::on_complete, stop
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Session configuration and config file loading
pub mod config;

/// Query URL construction
pub mod query;

/// Request audit log
pub mod audit;

/// HTTP fetcher with bounded retry
pub mod http;

/// Cursor and page classification
pub mod pagination;

/// Page sinks
pub mod output;

/// Pagination loop
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
