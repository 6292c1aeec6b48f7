//! CLI module
//!
//! Command-line interface for running a fetch session.
//!
//! # Modes
//!
//! - default - page through the dataset into the chosen sink
//! - `--failed` - list request URLs the audit log still records as failed

mod commands;
mod runner;

pub use commands::{Cli, SinkFormat};
pub use runner::Runner;
