//! Output module
//!
//! Pluggable page sinks and the Parquet snapshot writer.
//!
//! # Overview
//!
//! This module provides:
//! - `PageSink` - the on-page / on-complete capability driven by the engine
//! - `JsonLinesSink` - append one JSON object per line to the destination
//! - `MemorySink` - accumulate records in memory
//! - `ParquetSink` - accumulate, then write a Parquet snapshot on completion
//! - `NoopSink` - discard everything

mod sink;
mod writer;

pub use sink::{JsonLinesSink, MemorySink, NoopSink, PageSink, ParquetSink, PARQUET_SUFFIX};
pub use writer::{records_to_batch, write_records_to_parquet, ParquetWriterConfig};

#[cfg(test)]
mod tests;
