//! Page sinks
//!
//! A sink receives every successful non-empty page through `on_page` and
//! is told once through `on_complete` when the dataset is exhausted.

use super::writer::{write_records_to_parquet, ParquetWriterConfig};
use crate::error::Result;
use crate::types::Record;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Suffix of the snapshot written by [`ParquetSink`]
pub const PARQUET_SUFFIX: &str = ".parquet";

/// Destination for fetched pages
#[async_trait]
pub trait PageSink: Send {
    /// Store one successful, non-empty page
    async fn on_page(&mut self, destination: &Path, page: &[Record]) -> Result<()>;

    /// Called once when an empty page ends the run
    async fn on_complete(&mut self, destination: &Path, final_page: &[Record]) -> Result<()>;
}

// ============================================================================
// JSON Lines
// ============================================================================

/// Appends every record as one JSON line to the destination file
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesSink;

impl JsonLinesSink {
    /// Create a new JSON lines sink
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PageSink for JsonLinesSink {
    async fn on_page(&mut self, destination: &Path, page: &[Record]) -> Result<()> {
        let mut buf = String::new();
        for record in page {
            buf.push_str(&serde_json::to_string(record)?);
            buf.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(destination)
            .await?;
        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;

        debug!("Appended {} records to {}", page.len(), destination.display());
        Ok(())
    }

    async fn on_complete(&mut self, _destination: &Path, _final_page: &[Record]) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Accumulates every record in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Vec<Record>,
    pages: usize,
    completed: bool,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Records collected so far
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consume the sink, returning the collected records
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Number of pages received
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Whether `on_complete` has been called
    pub fn is_complete(&self) -> bool {
        self.completed
    }
}

#[async_trait]
impl PageSink for MemorySink {
    async fn on_page(&mut self, _destination: &Path, page: &[Record]) -> Result<()> {
        self.records.extend_from_slice(page);
        self.pages += 1;
        Ok(())
    }

    async fn on_complete(&mut self, _destination: &Path, _final_page: &[Record]) -> Result<()> {
        self.completed = true;
        Ok(())
    }
}

// ============================================================================
// Parquet snapshot
// ============================================================================

/// Accumulates every record, then writes `<destination>.parquet` on completion
#[derive(Debug, Default)]
pub struct ParquetSink {
    buffer: MemorySink,
    config: ParquetWriterConfig,
}

impl ParquetSink {
    /// Create a sink with default writer settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink with custom writer settings
    pub fn with_config(config: ParquetWriterConfig) -> Self {
        Self {
            buffer: MemorySink::new(),
            config,
        }
    }

    /// Path of the snapshot for a destination
    pub fn snapshot_path(destination: &Path) -> PathBuf {
        let mut path = destination.as_os_str().to_owned();
        path.push(PARQUET_SUFFIX);
        PathBuf::from(path)
    }

    /// Records buffered so far
    pub fn buffered(&self) -> usize {
        self.buffer.records().len()
    }
}

#[async_trait]
impl PageSink for ParquetSink {
    async fn on_page(&mut self, destination: &Path, page: &[Record]) -> Result<()> {
        self.buffer.on_page(destination, page).await
    }

    async fn on_complete(&mut self, destination: &Path, final_page: &[Record]) -> Result<()> {
        self.buffer.on_complete(destination, final_page).await?;

        if self.buffer.records().is_empty() {
            info!("No records buffered, skipping Parquet snapshot");
            return Ok(());
        }

        let path = Self::snapshot_path(destination);
        let rows = write_records_to_parquet(&path, self.buffer.records(), &self.config)?;
        info!("Wrote {} rows to {}", rows, path.display());
        Ok(())
    }
}

// ============================================================================
// No-op
// ============================================================================

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

#[async_trait]
impl PageSink for NoopSink {
    async fn on_page(&mut self, _destination: &Path, _page: &[Record]) -> Result<()> {
        Ok(())
    }

    async fn on_complete(&mut self, _destination: &Path, _final_page: &[Record]) -> Result<()> {
        Ok(())
    }
}
