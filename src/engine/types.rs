//! Engine types
//!
//! The per-run session and the statistics a run reports.

use crate::audit::AuditLog;
use crate::config::SessionConfig;
use crate::pagination::Cursor;
use serde::Serialize;
use std::path::Path;

/// State of one fetch session.
///
/// Owns the configuration and the cursor; the engine is the only writer
/// of the cursor.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    cursor: Cursor,
    audit: AuditLog,
}

impl Session {
    /// Start a session at the configured offset and limit
    pub fn new(config: SessionConfig) -> Self {
        let cursor = Cursor::new(config.offset, config.limit);
        let audit = AuditLog::for_destination(&config.output_file);
        Self {
            config,
            cursor,
            audit,
        }
    }

    /// Session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current cursor
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Output destination
    pub fn destination(&self) -> &Path {
        &self.config.output_file
    }

    /// Audit log for this destination
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    pub(crate) fn advance(&mut self) {
        self.cursor.advance();
    }
}

/// Statistics from a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    /// Pages requested, including failed and terminal ones
    pub requests: u64,
    /// Pages handed to the sink
    pub pages_written: u64,
    /// Pages skipped after exhausting retries
    pub pages_failed: u64,
    /// Records handed to the sink
    pub records_written: u64,
    /// Cursor offset when the run ended
    pub final_offset: u64,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a request
    pub fn add_request(&mut self) {
        self.requests += 1;
    }

    /// Count a written page
    pub fn add_page(&mut self, records: usize) {
        self.pages_written += 1;
        self.records_written += records as u64;
    }

    /// Count a failed page
    pub fn add_failure(&mut self) {
        self.pages_failed += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
