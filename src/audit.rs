//! Request audit log
//!
//! Every terminal request outcome is appended as one JSON line to
//! `<output destination>.log`:
//!
//! ```text
//! {"time of request": "02.11.2015,09:05:03", "https://.../x.json?%24limit=1000&%24offset=0": "200"}
//! ```
//!
//! A status of `"0"` means the server never answered. The file is opened in
//! append mode for each entry and closed right after, so entries from
//! interrupted runs survive and re-runs never clobber them. Failed entries
//! are what an operator re-runs from.

use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Suffix appended to the output destination to name the audit log
pub const AUDIT_SUFFIX: &str = ".log";

/// Status recorded when the transport never produced a response
pub const NO_RESPONSE_STATUS: u16 = 0;

const TIME_KEY: &str = "time of request";
const TIME_FORMAT: &str = "%m.%d.%Y,%H:%M:%S";

/// One line of the audit log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// Local time of the request, `MM.DD.YYYY,HH:MM:SS`
    pub time: String,
    /// Full request URL
    pub url: String,
    /// HTTP status, or [`NO_RESPONSE_STATUS`]
    pub status: u16,
}

impl AuditEntry {
    /// Create an entry stamped with the given time
    pub fn new(url: impl Into<String>, status: Option<u16>, at: DateTime<Local>) -> Self {
        Self {
            time: at.format(TIME_FORMAT).to_string(),
            url: url.into(),
            status: status.unwrap_or(NO_RESPONSE_STATUS),
        }
    }

    /// Check if the request behind this entry succeeded
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Serialize to a single JSON line (without the trailing newline).
    ///
    /// The time key is always written first.
    pub fn to_line(&self) -> Result<String> {
        Ok(format!(
            "{{{}: {}, {}: {}}}",
            serde_json::to_string(TIME_KEY)?,
            serde_json::to_string(&self.time)?,
            serde_json::to_string(&self.url)?,
            serde_json::to_string(&self.status.to_string())?,
        ))
    }

    /// Parse a line written by [`AuditEntry::to_line`]
    pub fn parse_line(line: &str) -> Result<Self> {
        let Value::Object(mut map) = serde_json::from_str::<Value>(line)? else {
            return Err(malformed(line));
        };

        let time = match map.remove(TIME_KEY) {
            Some(Value::String(time)) => time,
            _ => return Err(malformed(line)),
        };

        if map.len() != 1 {
            return Err(malformed(line));
        }
        let Some((url, Value::String(status))) = map.into_iter().next() else {
            return Err(malformed(line));
        };
        let status = status.parse::<u16>().map_err(|_| malformed(line))?;

        Ok(Self { time, url, status })
    }
}

fn malformed(line: &str) -> Error {
    Error::Other(format!("Malformed audit log line: {line}"))
}

/// Append-only audit log next to an output destination
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    /// Audit log for an output destination (`<destination>.log`)
    pub fn for_destination(destination: impl AsRef<Path>) -> Self {
        let mut path = destination.as_ref().as_os_str().to_owned();
        path.push(AUDIT_SUFFIX);
        Self {
            path: PathBuf::from(path),
        }
    }

    /// Audit log at an explicit path
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a terminal request outcome, stamped with the current time
    pub async fn record(&self, url: &str, status: Option<u16>) -> Result<()> {
        self.append(&AuditEntry::new(url, status, Local::now()))
            .await
    }

    /// Append one entry
    pub async fn append(&self, entry: &AuditEntry) -> Result<()> {
        let mut line = entry.to_line()?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Read every entry; a missing log file reads as empty
    pub async fn entries(&self) -> Result<Vec<AuditEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = tokio::fs::read_to_string(&self.path).await?;
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(AuditEntry::parse_line)
            .collect()
    }

    /// Failed requests that were never followed by a success for the same URL
    pub async fn failed_requests(&self) -> Result<Vec<AuditEntry>> {
        let entries = self.entries().await?;
        let failed = entries
            .iter()
            .enumerate()
            .filter(|(i, entry)| {
                !entry.is_success()
                    && !entries[i + 1..]
                        .iter()
                        .any(|later| later.url == entry.url && later.is_success())
            })
            .map(|(_, entry)| entry.clone())
            .collect();
        Ok(failed)
    }
}
