//! Execution engine module
//!
//! The pagination loop.
//!
//! # Overview
//!
//! Each iteration builds the query URL from the session's config and
//! cursor, fetches the page, advances the cursor whatever happened, and
//! then:
//! - hands a non-empty page to the sink,
//! - skips a failed page (its audit entry is the recovery record),
//! - stops on an empty page after calling the sink's `on_complete`.

mod types;

pub use types::{Session, SyncStats};

use crate::error::Result;
use crate::http::{HttpClientConfig, SodaClient};
use crate::output::PageSink;
use crate::pagination::PageOutcome;
use crate::query::build_query_url;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Sync engine driving one session to completion
pub struct SyncEngine {
    /// HTTP client
    client: SodaClient,
    /// Statistics
    stats: SyncStats,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(client: SodaClient) -> Self {
        Self {
            client,
            stats: SyncStats::default(),
        }
    }

    /// Create an engine whose client carries the session's token
    pub fn for_session(session: &Session, http: HttpClientConfig) -> Result<Self> {
        Ok(Self::new(SodaClient::with_config(
            &session.config().token,
            http,
        )?))
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Run one iteration and return how the page was classified.
    ///
    /// The cursor is advanced for every classified page. A malformed
    /// response is returned as an error before the cursor moves.
    pub async fn step(
        &mut self,
        session: &mut Session,
        sink: &mut dyn PageSink,
    ) -> Result<PageOutcome> {
        let cursor = session.cursor();
        let url = build_query_url(session.config(), &cursor)?;
        info!("Requesting offset {}: {}", cursor.offset, url);

        let outcome = PageOutcome::from(
            self.client
                .fetch_page(&url, session.audit_log())
                .await?,
        );
        self.stats.add_request();
        session.advance();

        match &outcome {
            PageOutcome::Records(page) => {
                sink.on_page(session.destination(), page).await?;
                self.stats.add_page(page.len());
                debug!("Stored {} records from offset {}", page.len(), cursor.offset);
            }
            PageOutcome::Failed { status } => {
                self.stats.add_failure();
                warn!(
                    "Skipping offset {} (status {}), see {}",
                    cursor.offset,
                    status.map_or_else(|| "none".to_string(), |s| s.to_string()),
                    session.audit_log().path().display()
                );
            }
            PageOutcome::Exhausted => {
                debug!("Empty page at offset {}", cursor.offset);
            }
        }

        Ok(outcome)
    }

    /// Page through the dataset until an empty page is returned
    pub async fn run(
        &mut self,
        session: &mut Session,
        sink: &mut dyn PageSink,
    ) -> Result<SyncStats> {
        let start = Instant::now();

        loop {
            let outcome = self.step(session, sink).await?;
            if outcome.is_terminal() {
                sink.on_complete(session.destination(), &[]).await?;
                break;
            }
        }

        self.stats.final_offset = session.cursor().offset;
        #[allow(clippy::cast_possible_truncation)]
        self.stats.set_duration(start.elapsed().as_millis() as u64);

        info!(
            "Completed sync to {}: {} records in {} pages, {} failed pages",
            session.destination().display(),
            self.stats.records_written,
            self.stats.pages_written,
            self.stats.pages_failed
        );

        Ok(self.stats.clone())
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("client", &self.client)
            .field("stats", &self.stats)
            .finish()
    }
}
