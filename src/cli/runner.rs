//! CLI runner - executes a fetch session

use crate::audit::AuditLog;
use crate::cli::commands::{Cli, SinkFormat};
use crate::config::{ConfigFile, ConfigOverrides, SessionConfig};
use crate::engine::{Session, SyncEngine};
use crate::error::{Error, Result};
use crate::http::HttpClientConfig;
use crate::output::{JsonLinesSink, NoopSink, PageSink, ParquetSink};
use std::time::Duration;
use tracing::warn;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        if self.cli.failed {
            return self.list_failed().await;
        }

        let config = self.session_config()?;
        let mut session = Session::new(config);
        let mut engine = SyncEngine::for_session(&session, self.http_config())?;
        let mut sink = self.sink();

        let stats = engine.run(&mut session, sink.as_mut()).await?;
        println!("{}", serde_json::to_string(&stats)?);
        Ok(())
    }

    /// Load the config file, if one was given
    fn config_file(&self) -> Result<ConfigFile> {
        match &self.cli.config {
            Some(path) => ConfigFile::load(path),
            None => {
                warn!("No config file given, using command-line arguments only");
                Ok(ConfigFile::default())
            }
        }
    }

    /// Merge the config file with command-line overrides
    pub fn session_config(&self) -> Result<SessionConfig> {
        SessionConfig::resolve(self.config_file()?, self.overrides())
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            url: self.cli.url.clone(),
            token: self.cli.token.clone(),
            project: self.cli.project.clone(),
            output_file: self.cli.outfile.clone(),
            offset: self.cli.offset,
            limit: self.cli.limit,
        }
    }

    /// HTTP settings from the command line
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig::builder()
            .max_attempts(self.cli.attempts)
            .retry_delay(Duration::from_millis(self.cli.retry_delay_ms))
            .build()
    }

    /// Build the selected sink
    pub fn sink(&self) -> Box<dyn PageSink> {
        match self.cli.sink {
            SinkFormat::Jsonl => Box::new(JsonLinesSink::new()),
            SinkFormat::Parquet => Box::new(ParquetSink::new()),
            SinkFormat::Discard => Box::new(NoopSink),
        }
    }

    /// Print failed requests that have not been recovered since.
    ///
    /// Only the output file is needed to find the audit log.
    async fn list_failed(&self) -> Result<()> {
        let output_file = match self.cli.outfile.clone() {
            Some(path) => path,
            None => self
                .config_file()?
                .output_file
                .ok_or_else(|| Error::missing_argument("outfile"))?,
        };

        let log = AuditLog::for_destination(&output_file);
        for entry in log.failed_requests().await? {
            println!("{}\t{}\t{}", entry.time, entry.status, entry.url);
        }
        Ok(())
    }
}
