//! CLI arguments

use crate::http::DEFAULT_MAX_ATTEMPTS;
use clap::Parser;
use std::path::PathBuf;

/// Page through a Socrata Open Data API dataset and store every record
#[derive(Parser, Debug)]
#[command(name = "soda-fetch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Dataset endpoint URL
    #[arg(long)]
    pub url: Option<String>,

    /// Output file (generated from the project name and time when omitted)
    #[arg(long)]
    pub outfile: Option<String>,

    /// App token sent as X-App-Token
    #[arg(long)]
    pub token: Option<String>,

    /// Configuration file (YAML)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Project name used for generated output filenames
    #[arg(long)]
    pub project: Option<String>,

    /// Starting $offset, overrides the config file
    #[arg(long)]
    pub offset: Option<u64>,

    /// Page size ($limit), overrides the config file
    #[arg(long)]
    pub limit: Option<u64>,

    /// Where fetched pages go
    #[arg(long, value_enum, default_value = "jsonl")]
    pub sink: SinkFormat,

    /// Attempts per page before it is skipped
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub attempts: u32,

    /// Pause between attempts, in milliseconds
    #[arg(long, default_value = "0")]
    pub retry_delay_ms: u64,

    /// List failed requests from the audit log and exit
    #[arg(long)]
    pub failed: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Sink selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SinkFormat {
    /// Append one JSON object per line to the output file
    Jsonl,
    /// Buffer everything, write <outfile>.parquet at the end
    Parquet,
    /// Fetch only; the audit log is still written
    #[value(name = "none")]
    Discard,
}
