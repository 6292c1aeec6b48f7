//! Session configuration
//!
//! A fetch session is configured from two sources: an optional YAML config
//! file and command-line overrides. Overrides win only when they were
//! explicitly supplied, so an absent flag never clears a value from the file.
//!
//! ```yaml
//! url: "https://data.sfgov.org/resource/wr8u-xric.json"
//! token: "my-app-token"
//! project: "fire-incidents"
//! $where: "incident_date > '2015-01-01'"
//! $limit: 500
//! filters:
//!   battalion: "B02"
//! ```

use crate::error::{Error, Result};
use crate::types::{Filters, SoqlDirective};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default `$offset` when none is configured
pub const DEFAULT_OFFSET: u64 = 0;

/// Default `$limit` when none is configured
pub const DEFAULT_LIMIT: u64 = 1000;

/// Filename base used when neither an output file nor a project is given
pub const DEFAULT_PROJECT: &str = "myproject";

// ============================================================================
// Config File
// ============================================================================

/// A YAML scalar that is passed through as a string.
///
/// Lets users write `$limit: 500` or `year: 2015` without quoting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl ScalarValue {
    /// Render the scalar as it should appear in a query string
    pub fn render(&self) -> String {
        match self {
            ScalarValue::String(s) => s.clone(),
            ScalarValue::Integer(i) => i.to_string(),
            ScalarValue::Float(f) => f.to_string(),
            ScalarValue::Bool(b) => b.to_string(),
        }
    }

    /// Parse the scalar as a non-negative integer
    fn as_count(&self, field: &str) -> Result<u64> {
        let parsed = match self {
            ScalarValue::Integer(i) => u64::try_from(*i).ok(),
            ScalarValue::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| {
            Error::invalid_value(
                field,
                format!("expected a non-negative integer, got '{}'", self.render()),
            )
        })
    }
}

/// Raw contents of a session config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Endpoint base URL
    #[serde(default)]
    pub url: Option<String>,

    /// App token sent as `X-App-Token`
    #[serde(default)]
    pub token: Option<String>,

    /// Project name used for generated output filenames
    #[serde(default)]
    pub project: Option<String>,

    /// Output destination
    #[serde(default, alias = "outfile")]
    pub output_file: Option<String>,

    #[serde(default, rename = "$select", alias = "select")]
    pub select: Option<ScalarValue>,

    #[serde(default, rename = "$where", alias = "where")]
    pub where_clause: Option<ScalarValue>,

    #[serde(default, rename = "$order", alias = "order")]
    pub order: Option<ScalarValue>,

    #[serde(default, rename = "$group", alias = "group")]
    pub group: Option<ScalarValue>,

    #[serde(default, rename = "$limit", alias = "limit")]
    pub limit: Option<ScalarValue>,

    #[serde(default, rename = "$offset", alias = "offset")]
    pub offset: Option<ScalarValue>,

    /// Column filters, passed through verbatim
    #[serde(default)]
    pub filters: BTreeMap<String, ScalarValue>,
}

impl ConfigFile {
    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse a config file from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            tracing::warn!("Config file is empty, using defaults");
            return Ok(Self::default());
        }

        Ok(serde_yaml::from_str(yaml)?)
    }
}

// ============================================================================
// Overrides
// ============================================================================

/// Values supplied on the command line.
///
/// `None` means "not given"; `Some("")` is a deliberate empty value and does
/// override the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub url: Option<String>,
    pub token: Option<String>,
    pub project: Option<String>,
    pub output_file: Option<String>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

// ============================================================================
// Session Config
// ============================================================================

/// SoQL directives other than the pagination pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoqlQuery {
    pub select: Option<String>,
    pub where_clause: Option<String>,
    pub order: Option<String>,
    pub group: Option<String>,
}

impl SoqlQuery {
    /// Value configured for a directive.
    ///
    /// Always `None` for `$limit` and `$offset`, which live in the cursor.
    pub fn get(&self, directive: SoqlDirective) -> Option<&str> {
        match directive {
            SoqlDirective::Select => self.select.as_deref(),
            SoqlDirective::Where => self.where_clause.as_deref(),
            SoqlDirective::Order => self.order.as_deref(),
            SoqlDirective::Group => self.group.as_deref(),
            SoqlDirective::Limit | SoqlDirective::Offset => None,
        }
    }
}

/// Fully resolved configuration for one fetch session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Endpoint base URL
    pub url: String,
    /// App token
    pub token: String,
    /// Optional project name
    pub project: Option<String>,
    /// Output destination; the audit log lives next to it
    pub output_file: PathBuf,
    /// Column filters
    pub filters: Filters,
    /// Non-pagination SoQL directives
    pub query: SoqlQuery,
    /// Starting offset
    pub offset: u64,
    /// Page size
    pub limit: u64,
}

impl SessionConfig {
    /// Create a config with defaults for everything except the required fields
    pub fn new(
        url: impl Into<String>,
        token: impl Into<String>,
        output_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            project: None,
            output_file: output_file.into(),
            filters: Filters::new(),
            query: SoqlQuery::default(),
            offset: DEFAULT_OFFSET,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Add a filter
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Set the starting offset
    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Set the page size
    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Set the SoQL directives
    #[must_use]
    pub fn with_query(mut self, query: SoqlQuery) -> Self {
        self.query = query;
        self
    }

    /// Merge a config file with command-line overrides.
    ///
    /// Fails with [`Error::MissingArgument`] if `url` or `token` is still
    /// absent afterwards. Offset and limit fall back to the SODA defaults,
    /// and the output file is generated from the project name when unset.
    pub fn resolve(file: ConfigFile, overrides: ConfigOverrides) -> Result<Self> {
        let url = overrides
            .url
            .or(file.url)
            .ok_or_else(|| Error::missing_argument("url"))?;
        let token = overrides
            .token
            .or(file.token)
            .ok_or_else(|| Error::missing_argument("token"))?;
        let project = overrides.project.or(file.project);

        let offset = match overrides.offset {
            Some(offset) => offset,
            None => file
                .offset
                .as_ref()
                .map(|v| v.as_count("$offset"))
                .transpose()?
                .unwrap_or(DEFAULT_OFFSET),
        };
        let limit = match overrides.limit {
            Some(limit) => limit,
            None => file
                .limit
                .as_ref()
                .map(|v| v.as_count("$limit"))
                .transpose()?
                .unwrap_or(DEFAULT_LIMIT),
        };
        if limit == 0 {
            return Err(Error::invalid_value("$limit", "must be greater than zero"));
        }

        let output_file = match overrides.output_file.or(file.output_file) {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(generate_filename(
                project.as_deref().unwrap_or(DEFAULT_PROJECT),
            )),
        };

        if let Some(key) = file.filters.keys().find(|k| k.starts_with('$')) {
            return Err(Error::config(format!(
                "filter '{key}' collides with a SoQL directive; set it at the top level"
            )));
        }
        let filters = file
            .filters
            .iter()
            .map(|(k, v)| (k.clone(), v.render()))
            .collect();

        let query = SoqlQuery {
            select: file.select.as_ref().map(ScalarValue::render),
            where_clause: file.where_clause.as_ref().map(ScalarValue::render),
            order: file.order.as_ref().map(ScalarValue::render),
            group: file.group.as_ref().map(ScalarValue::render),
        };

        Ok(Self {
            url,
            token,
            project,
            output_file,
            filters,
            query,
            offset,
            limit,
        })
    }
}

// ============================================================================
// Filename Generation
// ============================================================================

/// Build a unique output filename from a base name and the current time
pub fn generate_filename(base: &str) -> String {
    generate_filename_at(base, Local::now())
}

/// Build an output filename for a specific timestamp
pub fn generate_filename_at(base: &str, at: DateTime<Local>) -> String {
    format!("{base}.{}.json", at.format("%m%d%Y.%H%M%S"))
}
