//! Run configuration
//!
//! A run is configured from an optional YAML file overlaid with command-line
//! flags. Field names accept both the snake_case form and the historical
//! single-word flag spelling (`sparqlendpoint`, `outfileprefix`, ...).

use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::http::{RateLimiterConfig, RetryPolicy, SparqlClientConfig, DEFAULT_RETRYABLE_STATUSES};
use crate::types::{BackoffType, HttpMethod};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete configuration of one extraction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatorConfig {
    /// Base query file
    #[serde(default)]
    pub query: Option<PathBuf>,

    /// Page size
    #[serde(default = "default_limit")]
    pub limit: u64,

    /// Directory of the merged output
    #[serde(default = "default_out_dir", alias = "outdir")]
    pub out_dir: PathBuf,

    /// Directory of spool files
    #[serde(default = "default_tmp_dir", alias = "tmpdir")]
    pub tmp_dir: PathBuf,

    /// SPARQL endpoint URL
    #[serde(default, alias = "sparqlendpoint")]
    pub sparql_endpoint: Option<String>,

    /// Prefix shared by spool and output files
    #[serde(default = "default_prefix", alias = "outfileprefix")]
    pub out_file_prefix: String,

    /// Offset of the first window
    #[serde(default, alias = "initialoffset")]
    pub initial_offset: u64,

    /// Windows fetched concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Replace spool files left by an earlier run
    #[serde(default)]
    pub overwrite_spool: bool,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            query: None,
            limit: default_limit(),
            out_dir: default_out_dir(),
            tmp_dir: default_tmp_dir(),
            sparql_endpoint: None,
            out_file_prefix: default_prefix(),
            initial_offset: 0,
            concurrency: default_concurrency(),
            overwrite_spool: false,
            http: HttpConfig::default(),
        }
    }
}

fn default_limit() -> u64 {
    10_000
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("out")
}

fn default_tmp_dir() -> PathBuf {
    PathBuf::from("out").join("tmp")
}

fn default_prefix() -> String {
    "p".to_string()
}

fn default_concurrency() -> usize {
    1
}

impl PaginatorConfig {
    /// Parse a config from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a config from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Overlay command-line flags; any flag that was given wins
    #[must_use]
    pub fn merge_cli(mut self, cli: &Cli) -> Self {
        if let Some(query) = &cli.query {
            self.query = Some(query.clone());
        }
        if let Some(limit) = cli.limit {
            self.limit = limit;
        }
        if let Some(out_dir) = &cli.outdir {
            self.out_dir = out_dir.clone();
        }
        if let Some(tmp_dir) = &cli.tmpdir {
            self.tmp_dir = tmp_dir.clone();
        }
        if let Some(endpoint) = &cli.sparqlendpoint {
            self.sparql_endpoint = Some(endpoint.clone());
        }
        if let Some(prefix) = &cli.outfileprefix {
            self.out_file_prefix = prefix.clone();
        }
        if let Some(offset) = cli.initialoffset {
            self.initial_offset = offset;
        }
        if let Some(concurrency) = cli.concurrency {
            self.concurrency = concurrency;
        }
        if cli.overwrite_spool {
            self.overwrite_spool = true;
        }
        if let Some(retries) = cli.max_retries {
            self.http.max_retries = retries;
        }
        if let Some(timeout) = cli.timeout_secs {
            self.http.timeout_seconds = timeout;
        }
        if let Some(rps) = cli.requests_per_second {
            self.http.requests_per_second = Some(rps);
        }
        if let Some(method) = cli.http_method {
            self.http.method = method;
        }
        self
    }

    /// Check required fields and value ranges
    pub fn validate(&self) -> Result<()> {
        self.query_path()?;
        self.endpoint_url()?;

        if self.limit == 0 {
            return Err(Error::invalid_value("limit", "must be greater than zero"));
        }
        if self.concurrency == 0 {
            return Err(Error::invalid_value("concurrency", "must be at least 1"));
        }
        if self.http.timeout_seconds == 0 {
            return Err(Error::invalid_value("timeout_seconds", "must be greater than zero"));
        }
        if self.out_file_prefix.contains(['/', '\\']) {
            return Err(Error::invalid_value(
                "outfileprefix",
                "must not contain path separators",
            ));
        }
        Ok(())
    }

    /// Query file, which must be set
    pub fn query_path(&self) -> Result<&Path> {
        self.query
            .as_deref()
            .ok_or_else(|| Error::missing_field("query"))
    }

    /// Parsed endpoint URL, which must be set and use http(s)
    pub fn endpoint_url(&self) -> Result<Url> {
        let raw = self
            .sparql_endpoint
            .as_deref()
            .ok_or_else(|| Error::missing_field("sparqlendpoint"))?;
        let url = Url::parse(raw)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "sparqlendpoint",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(url)
    }

    /// Build the client configuration
    pub fn client_config(&self) -> Result<SparqlClientConfig> {
        let mut builder = SparqlClientConfig::builder(self.endpoint_url()?)
            .method(self.http.method)
            .timeout(Duration::from_secs(self.http.timeout_seconds))
            .retry(self.http.retry_policy());

        if let Some(rps) = self.http.requests_per_second {
            builder = builder.rate_limit(RateLimiterConfig::per_second(rps));
        }
        for (key, value) in &self.http.headers {
            builder = builder.header(key, value);
        }

        Ok(builder.build())
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// How queries are submitted
    #[serde(default)]
    pub method: HttpMethod,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// HTTP status codes to retry on
    #[serde(default = "default_retry_statuses")]
    pub retry_statuses: Vec<u16>,

    /// Retry backoff configuration
    #[serde(default)]
    pub retry_backoff: BackoffConfig,

    /// Requests per second limit (unset = unlimited)
    #[serde(default)]
    pub requests_per_second: Option<u32>,

    /// Extra request headers
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            method: HttpMethod::default(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_statuses: default_retry_statuses(),
            retry_backoff: BackoffConfig::default(),
            requests_per_second: None,
            headers: HashMap::new(),
        }
    }
}

impl HttpConfig {
    /// Build the retry policy
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new()
            .with_max_retries(self.max_retries)
            .with_backoff(
                self.retry_backoff.backoff_type,
                Duration::from_millis(self.retry_backoff.initial_ms),
                Duration::from_millis(self.retry_backoff.max_ms),
            )
            .with_retryable_statuses(self.retry_statuses.clone())
    }
}

fn default_timeout() -> u64 {
    300
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_statuses() -> Vec<u16> {
    DEFAULT_RETRYABLE_STATUSES.to_vec()
}

/// Backoff configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    500
}

fn default_max_ms() -> u64 {
    60000
}
