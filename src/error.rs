//! Error types for sparql-paginator
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for sparql-paginator
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Query Template Errors
    // ============================================================================
    #[error("Query template error: {message}")]
    Template { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    #[error("Fetch failed at offset {offset}: {source}")]
    Fetch {
        offset: u64,
        #[source]
        source: Box<Error>,
    },

    #[error("Failed to spool page at offset {offset} to '{}': {source}", path.display())]
    SpoolIo {
        offset: u64,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to merge '{}': {source}", path.display())]
    MergeIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a query template error
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Wrap a remote failure with the offset of the window being fetched
    pub fn fetch(offset: u64, source: Error) -> Self {
        Self::Fetch {
            offset,
            source: Box::new(source),
        }
    }

    /// Create a spool error
    pub fn spool_io(offset: u64, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SpoolIo {
            offset,
            path: path.into(),
            source,
        }
    }

    /// Create a merge error
    pub fn merge_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::MergeIo {
            path: path.into(),
            source,
        }
    }

    /// Check if this is a transient transport failure
    ///
    /// `HttpStatus` is never transient here; statuses are classified by the
    /// client's `RetryPolicy`.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Error::RateLimited { .. } | Error::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Offset a later invocation can pass as `--initialoffset` to pick up
    /// where this failure stopped
    pub fn resume_offset(&self) -> Option<u64> {
        match self {
            Error::Fetch { offset, .. } | Error::SpoolIo { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

/// Result type alias for sparql-paginator
pub type Result<T> = std::result::Result<T, Error>;
