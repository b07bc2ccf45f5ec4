//! Common types used throughout sparql-paginator
//!
//! This module contains shared type definitions used across
//! multiple modules.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method used to submit a query to the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// Query passed in the `query` URL parameter
    #[default]
    Get,
    /// Query passed as a form-encoded `query` body
    Post,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Page Window
// ============================================================================

/// The `(limit, offset)` pair identifying one slice of the full result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageWindow {
    /// Page size, always greater than zero
    pub limit: u64,
    /// Number of solutions to skip
    pub offset: u64,
}

impl PageWindow {
    /// Create a window, rejecting a zero limit
    pub fn new(limit: u64, offset: u64) -> Result<Self> {
        if limit == 0 {
            return Err(Error::template("window limit must be greater than zero"));
        }
        Ok(Self { limit, offset })
    }

    /// The window directly after this one
    pub fn next(&self) -> Result<Self> {
        let offset = self.offset.checked_add(self.limit).ok_or_else(|| {
            Error::template(format!(
                "offset overflow advancing {} by {}",
                self.offset, self.limit
            ))
        })?;
        Ok(Self {
            limit: self.limit,
            offset,
        })
    }
}

impl fmt::Display for PageWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LIMIT {} OFFSET {}", self.limit, self.offset)
    }
}
