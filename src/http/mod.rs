//! HTTP client module
//!
//! Provides the SPARQL protocol client with retry, rate limiting, and
//! backoff strategies.
//!
//! # Features
//!
//! - **Automatic Retries**: Explicit `RetryPolicy` with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Backoff Strategies**: Constant, linear, and exponential backoff
//! - **Bounded Wait**: Every request carries a timeout

mod client;
mod rate_limit;
mod retry;

pub use client::{SparqlClient, SparqlClientConfig, SparqlClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use retry::{RetryPolicy, DEFAULT_RETRYABLE_STATUSES};
