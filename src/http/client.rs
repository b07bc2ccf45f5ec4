//! SPARQL protocol client with retry and rate limiting
//!
//! Provides an HTTP client that handles:
//! - Query submission over GET (`?query=`) or POST (form body)
//! - Automatic retries driven by a `RetryPolicy`
//! - Optional rate limiting
//! - A bounded wait on every request

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::retry::RetryPolicy;
use crate::error::{Error, Result};
use crate::types::HttpMethod;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Longest response body kept in an error message
const ERROR_BODY_LIMIT: usize = 512;

/// Configuration for the SPARQL client
#[derive(Debug, Clone)]
pub struct SparqlClientConfig {
    /// SPARQL endpoint URL
    pub endpoint: Url,
    /// How the query is submitted
    pub method: HttpMethod,
    /// Request timeout
    pub timeout: Duration,
    /// Retry and backoff policy
    pub retry: RetryPolicy,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl SparqlClientConfig {
    /// Create a config for an endpoint with default settings
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            method: HttpMethod::Get,
            timeout: Duration::from_secs(300),
            retry: RetryPolicy::default(),
            rate_limit: None,
            default_headers: HashMap::new(),
            user_agent: format!("sparql-paginator/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Create a new config builder
    pub fn builder(endpoint: Url) -> SparqlClientConfigBuilder {
        SparqlClientConfigBuilder {
            config: Self::new(endpoint),
        }
    }
}

/// Builder for SPARQL client config
pub struct SparqlClientConfigBuilder {
    config: SparqlClientConfig,
}

impl SparqlClientConfigBuilder {
    /// Set the HTTP method
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.config.method = method;
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the retry policy
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> SparqlClientConfig {
        self.config
    }
}

/// Client executing queries against one SPARQL endpoint
pub struct SparqlClient {
    client: Client,
    config: SparqlClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl SparqlClient {
    /// Create a new client with the given configuration
    pub fn with_config(config: SparqlClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Get the client configuration
    pub fn config(&self) -> &SparqlClientConfig {
        &self.config
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Execute a query and return the response body
    ///
    /// Transient failures are retried according to the retry policy. The
    /// response is fully read or dropped before this returns.
    pub async fn execute(&self, query: &str, accept: &str) -> Result<String> {
        let policy = &self.config.retry;
        let max_retries = policy.max_retries;
        let mut attempt = 0;

        loop {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            let err = match self.send(query, accept).await {
                Ok(body) => {
                    debug!("Query succeeded against {}", self.config.endpoint);
                    return Ok(body);
                }
                Err(err) => err,
            };

            if attempt >= max_retries || !self.should_retry(&err) {
                return Err(err);
            }

            let delay = match &err {
                Error::RateLimited {
                    retry_after_seconds,
                } => Duration::from_secs(*retry_after_seconds).min(policy.max_backoff),
                _ => policy.delay_for(attempt),
            };
            warn!(
                "Request failed ({}), attempt {}/{}, retrying in {:?}",
                err,
                attempt + 1,
                max_retries + 1,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// One attempt: send the request and read the whole body
    async fn send(&self, query: &str, accept: &str) -> Result<String> {
        let mut req = match self.config.method {
            HttpMethod::Get => self
                .client
                .get(self.config.endpoint.clone())
                .query(&[("query", query)]),
            HttpMethod::Post => self
                .client
                .post(self.config.endpoint.clone())
                .form(&[("query", query)]),
        };

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }

        let response = req
            .header(ACCEPT, accept)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            if let Some(retry_after) = extract_retry_after(&response) {
                return Err(Error::RateLimited {
                    retry_after_seconds: retry_after,
                });
            }
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), truncate(&body)));
        }

        if let Some(content_type) = media_type(&response) {
            if !is_acceptable(&content_type, accept) {
                return Err(Error::decode(format!(
                    "endpoint answered {status} with {content_type} instead of {accept}"
                )));
            }
        }

        response.text().await.map_err(|e| self.classify(e))
    }

    /// Map a reqwest failure, turning elapsed deadlines into `Timeout`
    fn classify(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            }
        } else {
            Error::Http(e)
        }
    }

    fn should_retry(&self, err: &Error) -> bool {
        match err {
            Error::HttpStatus { status, .. } => self.config.retry.is_retryable_status(*status),
            other => other.is_retryable(),
        }
    }
}

impl std::fmt::Debug for SparqlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparqlClient")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Extract retry-after header value in seconds
fn extract_retry_after(response: &Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

/// Response media type without parameters, lower-cased
fn media_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(essence)
        .filter(|ct| !ct.is_empty())
}

fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether a response media type matches the requested one; `text/plain` is
/// what several endpoints label N-Triples with
fn is_acceptable(content_type: &str, accept: &str) -> bool {
    content_type == essence(accept) || content_type == "text/plain"
}

fn truncate(body: &str) -> String {
    if body.len() <= ERROR_BODY_LIMIT {
        return body.to_string();
    }
    let mut end = ERROR_BODY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
