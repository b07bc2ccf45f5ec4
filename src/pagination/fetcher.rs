//! Page fetchers
//!
//! A fetcher executes one bound query and classifies the result as a page of
//! records or the empty marker. Failures are never reported as empty.

use super::types::Page;
use crate::decode::{NTriplesDecoder, RecordDecoder};
use crate::error::Result;
use crate::http::SparqlClient;
use async_trait::async_trait;

/// Executes a bound query and returns one page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page for a bound query
    async fn fetch(&self, query: &str) -> Result<Page>;
}

/// Fetcher backed by a SPARQL endpoint
#[derive(Debug)]
pub struct SparqlFetcher<D = NTriplesDecoder> {
    client: SparqlClient,
    decoder: D,
}

impl SparqlFetcher {
    /// Create a fetcher decoding N-Triples responses
    pub fn new(client: SparqlClient) -> Self {
        Self::with_decoder(client, NTriplesDecoder::new())
    }
}

impl<D: RecordDecoder> SparqlFetcher<D> {
    /// Create a fetcher with a custom decoder
    pub fn with_decoder(client: SparqlClient, decoder: D) -> Self {
        Self { client, decoder }
    }

    /// Get the underlying client
    pub fn client(&self) -> &SparqlClient {
        &self.client
    }
}

#[async_trait]
impl<D: RecordDecoder> PageFetcher for SparqlFetcher<D> {
    async fn fetch(&self, query: &str) -> Result<Page> {
        let body = self.client.execute(query, self.decoder.accept()).await?;
        let records = self.decoder.decode(&body)?;
        Ok(Page::from_records(records))
    }
}
