//! Integration tests using mock SPARQL endpoint
//!
//! Tests the full end-to-end flow: query file → paged HTTP requests → spool
//! files → merged N-Triples output

use pretty_assertions::assert_eq;
use sparql_paginator::cli::{Cli, Runner};
use sparql_paginator::types::HttpMethod;
use sparql_paginator::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, Respond, ResponseTemplate};

const QUERY: &str = "PREFIX ex: <http://example.org/>\nCONSTRUCT { ?s ex:p ?o }\nWHERE { ?s ex:p ?o }\nORDER BY ?s\n";

fn triple(n: usize) -> String {
    format!("<http://example.org/s{n}> <http://example.org/p> \"r{n}\" .")
}

fn dataset(n: usize) -> Vec<String> {
    (1..=n).map(triple).collect()
}

// ============================================================================
// Mock Endpoint
// ============================================================================

/// Query text of a request, from the query string (GET) or the form body (POST)
fn query_text(request: &Request) -> String {
    request
        .url
        .query_pairs()
        .chain(url::form_urlencoded::parse(&request.body))
        .find(|(key, _)| key == "query")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

/// `(limit, offset)` bound into a query
fn window_of(query: &str) -> (usize, usize) {
    let mut limit = 0;
    let mut offset = 0;
    for line in query.lines().map(str::trim) {
        if let Some(value) = line.strip_prefix("LIMIT ") {
            limit = value.parse().unwrap();
        } else if let Some(value) = line.strip_prefix("OFFSET ") {
            offset = value.parse().unwrap();
        }
    }
    (limit, offset)
}

/// Serves the requested window of a fixed, ordered triple list
struct Dataset(Vec<String>);

impl Respond for Dataset {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let (limit, offset) = window_of(&query_text(request));
        let body: String = self
            .0
            .iter()
            .skip(offset)
            .take(limit)
            .map(|t| format!("{t}\n"))
            .collect();
        ResponseTemplate::new(200)
            .insert_header("content-type", "application/n-triples")
            .set_body_string(body)
    }
}

/// Matches requests for one window offset
struct AtOffset(usize);

impl Match for AtOffset {
    fn matches(&self, request: &Request) -> bool {
        window_of(&query_text(request)).1 == self.0
    }
}

async fn mount_dataset(server: &MockServer, records: usize) {
    Mock::given(path("/sparql"))
        .respond_with(Dataset(dataset(records)))
        .mount(server)
        .await;
}

async fn requested_offsets(server: &MockServer) -> Vec<usize> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| window_of(&query_text(r)).1)
        .collect()
}

// ============================================================================
// Run Helpers
// ============================================================================

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("query.rq"), QUERY).unwrap();
        Self { dir }
    }

    fn out_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    fn tmp_dir(&self) -> PathBuf {
        self.dir.path().join("out").join("tmp")
    }

    fn output(&self) -> PathBuf {
        self.out_dir().join("p.nt")
    }

    fn spool(&self, offset: u64) -> PathBuf {
        self.tmp_dir().join(format!("p{offset}.nt"))
    }

    fn cli(&self, server: &MockServer, limit: u64) -> Cli {
        Cli {
            query: Some(self.dir.path().join("query.rq")),
            sparqlendpoint: Some(format!("{}/sparql", server.uri())),
            limit: Some(limit),
            outdir: Some(self.out_dir()),
            tmpdir: Some(self.tmp_dir()),
            max_retries: Some(0),
            ..Cli::default()
        }
    }

    fn write_config(&self, yaml: &str) -> PathBuf {
        let path = self.dir.path().join("run.yaml");
        fs::write(&path, yaml).unwrap();
        path
    }
}

fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

// ============================================================================
// End-to-End Runs
// ============================================================================

#[tokio::test]
async fn test_five_records_limit_two() {
    let server = MockServer::start().await;
    mount_dataset(&server, 5).await;
    let ws = Workspace::new();

    let summary = Runner::new(ws.cli(&server, 2)).execute().await.unwrap();

    assert_eq!(summary.spool_files, 3);
    assert_eq!(summary.records, 5);
    assert_eq!(summary.pages_fetched, 4);
    assert_eq!(summary.initial_offset, 0);
    assert_eq!(summary.final_offset, 6);
    assert_eq!(summary.output, ws.output());

    assert_eq!(lines(&ws.spool(0)), vec![triple(1), triple(2)]);
    assert_eq!(lines(&ws.spool(2)), vec![triple(3), triple(4)]);
    assert_eq!(lines(&ws.spool(4)), vec![triple(5)]);
    assert!(!ws.spool(6).exists());

    assert_eq!(lines(&ws.output()), dataset(5));
    assert_eq!(requested_offsets(&server).await, vec![0, 2, 4, 6]);
}

#[tokio::test]
async fn test_empty_result_set() {
    let server = MockServer::start().await;
    mount_dataset(&server, 0).await;
    let ws = Workspace::new();

    let summary = Runner::new(ws.cli(&server, 10)).execute().await.unwrap();

    assert_eq!(summary.spool_files, 0);
    assert_eq!(summary.records, 0);
    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(fs::read_to_string(ws.output()).unwrap(), "");
    assert_eq!(fs::read_dir(ws.tmp_dir()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_exact_multiple_of_limit() {
    let server = MockServer::start().await;
    mount_dataset(&server, 4).await;
    let ws = Workspace::new();

    let summary = Runner::new(ws.cli(&server, 2)).execute().await.unwrap();

    assert_eq!(summary.spool_files, 2);
    assert_eq!(summary.final_offset, 4);
    assert_eq!(lines(&ws.output()), dataset(4));
}

#[tokio::test]
async fn test_post_method() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sparql"))
        .respond_with(Dataset(dataset(3)))
        .mount(&server)
        .await;
    let ws = Workspace::new();

    let cli = Cli {
        http_method: Some(HttpMethod::Post),
        ..ws.cli(&server, 2)
    };
    let summary = Runner::new(cli).execute().await.unwrap();

    assert_eq!(summary.records, 3);
    assert_eq!(lines(&ws.output()), dataset(3));
}

#[tokio::test]
async fn test_concurrent_run_matches_sequential() {
    let server = MockServer::start().await;
    mount_dataset(&server, 11).await;
    let ws = Workspace::new();

    let cli = Cli {
        concurrency: Some(3),
        ..ws.cli(&server, 2)
    };
    let summary = Runner::new(cli).execute().await.unwrap();

    assert_eq!(summary.spool_files, 6);
    assert_eq!(summary.final_offset, 12);
    assert_eq!(lines(&ws.output()), dataset(11));
}

#[tokio::test]
async fn test_summary_serializes_to_one_json_line() {
    let server = MockServer::start().await;
    mount_dataset(&server, 1).await;
    let ws = Workspace::new();

    let summary = Runner::new(ws.cli(&server, 5)).execute().await.unwrap();
    let line = serde_json::to_string(&summary).unwrap();
    let value: serde_json::Value = serde_json::from_str(&line).unwrap();

    assert!(!line.contains('\n'));
    assert_eq!(value["records"], 1);
    assert_eq!(value["spool_files"], 1);
    assert_eq!(value["final_offset"], 5);
    assert!(value["started_at"].is_string());
}

// ============================================================================
// Retry and Failure
// ============================================================================

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let server = MockServer::start().await;
    Mock::given(AtOffset(2))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_dataset(&server, 3).await;
    let ws = Workspace::new();

    let config = ws.write_config(
        "http:\n  max_retries: 2\n  retry_backoff:\n    type: constant\n    initial_ms: 10\n",
    );
    let cli = Cli {
        config: Some(config),
        max_retries: None,
        ..ws.cli(&server, 2)
    };
    let summary = Runner::new(cli).execute().await.unwrap();

    assert_eq!(summary.records, 3);
    assert_eq!(lines(&ws.output()), dataset(3));
    assert_eq!(requested_offsets(&server).await, vec![0, 2, 2, 4]);
}

#[tokio::test]
async fn test_failure_keeps_spool_and_skips_merge() {
    let server = MockServer::start().await;
    Mock::given(AtOffset(4))
        .respond_with(ResponseTemplate::new(500).set_body_string("Virtuoso 42000 Error"))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_dataset(&server, 5).await;
    let ws = Workspace::new();

    let err = Runner::new(ws.cli(&server, 2)).execute().await.unwrap_err();

    assert!(matches!(err, Error::Fetch { offset: 4, .. }));
    assert_eq!(err.resume_offset(), Some(4));
    assert!(err.to_string().contains("offset 4"));

    assert!(ws.spool(0).exists());
    assert!(ws.spool(2).exists());
    assert!(!ws.spool(4).exists());
    assert!(!ws.output().exists());
}

#[tokio::test]
async fn test_resume_from_failed_offset() {
    let server = MockServer::start().await;
    Mock::given(AtOffset(4))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_dataset(&server, 5).await;
    let ws = Workspace::new();

    let err = Runner::new(ws.cli(&server, 2)).execute().await.unwrap_err();
    let offset = err.resume_offset().unwrap();

    let cli = Cli {
        initialoffset: Some(offset),
        ..ws.cli(&server, 2)
    };
    let summary = Runner::new(cli).execute().await.unwrap();

    assert_eq!(summary.initial_offset, 4);
    assert_eq!(summary.spool_files, 1);
    assert_eq!(lines(&ws.output()), vec![triple(5)]);
}

#[tokio::test]
async fn test_html_error_page_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(path("/sparql"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<html><body>Service Unavailable</body></html>"),
        )
        .mount(&server)
        .await;
    let ws = Workspace::new();

    let err = Runner::new(ws.cli(&server, 2)).execute().await.unwrap_err();

    assert!(matches!(err, Error::Fetch { offset: 0, .. }));
    assert!(!ws.output().exists());
}

// ============================================================================
// Output Accumulation and Spool Collisions
// ============================================================================

#[tokio::test]
async fn test_output_accumulates_across_runs() {
    let server = MockServer::start().await;
    mount_dataset(&server, 3).await;
    let ws = Workspace::new();

    Runner::new(ws.cli(&server, 2)).execute().await.unwrap();
    let first = fs::read_to_string(ws.output()).unwrap();

    let cli = Cli {
        overwrite_spool: true,
        ..ws.cli(&server, 2)
    };
    Runner::new(cli).execute().await.unwrap();
    let second = fs::read_to_string(ws.output()).unwrap();

    assert!(second.starts_with(&first));
    assert_eq!(second, first.repeat(2));
}

#[tokio::test]
async fn test_leftover_spool_file_aborts_run() {
    let server = MockServer::start().await;
    mount_dataset(&server, 3).await;
    let ws = Workspace::new();

    Runner::new(ws.cli(&server, 2)).execute().await.unwrap();
    let err = Runner::new(ws.cli(&server, 2)).execute().await.unwrap_err();

    assert!(matches!(err, Error::SpoolIo { offset: 0, .. }));
    assert_eq!(err.resume_offset(), Some(0));
    assert_eq!(lines(&ws.output()), dataset(3));
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_config_file_supplies_required_fields() {
    let server = MockServer::start().await;
    mount_dataset(&server, 2).await;
    let ws = Workspace::new();

    let yaml = format!(
        "query: {}\nsparqlendpoint: {}/sparql\nlimit: 1\noutdir: {}\ntmpdir: {}\noutfileprefix: dump\n",
        ws.dir.path().join("query.rq").display(),
        server.uri(),
        ws.out_dir().display(),
        ws.tmp_dir().display(),
    );
    let cli = Cli {
        config: Some(ws.write_config(&yaml)),
        ..Cli::default()
    };
    let summary = Runner::new(cli).execute().await.unwrap();

    assert_eq!(summary.output, ws.out_dir().join("dump.nt"));
    assert_eq!(summary.spool_files, 2);
    assert!(ws.tmp_dir().join("dump0.nt").exists());
    assert!(ws.tmp_dir().join("dump1.nt").exists());
}

#[tokio::test]
async fn test_select_query_rejected_before_any_request() {
    let server = MockServer::start().await;
    mount_dataset(&server, 2).await;
    let ws = Workspace::new();
    fs::write(
        ws.dir.path().join("query.rq"),
        "SELECT ?s WHERE { ?s ?p ?o }",
    )
    .unwrap();

    let err = Runner::new(ws.cli(&server, 2)).execute().await.unwrap_err();

    assert!(matches!(err, Error::Template { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}
