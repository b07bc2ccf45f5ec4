//! CLI arguments and parsing
//!
//! Every run setting is optional here so a `--config` file can supply it;
//! required values are checked after the two sources are merged.

use crate::types::HttpMethod;
use clap::Parser;
use std::path::PathBuf;

/// Paginated SPARQL CONSTRUCT extractor
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "sparql-paginator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Base query file (CONSTRUCT or DESCRIBE, without LIMIT/OFFSET)
    #[arg(short, long)]
    pub query: Option<PathBuf>,

    /// Page size; must not exceed the endpoint's result cap
    #[arg(short, long)]
    pub limit: Option<u64>,

    /// Output directory [default: out]
    #[arg(long = "outdir")]
    pub outdir: Option<PathBuf>,

    /// Spool directory [default: out/tmp]
    #[arg(long = "tmpdir")]
    pub tmpdir: Option<PathBuf>,

    /// SPARQL endpoint URL
    #[arg(long = "sparqlendpoint")]
    pub sparqlendpoint: Option<String>,

    /// Prefix for spool and output files [default: p]
    #[arg(long = "outfileprefix")]
    pub outfileprefix: Option<String>,

    /// Offset of the first window, used to resume a failed run [default: 0]
    #[arg(long = "initialoffset")]
    pub initialoffset: Option<u64>,

    /// Retries per page on transient failures [default: 3]
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Request timeout in seconds [default: 300]
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Windows fetched concurrently [default: 1]
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Request rate limit (unset = unlimited)
    #[arg(long)]
    pub requests_per_second: Option<u32>,

    /// How queries are submitted [default: get]
    #[arg(long, value_enum)]
    pub http_method: Option<HttpMethod>,

    /// Replace spool files left by an earlier run
    #[arg(long)]
    pub overwrite_spool: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_original_flags() {
        let cli = Cli::parse_from([
            "sparql-paginator",
            "--query",
            "people.rq",
            "--limit",
            "10000",
            "--outdir",
            "data",
            "--tmpdir",
            "data/tmp",
            "--sparqlendpoint",
            "https://dbpedia.org/sparql",
            "--outfileprefix",
            "people",
            "--initialoffset",
            "40000",
        ]);

        assert_eq!(cli.query, Some(PathBuf::from("people.rq")));
        assert_eq!(cli.limit, Some(10000));
        assert_eq!(cli.outdir, Some(PathBuf::from("data")));
        assert_eq!(cli.tmpdir, Some(PathBuf::from("data/tmp")));
        assert_eq!(cli.sparqlendpoint.as_deref(), Some("https://dbpedia.org/sparql"));
        assert_eq!(cli.outfileprefix.as_deref(), Some("people"));
        assert_eq!(cli.initialoffset, Some(40000));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_extra_flags() {
        let cli = Cli::parse_from([
            "sparql-paginator",
            "-C",
            "run.yaml",
            "--max-retries",
            "0",
            "--timeout-secs",
            "30",
            "--concurrency",
            "4",
            "--requests-per-second",
            "2",
            "--http-method",
            "post",
            "--overwrite-spool",
            "-v",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("run.yaml")));
        assert_eq!(cli.max_retries, Some(0));
        assert_eq!(cli.timeout_secs, Some(30));
        assert_eq!(cli.concurrency, Some(4));
        assert_eq!(cli.requests_per_second, Some(2));
        assert_eq!(cli.http_method, Some(HttpMethod::Post));
        assert!(cli.overwrite_spool);
        assert!(cli.verbose);
        assert!(cli.query.is_none());
    }

    #[test]
    fn test_rejects_non_numeric_limit() {
        let result = Cli::try_parse_from(["sparql-paginator", "--limit", "many"]);
        assert!(result.is_err());
    }
}
