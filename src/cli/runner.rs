//! CLI runner - executes a run

use crate::cli::commands::Cli;
use crate::config::PaginatorConfig;
use crate::error::{Error, Result};
use crate::http::SparqlClient;
use crate::pagination::{PaginationController, PaginationSession, RunSummary, SparqlFetcher};
use crate::query::load_template;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run and print the summary as one JSON line on stdout
    pub async fn run(&self) -> Result<()> {
        let summary = self.execute().await?;
        println!("{}", serde_json::to_string(&summary)?);
        Ok(())
    }

    /// Run without printing
    pub async fn execute(&self) -> Result<RunSummary> {
        let config = self.config()?;
        info!(
            "Paginating {} against {} (limit {}, offset {})",
            config.query_path()?.display(),
            config.endpoint_url()?,
            config.limit,
            config.initial_offset
        );

        create_dir(&config.out_dir)?;
        create_dir(&config.tmp_dir)?;

        let template = load_template(config.query_path()?)?;
        let client = SparqlClient::with_config(config.client_config()?)?;
        let fetcher = Arc::new(SparqlFetcher::new(client));

        let session = PaginationSession::new(template, config.limit)
            .with_initial_offset(config.initial_offset)
            .with_dirs(&config.tmp_dir, &config.out_dir)
            .with_prefix(&config.out_file_prefix)
            .with_overwrite_spool(config.overwrite_spool);

        let controller =
            PaginationController::new(session, fetcher)?.with_concurrency(config.concurrency);
        let summary = controller.run().await?;

        info!(
            "Run complete: {} records from {} spool files appended to {} in {}ms",
            summary.records,
            summary.spool_files,
            summary.output.display(),
            summary.elapsed_ms
        );
        Ok(summary)
    }

    /// Resolve the run configuration: config file, then flags, then validation
    pub fn config(&self) -> Result<PaginatorConfig> {
        let base = match &self.cli.config {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                PaginatorConfig::from_yaml_file(path)?
            }
            None => PaginatorConfig::default(),
        };

        let config = base.merge_cli(&self.cli);
        config.validate()?;
        Ok(config)
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| {
        Error::config(format!(
            "Failed to create directory '{}': {e}",
            path.display()
        ))
    })
}
