//! Query file loader

use super::template::QueryTemplate;
use crate::error::{Error, Result};
use std::path::Path;
use tracing::debug;

/// Load a query template from a file
pub fn load_template(path: impl AsRef<Path>) -> Result<QueryTemplate> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })?;

    let template = QueryTemplate::parse(&text).map_err(|e| match e {
        Error::Template { message } => Error::template(format!("{}: {message}", path.display())),
        other => other,
    })?;

    debug!("Loaded {} query template from {}", template.form(), path.display());
    Ok(template)
}
