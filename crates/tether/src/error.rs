//! CLI error type.

use std::path::PathBuf;

use tether_config::ConfigError;
use tether_site::SiteError;

/// Error surfaced to the CLI user.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    /// Configuration failed to load.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Site rendering failed.
    #[error(transparent)]
    Site(#[from] SiteError),
    /// Writing output failed.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Path that failed to write.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
