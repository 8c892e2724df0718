//! CLI error types.

use frix_config::ConfigError;
use frix_server::ServerError;
use frix_site::{ModifierError, SiteError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid modifier configuration: {0}")]
    Modifier(#[from] ModifierError),

    #[error("{0}")]
    Site(#[from] SiteError),

    #[error("{0}")]
    Server(#[from] ServerError),

    #[error("{0} page(s) failed to render")]
    PagesFailed(usize),
}
