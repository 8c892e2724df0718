//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod serve;

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use frix_config::{CliSettings, Config};
use frix_site::{Frix, Rendered};

pub(crate) use build::BuildArgs;
pub(crate) use serve::ServeArgs;

use crate::error::CliError;
use crate::output::Output;

/// Arguments shared by every command that renders a site.
#[derive(Args)]
pub(crate) struct SiteArgs {
    /// Path to configuration file (default: auto-discover frix.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Site root directory (overrides config).
    #[arg(short, long, env = "FRIX_ROOT")]
    root: Option<PathBuf>,

    /// Key document, relative to the root (overrides config).
    #[arg(short, long)]
    key: Option<String>,

    /// Enable verbose output (render timing and per-page warnings).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl SiteArgs {
    /// Load configuration with command-line overrides applied last.
    pub(crate) fn load_config(&self, host: Option<String>, port: Option<u16>) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            root: self.root.clone(),
            key: self.key.clone(),
            host,
            port,
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// Run one render pass and report its outcome.
pub(crate) async fn render(config: Config, output: &Output) -> Result<Rendered, CliError> {
    output.field("Root", &config.root.display().to_string());
    output.field("Key document", &config.key);

    let start = Instant::now();
    let rendered = Frix::new(config)?.render().await?;

    let api = &rendered.api;
    for failure in api.failures() {
        output.failure(failure);
    }
    output.summary(api.pages().len(), api.failures().len());
    tracing::info!(
        pages = api.pages().len(),
        failed = api.failures().len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Render pass finished"
    );

    Ok(rendered)
}
