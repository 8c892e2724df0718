//! `frix serve` command implementation.

use clap::Args;
use frix_server::{ServerConfig, run_server};

use super::{SiteArgs, render};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    #[command(flatten)]
    pub(crate) site: SiteArgs,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the render pass fails, or the
    /// server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.site.load_config(self.host, self.port)?;
        let server_config = ServerConfig::from(&config);

        let rendered = render(config, &output).await?;

        output.location(&format!(
            "Serving on http://{}:{}",
            server_config.host, server_config.port
        ));
        run_server(&rendered, &server_config).await?;

        Ok(())
    }
}
