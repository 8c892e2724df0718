//! `frix build` command implementation.

use clap::Args;

use super::{SiteArgs, render};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    pub(crate) site: SiteArgs,

    /// Exit with an error if any page fails to render.
    #[arg(long)]
    strict: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the render pass fails, or, with
    /// `--strict`, if any page failed.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.site.load_config(None, None)?;
        let stylesheet = config.root.join(config.stylesheet_path());

        let rendered = render(config, &output).await?;

        for (url, page) in rendered.api.get_all_pages() {
            output.page(&url, &page.filename);
        }
        output.location(&format!("Stylesheet: {}", stylesheet.display()));

        let failed = rendered.api.failures().len();
        if self.strict && failed > 0 {
            return Err(CliError::PagesFailed(failed));
        }
        Ok(())
    }
}
