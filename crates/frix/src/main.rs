//! frix CLI - static content rendering engine.
//!
//! Provides commands for:
//! - `build`: Render every page of a site once
//! - `serve`: Render a site and serve it over HTTP

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, ServeArgs};
use error::CliError;
use output::Output;

/// frix - static content rendering engine.
#[derive(Parser)]
#[command(name = "frix", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every page and the aggregated stylesheet.
    Build(BuildArgs),
    /// Render the site and serve it.
    Serve(ServeArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Build(args) => args.site.verbose,
            Self::Serve(args) => args.site.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run(cli.command) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    let rt = tokio::runtime::Runtime::new()?;
    match command {
        Commands::Build(args) => rt.block_on(args.execute()),
        Commands::Serve(args) => rt.block_on(args.execute()),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build() {
        let cli = Cli::try_parse_from(["frix", "build", "--root", "site", "--key", "alt.json", "-v"])
            .unwrap();

        assert!(cli.command.verbose());
        assert!(matches!(cli.command, Commands::Build(_)));
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["frix", "serve", "--port", "3000"]).unwrap();

        assert!(!cli.command.verbose());
        assert!(matches!(cli.command, Commands::Serve(_)));
    }
}
