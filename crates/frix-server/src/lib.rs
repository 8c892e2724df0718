//! HTTP server for frix rendered sites.
//!
//! Serves the pages of a render pass through its
//! [`RequestHandler`](frix_site::RequestHandler), plus the aggregated
//! stylesheet at `/<paths.stylesheet>`.
//!
//! # Quick Start
//!
//! ```ignore
//! use frix_config::Config;
//! use frix_server::{ServerConfig, run_server};
//! use frix_site::Frix;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new("site");
//!     let server = ServerConfig::from(&config);
//!     let rendered = Frix::new(config)?.render().await?;
//!
//!     run_server(&rendered, &server).await?;
//!     Ok(())
//! }
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::str::FromStr;

use frix_site::Rendered;

pub use app::create_router;
pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from(&frix_config::ServerConfig::default())
    }
}

impl From<&frix_config::ServerConfig> for ServerConfig {
    fn from(config: &frix_config::ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

impl From<&frix_config::Config> for ServerConfig {
    fn from(config: &frix_config::Config) -> Self {
        Self::from(&config.server)
    }
}

impl ServerConfig {
    /// Socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Address`] if host and port do not form a valid
    /// socket address.
    pub fn addr(&self) -> Result<SocketAddr, ServerError> {
        let addr = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr).map_err(|source| ServerError::Address { addr, source })
    }
}

/// Serve `rendered` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address is invalid, binding fails, or the server
/// stops abnormally.
pub async fn run_server(rendered: &Rendered, config: &ServerConfig) -> Result<(), ServerError> {
    let addr = config.addr()?;
    let app = create_router(rendered);

    tracing::info!(address = %addr, pages = rendered.api.pages().len(), "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
