//! Error types for the HTTP server.

use std::net::{AddrParseError, SocketAddr};

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Host and port do not form a socket address.
    #[error("Invalid address '{addr}': {source}")]
    Address {
        /// The rejected `host:port` string.
        addr: String,
        /// Parse failure.
        #[source]
        source: AddrParseError,
    },

    /// The listener could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Address that was tried.
        addr: SocketAddr,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}
