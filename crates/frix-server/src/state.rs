//! Application state.
//!
//! Shared state for all request handlers.

use frix_site::RequestHandler;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Routes request paths to rendered pages.
    pub(crate) handler: RequestHandler,
    /// `ETag` of the aggregated stylesheet.
    pub(crate) stylesheet_etag: String,
}
