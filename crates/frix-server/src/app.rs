//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use frix_site::Rendered;
use tower::ServiceBuilder;

use crate::handlers::{self, compute_etag};
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router for a render pass.
///
/// The stylesheet is served at `/<paths.stylesheet>`; every other path is
/// looked up in the page table.
pub fn create_router(rendered: &Rendered) -> Router {
    let handler = rendered.handler.clone();
    let stylesheet_route = format!("/{}", handler.config().paths.stylesheet);
    let state = Arc::new(AppState {
        stylesheet_etag: compute_etag(handler.stylesheet()),
        handler,
    });

    Router::new()
        .route(&stylesheet_route, get(handlers::stylesheet::get_stylesheet))
        .fallback(handlers::pages::get_page)
        .layer(
            ServiceBuilder::new()
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer()),
        )
        .with_state(state)
}
