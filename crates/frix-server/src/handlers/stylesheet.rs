//! The aggregated stylesheet.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::handlers::not_modified;
use crate::state::AppState;

/// Handle GET /<stylesheet>.
pub(crate) async fn get_stylesheet(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    if not_modified(&headers, &state.stylesheet_etag) {
        return StatusCode::NOT_MODIFIED.into_response();
    }
    (
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8".to_owned()),
            (header::ETAG, state.stylesheet_etag.clone()),
        ],
        state.handler.stylesheet().to_owned(),
    )
        .into_response()
}
