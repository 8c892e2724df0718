//! Page responses for every path not claimed by another route.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use frix_site::HandlerResponse;

use crate::handlers::{compute_etag, not_modified};
use crate::state::AppState;

/// Handle any GET path by looking up the rendered page.
pub(crate) async fn get_page(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    match state.handler.handle(uri.path()) {
        HandlerResponse::Page(html) => {
            let etag = compute_etag(&html);
            if not_modified(&headers, &etag) {
                return StatusCode::NOT_MODIFIED.into_response();
            }
            (
                [
                    (header::CONTENT_TYPE, "text/html; charset=utf-8".to_owned()),
                    (header::ETAG, etag),
                ],
                html,
            )
                .into_response()
        }
        HandlerResponse::NotFound => StatusCode::NOT_FOUND.into_response(),
    }
}
