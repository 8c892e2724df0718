//! HTTP request handlers.

use axum::http::{HeaderMap, header};
use md5::{Digest, Md5};

pub(crate) mod pages;
pub(crate) mod stylesheet;

/// Compute `ETag` from content.
///
/// Uses MD5 hash truncated to 64 bits (16 hex chars).
pub(crate) fn compute_etag(content: &str) -> String {
    let hash = Md5::digest(content.as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}

/// Whether the request's `If-None-Match` matches `etag`.
pub(crate) fn not_modified(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get(header::IF_NONE_MATCH)
        .is_some_and(|value| value.as_bytes() == etag.as_bytes())
}
