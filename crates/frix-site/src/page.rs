//! Rendered pages and per-pass results.

use std::collections::BTreeMap;
use std::sync::Arc;

use frix_config::Config;
use frix_renderer::ContentNode;
use serde::Serialize;

use crate::error::PageError;

/// A successfully rendered page.
#[derive(Debug, Clone)]
pub struct Page {
    /// Normalised URL.
    pub url: String,
    /// Page template name.
    pub name: String,
    /// Output path including the site root.
    pub filename: String,
    /// Typed content structure bound into the page.
    pub content: ContentNode,
    /// Final HTML after all page-level modifiers.
    pub html: String,
}

/// Pages of a render pass keyed by URL.
pub type PageTable = BTreeMap<String, Page>;

/// Public view of a page as returned by `get_all_pages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    /// Page template name.
    pub name: String,
    /// Output path including the site root.
    pub filename: String,
}

impl From<&Page> for PageSummary {
    fn from(page: &Page) -> Self {
        Self {
            name: page.name.clone(),
            filename: page.filename.clone(),
        }
    }
}

/// A page left out of a render pass.
#[derive(Debug)]
pub struct PageFailure {
    /// URL of the page.
    pub url: String,
    /// Why it failed.
    pub reason: PageError,
}

/// Immutable result of one render pass, shared by the handler and the API.
#[derive(Debug)]
pub(crate) struct RenderedSite {
    pub(crate) config: Arc<Config>,
    pub(crate) pages: PageTable,
    pub(crate) stylesheet: String,
    pub(crate) failures: Vec<PageFailure>,
}
