use std::collections::BTreeMap;
use std::sync::Arc;

use frix_config::Config;
use frix_renderer::ContentNode;

use crate::page::{Page, PageFailure, PageSummary, PageTable, RenderedSite};

/// Read-only queries over the result of a render pass.
#[derive(Debug, Clone)]
pub struct QueryApi {
    site: Arc<RenderedSite>,
}

impl QueryApi {
    pub(crate) fn new(site: Arc<RenderedSite>) -> Self {
        Self { site }
    }

    /// Every rendered page as URL → name and output filename.
    #[must_use]
    pub fn get_all_pages(&self) -> BTreeMap<String, PageSummary> {
        self.site
            .pages
            .iter()
            .map(|(url, page)| (url.clone(), PageSummary::from(page)))
            .collect()
    }

    /// Content structure bound into the page at `url`.
    #[must_use]
    pub fn get_content_structure(&self, url: &str) -> Option<&ContentNode> {
        self.page(url).map(|page| &page.content)
    }

    /// Configuration the pass ran with.
    #[must_use]
    pub fn get_opt(&self) -> &Config {
        &self.site.config
    }

    /// A single rendered page.
    #[must_use]
    pub fn page(&self, url: &str) -> Option<&Page> {
        self.site.pages.get(url)
    }

    /// All rendered pages.
    #[must_use]
    pub fn pages(&self) -> &PageTable {
        &self.site.pages
    }

    /// Aggregated stylesheet after `css` modifiers.
    #[must_use]
    pub fn stylesheet(&self) -> &str {
        &self.site.stylesheet
    }

    /// Pages that failed, sorted by URL.
    #[must_use]
    pub fn failures(&self) -> &[PageFailure] {
        &self.site.failures
    }
}
