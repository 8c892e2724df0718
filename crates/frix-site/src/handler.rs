use std::sync::Arc;

use crate::page::RenderedSite;

/// Outcome of routing a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// The page's full HTML.
    Page(String),
    /// No page has this URL.
    NotFound,
}

impl HandlerResponse {
    /// HTTP status code for this response.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Page(_) => 200,
            Self::NotFound => 404,
        }
    }

    /// Response body; empty for [`NotFound`](Self::NotFound).
    #[must_use]
    pub fn body(&self) -> &str {
        match self {
            Self::Page(html) => html,
            Self::NotFound => "",
        }
    }
}

/// Maps request paths to rendered pages.
#[derive(Debug, Clone)]
pub struct RequestHandler {
    site: Arc<RenderedSite>,
}

impl RequestHandler {
    pub(crate) fn new(site: Arc<RenderedSite>) -> Self {
        Self { site }
    }

    /// Look up the page for a request path.
    ///
    /// The query string, if any, is ignored, as is a trailing slash on
    /// non-root paths.
    #[must_use]
    pub fn handle(&self, path: &str) -> HandlerResponse {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let url = match path.trim_end_matches('/') {
            "" => "/",
            url => url,
        };

        match self.site.pages.get(url) {
            Some(page) => HandlerResponse::Page(page.html.clone()),
            None => {
                tracing::debug!(path = %path, "No page for request");
                HandlerResponse::NotFound
            }
        }
    }

    /// Aggregated stylesheet of the pass.
    #[must_use]
    pub fn stylesheet(&self) -> &str {
        &self.site.stylesheet
    }

    /// Configuration the pass ran with.
    #[must_use]
    pub fn config(&self) -> &frix_config::Config {
        &self.site.config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use frix_config::Config;
    use frix_renderer::ContentNode;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::page::Page;

    fn handler() -> RequestHandler {
        let mut pages = BTreeMap::new();
        for (url, html) in [("/", "<p>home</p>"), ("/page1", "<p>one</p>")] {
            pages.insert(
                url.to_owned(),
                Page {
                    url: url.to_owned(),
                    name: "page".to_owned(),
                    filename: String::new(),
                    content: ContentNode::default(),
                    html: html.to_owned(),
                },
            );
        }
        RequestHandler::new(Arc::new(RenderedSite {
            config: Arc::new(Config::new("site")),
            pages,
            stylesheet: String::new(),
            failures: Vec::new(),
        }))
    }

    #[test]
    fn test_handle_page() {
        assert_eq!(
            handler().handle("/page1"),
            HandlerResponse::Page("<p>one</p>".to_owned())
        );
    }

    #[test]
    fn test_trailing_slash_and_query_ignored() {
        let handler = handler();

        assert_eq!(handler.handle("/page1/").body(), "<p>one</p>");
        assert_eq!(handler.handle("/page1?x=1").body(), "<p>one</p>");
        assert_eq!(handler.handle("/").body(), "<p>home</p>");
        assert_eq!(handler.handle("").body(), "<p>home</p>");
    }

    #[test]
    fn test_handle_not_found() {
        let response = handler().handle("/nope");

        assert_eq!(response, HandlerResponse::NotFound);
        assert_eq!(response.status(), 404);
        assert_eq!(response.body(), "");
    }
}
