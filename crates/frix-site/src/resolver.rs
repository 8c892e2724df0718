//! Loading of the key document, template fragments and content documents.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use frix_config::Config;
use frix_renderer::TemplateLibrary;
use frix_storage::Storage;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ContentLoadError, SiteError};

/// One entry of the key document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct KeyEntry {
    template: String,
    content: PathBuf,
}

/// A page enumerated by the key document, not yet rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpec {
    /// Normalised URL, always starting with `/`.
    pub url: String,
    /// Page template name.
    pub template: String,
    /// Content document path relative to the site root.
    pub content: PathBuf,
    /// Output path relative to the site root.
    pub output: PathBuf,
    /// Output path including the site root, as reported by the query API.
    pub filename: String,
}

/// Reads site sources through a [`Storage`] backend.
#[derive(Clone)]
pub struct Resolver {
    config: Arc<Config>,
    storage: Arc<dyn Storage>,
}

impl Resolver {
    /// Create a resolver over `storage` laid out according to `config`.
    #[must_use]
    pub fn new(config: Arc<Config>, storage: Arc<dyn Storage>) -> Self {
        Self { config, storage }
    }

    /// Enumerate pages from the key document, sorted by URL.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::KeyDocument`] if the key document is missing,
    /// malformed, or maps an invalid or duplicate URL.
    pub fn pages(&self) -> Result<Vec<PageSpec>, SiteError> {
        let path = PathBuf::from(&self.config.key);
        let key_error = |message: String| SiteError::KeyDocument {
            path: path.clone(),
            message,
        };

        let text = self
            .storage
            .read(&path)
            .map_err(|e| key_error(e.to_string()))?;
        let raw = parse_document(&path, &text).map_err(key_error)?;
        let entries: BTreeMap<String, KeyEntry> =
            serde_json::from_value(raw).map_err(|e| key_error(e.to_string()))?;

        let mut pages: BTreeMap<String, PageSpec> = BTreeMap::new();
        for (raw_url, entry) in entries {
            let url = normalize_url(&raw_url).map_err(key_error)?;
            if pages.contains_key(&url) {
                return Err(key_error(format!("URL '{url}' is mapped twice")));
            }
            let output = self.output_path(&url);
            let spec = PageSpec {
                filename: self.config.root.join(&output).to_string_lossy().into_owned(),
                content: self.config.paths.content.join(&entry.content),
                template: entry.template,
                url: url.clone(),
                output,
            };
            pages.insert(url, spec);
        }

        Ok(pages.into_values().collect())
    }

    /// Load every `*.html` fragment in the templates directory, each with its
    /// sibling `*.css` stylesheet when present.
    ///
    /// Fragments that cannot be read are skipped with a warning; pages that
    /// reach them fail with an unknown-template error.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Storage`] if the templates directory cannot be listed.
    pub fn library(&self) -> Result<TemplateLibrary, SiteError> {
        let mut library = TemplateLibrary::new();

        for path in self.storage.list(&self.config.paths.templates)? {
            if path.extension().is_none_or(|ext| ext != "html") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let html = match self.storage.read(&path) {
                Ok(html) => html,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read template");
                    continue;
                }
            };
            let css_path = path.with_extension("css");
            let css = if self.storage.exists(&css_path) {
                match self.storage.read(&css_path) {
                    Ok(css) => Some(css),
                    Err(e) => {
                        tracing::warn!(path = %css_path.display(), error = %e, "Failed to read stylesheet");
                        None
                    }
                }
            } else {
                None
            };

            library.insert(name, &html, css.as_deref());
        }

        for err in library.errors() {
            tracing::warn!(error = %err, "Template failed to parse");
        }
        tracing::debug!(templates = library.len(), "Template library loaded");

        Ok(library)
    }

    /// Load and parse the content document of `page`.
    ///
    /// # Errors
    ///
    /// Returns [`ContentLoadError`] if the document is missing, unreadable or
    /// not valid JSON/YAML.
    pub fn load_content(&self, page: &PageSpec) -> Result<Value, ContentLoadError> {
        let text = self
            .storage
            .read(&page.content)
            .map_err(|e| ContentLoadError::from_storage(page.content.clone(), e))?;
        parse_document(&page.content, &text).map_err(|message| ContentLoadError::Malformed {
            path: page.content.clone(),
            message,
        })
    }

    fn output_path(&self, url: &str) -> PathBuf {
        let stem = match url.trim_start_matches('/') {
            "" => "index",
            stem => stem,
        };
        self.config
            .paths
            .bin
            .join(format!("{stem}.{}", self.config.output.extension))
    }
}

/// Parse a document as YAML when its extension says so, JSON otherwise.
fn parse_document(path: &Path, text: &str) -> Result<Value, String> {
    let yaml = path
        .extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml");
    if yaml {
        serde_yaml::from_str(text).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(text).map_err(|e| e.to_string())
    }
}

/// Normalise a key-document URL to `/segment/...` without a trailing slash.
fn normalize_url(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Ok("/".to_owned());
    }
    let invalid = |segment: &str| {
        segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\')
    };
    if trimmed.split('/').any(invalid) {
        return Err(format!("invalid page URL '{raw}'"));
    }
    Ok(format!("/{trimmed}"))
}
