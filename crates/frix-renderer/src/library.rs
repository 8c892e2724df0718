//! Named template fragments available to a render pass.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{RenderError, TemplateError};
use crate::template::Template;

/// Parsed templates keyed by name.
///
/// Parse failures are kept per template so that only pages whose chain
/// reaches a broken fragment fail.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    templates: HashMap<String, Result<Arc<Template>, TemplateError>>,
}

impl TemplateLibrary {
    /// Create an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and register a fragment with its optional stylesheet.
    ///
    /// Replaces any fragment already registered under `name`.
    pub fn insert(&mut self, name: &str, html: &str, css: Option<&str>) {
        let parsed = Template::parse(name, html).and_then(|template| match css {
            Some(css) => template.with_stylesheet(css),
            None => Ok(template),
        });
        self.templates
            .insert(name.to_owned(), parsed.map(Arc::new));
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_template(mut self, name: &str, html: &str, css: Option<&str>) -> Self {
        self.insert(name, html, css);
        self
    }

    /// Look up a template.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownTemplate`] if no fragment has this name,
    /// or [`RenderError::Template`] if it failed to parse.
    pub fn get(&self, name: &str) -> Result<&Arc<Template>, RenderError> {
        match self.templates.get(name) {
            Some(Ok(template)) => Ok(template),
            Some(Err(err)) => Err(RenderError::Template(err.clone())),
            None => Err(RenderError::UnknownTemplate(name.to_owned())),
        }
    }

    /// Parse errors of all broken templates, sorted by name.
    #[must_use]
    pub fn errors(&self) -> Vec<&TemplateError> {
        let mut errors: Vec<(&String, &TemplateError)> = self
            .templates
            .iter()
            .filter_map(|(name, parsed)| parsed.as_ref().err().map(|err| (name, err)))
            .collect();
        errors.sort_by(|a, b| a.0.cmp(b.0));
        errors.into_iter().map(|(_, err)| err).collect()
    }

    /// Number of registered templates, broken ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether no templates are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
