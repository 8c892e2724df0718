//! Error types for template parsing and page rendering.

/// Error raised while parsing a template fragment or its stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// Malformed `{{ }}` tag or unbalanced loop block.
    #[error("Template syntax error in '{template}' at line {line}: {message}")]
    Syntax {
        /// Template name.
        template: String,
        /// 1-based line of the offending tag.
        line: usize,
        /// What went wrong.
        message: String,
    },
    /// Sibling stylesheet could not be split into rules.
    #[error("Stylesheet error in '{template}': {message}")]
    Stylesheet {
        /// Template name.
        template: String,
        /// What went wrong.
        message: String,
    },
}

/// Page-scoped render failure.
///
/// None of these abort a render pass; the page is dropped from the page
/// table and the error is recorded against its URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// A placeholder has no content and no default.
    #[error("Missing content for '{key}' in template '{template}'")]
    MissingContent {
        /// Template holding the placeholder.
        template: String,
        /// Unresolved content key.
        key: String,
    },
    /// A page or partial names a template that does not exist.
    #[error("Unknown template '{0}'")]
    UnknownTemplate(String),
    /// A template includes itself, directly or through other partials.
    #[error("Template '{0}' includes itself")]
    RecursiveTemplate(String),
    /// Content exists but has the wrong shape for its consumer.
    #[error("Content '{key}' in template '{template}' must be a {expected}")]
    ShapeMismatch {
        /// Template consuming the value.
        template: String,
        /// Offending content key.
        key: String,
        /// Expected shape (`leaf`, `mapping`, `sequence`).
        expected: &'static str,
    },
    /// A template in the chain failed to parse.
    #[error(transparent)]
    Template(#[from] TemplateError),
}
