//! Template injection.

use crate::content::{ContentLeaf, ContentNode, EMPTY};
use crate::error::RenderError;
use crate::html::write_leaf;
use crate::library::TemplateLibrary;
use crate::loops::{Instance, LoopExpander};
use crate::template::{Binding, Template};

/// Binds content trees into templates, producing HTML.
///
/// # Example
///
/// ```
/// use frix_renderer::{ContentLeaf, ContentNode, Injector, TemplateLibrary};
///
/// let library = TemplateLibrary::new().with_template("quote", "<cite>{{text}}</cite>", None);
/// let content = ContentNode::Tree(
///     [("text".to_owned(), ContentLeaf::text("Hi").into())].into_iter().collect(),
/// );
///
/// let html = Injector::new(&library).render("quote", &content).unwrap();
/// assert_eq!(html, "<cite>Hi</cite>");
/// ```
pub struct Injector<'a> {
    library: &'a TemplateLibrary,
}

impl<'a> Injector<'a> {
    /// Create an injector over a template library.
    #[must_use]
    pub fn new(library: &'a TemplateLibrary) -> Self {
        Self { library }
    }

    /// Render template `name` with `content` as its root scope.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingContent`] for placeholders with neither
    /// content nor a default, [`RenderError::ShapeMismatch`] for content of the
    /// wrong shape, and template lookup errors for missing, broken or
    /// self-including fragments.
    pub fn render(&self, name: &str, content: &ContentNode) -> Result<String, RenderError> {
        let template = self.library.get(name)?;
        let mut out = String::new();
        let mut path = Vec::new();
        self.inject(template, content, &mut out, &mut path)?;
        Ok(out)
    }

    fn inject(
        &self,
        template: &Template,
        scope: &ContentNode,
        out: &mut String,
        path: &mut Vec<String>,
    ) -> Result<(), RenderError> {
        if path.iter().any(|name| name == template.name()) {
            return Err(RenderError::RecursiveTemplate(template.name().to_owned()));
        }
        path.push(template.name().to_owned());

        for instance in LoopExpander::expand(template, scope)? {
            match instance {
                Instance::Text(text) => out.push_str(text),
                Instance::Slot(slot, scope) => match scope.get(&slot.key) {
                    Some(ContentNode::Leaf(leaf)) => write_leaf(out, leaf),
                    Some(_) => {
                        return Err(RenderError::ShapeMismatch {
                            template: template.name().to_owned(),
                            key: slot.key.clone(),
                            expected: "leaf",
                        });
                    }
                    None => {
                        let Some(default) = &slot.default else {
                            return Err(RenderError::MissingContent {
                                template: template.name().to_owned(),
                                key: slot.key.clone(),
                            });
                        };
                        write_leaf(out, &ContentLeaf::new(default.as_str(), slot.kind));
                    }
                },
                Instance::Partial(partial, scope) => {
                    let child = self.library.get(&partial.template)?;
                    let sub = match &partial.binding {
                        Binding::Current => scope,
                        Binding::Key(key) => scope.get(key).unwrap_or(&EMPTY),
                    };
                    if !matches!(sub, ContentNode::Tree(_)) {
                        return Err(RenderError::ShapeMismatch {
                            template: template.name().to_owned(),
                            key: match &partial.binding {
                                Binding::Key(key) => key.clone(),
                                Binding::Current => ".".to_owned(),
                            },
                            expected: "mapping",
                        });
                    }
                    self.inject(child, sub, out, path)?;
                }
            }
        }

        path.pop();
        Ok(())
    }
}
