//! Template chains: the fragments a page reaches, outermost first.

use std::sync::Arc;

use crate::error::RenderError;
use crate::library::TemplateLibrary;
use crate::template::{Relation, Template};

/// One fragment occurrence in a chain.
#[derive(Debug, Clone)]
pub struct ChainLink {
    /// The fragment.
    pub template: Arc<Template>,
    /// Index of the including link; `None` for the page template.
    pub parent: Option<usize>,
    /// Position inside the including fragment; `None` for the page template.
    pub relation: Option<Relation>,
}

/// Pre-order sequence of every fragment occurrence reachable from a page
/// template, including those inside loop bodies.
///
/// A fragment included twice appears twice, once per nesting context.
#[derive(Debug, Clone)]
pub struct TemplateChain {
    links: Vec<ChainLink>,
}

impl TemplateChain {
    /// Resolve the chain rooted at template `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownTemplate`] or [`RenderError::Template`]
    /// for missing or broken fragments, and [`RenderError::RecursiveTemplate`]
    /// when a fragment includes itself.
    pub fn build(library: &TemplateLibrary, name: &str) -> Result<Self, RenderError> {
        let root = Arc::clone(library.get(name)?);
        let mut chain = Self { links: Vec::new() };
        let mut path = Vec::new();
        chain.visit(library, root, None, None, &mut path)?;
        Ok(chain)
    }

    fn visit(
        &mut self,
        library: &TemplateLibrary,
        template: Arc<Template>,
        parent: Option<usize>,
        relation: Option<Relation>,
        path: &mut Vec<String>,
    ) -> Result<(), RenderError> {
        if path.iter().any(|name| name == template.name()) {
            return Err(RenderError::RecursiveTemplate(template.name().to_owned()));
        }
        path.push(template.name().to_owned());

        let index = self.links.len();
        self.links.push(ChainLink {
            template: Arc::clone(&template),
            parent,
            relation,
        });

        for partial in template.partials() {
            let child = Arc::clone(library.get(&partial.template)?);
            self.visit(library, child, Some(index), Some(partial.relation), path)?;
        }

        path.pop();
        Ok(())
    }

    /// Links in pre-order.
    #[must_use]
    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    /// The page template.
    #[must_use]
    pub fn root(&self) -> &Arc<Template> {
        // build() always pushes the root link first
        &self.links[0].template
    }

    /// Template names in pre-order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.links.iter().map(|link| link.template.name()).collect()
    }
}
