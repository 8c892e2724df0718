//! Loop expansion.
//!
//! Flattens a fragment's nodes into a list of instances, each paired with
//! the content scope it renders against. Loop blocks are replaced by one
//! copy of their body per sequence element, with that element as the
//! body's scope.

use crate::content::ContentNode;
use crate::error::RenderError;
use crate::template::{Node, Partial, Slot, Template};

/// A loop-free node bound to its content scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instance<'t, 'c> {
    /// Literal HTML.
    Text(&'t str),
    /// Placeholder looked up in `scope`.
    Slot(&'t Slot, &'c ContentNode),
    /// Nested fragment bound relative to `scope`.
    Partial(&'t Partial, &'c ContentNode),
}

/// Expands loop blocks ahead of injection.
pub struct LoopExpander;

impl LoopExpander {
    /// Expand every loop block of `template` against `scope`.
    ///
    /// Empty sequences contribute nothing. Nested loops expand against the
    /// element scope of the enclosing loop.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingContent`] when a loop key is absent and
    /// [`RenderError::ShapeMismatch`] when it is not a sequence.
    pub fn expand<'t, 'c>(
        template: &'t Template,
        scope: &'c ContentNode,
    ) -> Result<Vec<Instance<'t, 'c>>, RenderError> {
        let mut out = Vec::new();
        Self::expand_nodes(template.name(), template.nodes(), scope, &mut out)?;
        Ok(out)
    }

    fn expand_nodes<'t, 'c>(
        name: &str,
        nodes: &'t [Node],
        scope: &'c ContentNode,
        out: &mut Vec<Instance<'t, 'c>>,
    ) -> Result<(), RenderError> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push(Instance::Text(text)),
                Node::Slot(slot) => out.push(Instance::Slot(slot, scope)),
                Node::Partial(partial) => out.push(Instance::Partial(partial, scope)),
                Node::Each(each) => match scope.get(&each.key) {
                    Some(ContentNode::List(items)) => {
                        for item in items {
                            Self::expand_nodes(name, &each.body, item, out)?;
                        }
                    }
                    Some(_) => {
                        return Err(RenderError::ShapeMismatch {
                            template: name.to_owned(),
                            key: each.key.clone(),
                            expected: "sequence",
                        });
                    }
                    None => {
                        return Err(RenderError::MissingContent {
                            template: name.to_owned(),
                            key: each.key.clone(),
                        });
                    }
                },
            }
        }
        Ok(())
    }
}
