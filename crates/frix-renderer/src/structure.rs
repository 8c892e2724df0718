//! Content-structure resolution.
//!
//! Raw content documents are untyped JSON-like values. Walking a page's
//! templates alongside the raw document assigns every value its shape and
//! leaf type: placeholders produce typed leaves, partials produce sub-trees
//! and loop blocks produce sequences. Raw keys no template consumes are
//! dropped.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::content::{ContentLeaf, ContentNode};
use crate::error::RenderError;
use crate::library::TemplateLibrary;
use crate::template::{Binding, Node, Template};

/// Key reported when the document itself has the wrong shape.
const DOCUMENT_KEY: &str = ".";

/// Resolve a raw content document against the template named `template`.
///
/// Absent and `null` values are left out of the tree; whether that is an
/// error is decided at injection time, where defaults are known.
///
/// # Errors
///
/// Returns [`RenderError::ShapeMismatch`] when a value has the wrong shape
/// for the template construct consuming it, and template lookup errors for
/// missing, broken or self-including fragments.
pub fn resolve_content(
    library: &TemplateLibrary,
    template: &str,
    raw: &Value,
) -> Result<ContentNode, RenderError> {
    let root = library.get(template)?;
    let Value::Object(document) = raw else {
        return Err(RenderError::ShapeMismatch {
            template: template.to_owned(),
            key: DOCUMENT_KEY.to_owned(),
            expected: "mapping",
        });
    };

    let mut walker = Walker {
        library,
        path: vec![root.name().to_owned()],
    };
    let mut tree = BTreeMap::new();
    walker.nodes(root, root.nodes(), document, &mut tree)?;
    Ok(ContentNode::Tree(tree))
}

struct Walker<'a> {
    library: &'a TemplateLibrary,
    path: Vec<String>,
}

impl Walker<'_> {
    fn nodes(
        &mut self,
        template: &Template,
        nodes: &[Node],
        raw: &Map<String, Value>,
        out: &mut BTreeMap<String, ContentNode>,
    ) -> Result<(), RenderError> {
        for node in nodes {
            match node {
                Node::Text(_) => {}
                Node::Slot(slot) => {
                    let value = match raw.get(&slot.key) {
                        None | Some(Value::Null) => continue,
                        Some(Value::String(s)) => s.clone(),
                        Some(Value::Number(n)) => n.to_string(),
                        Some(Value::Bool(b)) => b.to_string(),
                        Some(Value::Array(_) | Value::Object(_)) => {
                            return Err(mismatch(template, &slot.key, "leaf"));
                        }
                    };
                    match out.get(&slot.key) {
                        None => {
                            out.insert(
                                slot.key.clone(),
                                ContentLeaf::new(value, slot.kind).into(),
                            );
                        }
                        Some(ContentNode::Leaf(_)) => {}
                        Some(_) => return Err(mismatch(template, &slot.key, "leaf")),
                    }
                }
                Node::Partial(partial) => {
                    let child = Arc::clone(self.library.get(&partial.template)?);
                    match &partial.binding {
                        Binding::Current => self.enter(&child, raw, out)?,
                        Binding::Key(key) => match raw.get(key) {
                            None | Some(Value::Null) => {}
                            Some(Value::Object(sub)) => {
                                let ContentNode::Tree(map) = out.entry(key.clone()).or_default()
                                else {
                                    return Err(mismatch(template, key, "mapping"));
                                };
                                self.enter(&child, sub, map)?;
                            }
                            Some(_) => return Err(mismatch(template, key, "mapping")),
                        },
                    }
                }
                Node::Each(each) => {
                    let items = match raw.get(&each.key) {
                        None | Some(Value::Null) => continue,
                        Some(Value::Array(items)) => items,
                        Some(_) => return Err(mismatch(template, &each.key, "sequence")),
                    };
                    let entry = out
                        .entry(each.key.clone())
                        .or_insert_with(|| ContentNode::List(Vec::with_capacity(items.len())));
                    let ContentNode::List(list) = entry else {
                        return Err(mismatch(template, &each.key, "sequence"));
                    };
                    // Later loops over the same key extend the element trees built so far.
                    for (index, item) in items.iter().enumerate() {
                        let Value::Object(element) = item else {
                            return Err(mismatch(template, &each.key, "mapping"));
                        };
                        if index == list.len() {
                            list.push(ContentNode::default());
                        }
                        let ContentNode::Tree(tree) = &mut list[index] else {
                            return Err(mismatch(template, &each.key, "mapping"));
                        };
                        self.nodes(template, &each.body, element, tree)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn enter(
        &mut self,
        template: &Template,
        raw: &Map<String, Value>,
        out: &mut BTreeMap<String, ContentNode>,
    ) -> Result<(), RenderError> {
        if self.path.iter().any(|name| name == template.name()) {
            return Err(RenderError::RecursiveTemplate(template.name().to_owned()));
        }
        self.path.push(template.name().to_owned());
        self.nodes(template, template.nodes(), raw, out)?;
        self.path.pop();
        Ok(())
    }
}

fn mismatch(template: &Template, key: &str, expected: &'static str) -> RenderError {
    RenderError::ShapeMismatch {
        template: template.name().to_owned(),
        key: key.to_owned(),
        expected,
    }
}
