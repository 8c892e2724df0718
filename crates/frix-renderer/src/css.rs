//! Per-pass stylesheet aggregation with selector scoping.
//!
//! Each fragment's rules are prefixed with the fragment's own scope
//! selector, and with the scope of its nearest scoped ancestor joined by the
//! combinator matching how the fragment is nested there. The same fragment
//! reached through different nesting contexts therefore yields different
//! selectors, and each is emitted.

use std::collections::HashSet;

use crate::chain::{ChainLink, TemplateChain};
use crate::stylesheet::{CssItem, Rule};
use crate::template::Relation;

/// Collects scoped rules across the template chains of a render pass.
///
/// # Example
///
/// ```
/// use frix_renderer::{CssAggregator, TemplateChain, TemplateLibrary};
///
/// let library = TemplateLibrary::new()
///     .with_template("header", r#"<header class="header">{{> author}}</header>"#, None)
///     .with_template("author", r#"<p class="author">{{name}}</p>"#, Some("p { font-size: 20px; }"));
///
/// let mut css = CssAggregator::new();
/// css.add_chain(&TemplateChain::build(&library, "header").unwrap());
/// assert_eq!(css.finish(), ".header > .author p { font-size: 20px; }\n");
/// ```
#[derive(Debug, Default)]
pub struct CssAggregator {
    lines: Vec<String>,
    seen_rules: HashSet<(String, String)>,
    seen_at_rules: HashSet<String>,
}

impl CssAggregator {
    /// Create an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the stylesheets of every fragment in `chain`, outermost first.
    ///
    /// Rules identical in both scoped selector and body to one already
    /// collected are skipped.
    pub fn add_chain(&mut self, chain: &TemplateChain) {
        let links = chain.links();
        for (index, link) in links.iter().enumerate() {
            let Some(stylesheet) = link.template.stylesheet() else {
                continue;
            };
            let prefix = scope_prefix(links, index);
            for item in stylesheet.items() {
                match item {
                    CssItem::Rule(rule) => self.push_rule(rule, prefix.as_deref()),
                    CssItem::AtRule(text) => {
                        if self.seen_at_rules.insert(text.clone()) {
                            self.lines.push(text.clone());
                        }
                    }
                }
            }
        }
    }

    fn push_rule(&mut self, rule: &Rule, prefix: Option<&str>) {
        let scoped = Rule {
            selectors: rule
                .selectors
                .iter()
                .map(|selector| scope_selector(selector, prefix))
                .collect(),
            body: rule.body.clone(),
        };
        let key = (scoped.selectors.join(", "), scoped.body.clone());
        if self.seen_rules.insert(key) {
            self.lines.push(scoped.to_string());
        }
    }

    /// Number of distinct items collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The aggregated stylesheet, one item per line.
    #[must_use]
    pub fn finish(self) -> String {
        let mut css = self.lines.join("\n");
        if !css.is_empty() {
            css.push('\n');
        }
        css
    }
}

/// Scope prefix for the rules of `links[index]`.
fn scope_prefix(links: &[ChainLink], index: usize) -> Option<String> {
    let own = links[index].template.scope();
    match (nearest_scoped_ancestor(links, index), own) {
        (Some((ancestor, relation)), Some(own)) => {
            Some(format!("{ancestor}{}{own}", relation.combinator()))
        }
        (Some((ancestor, _)), None) => Some(ancestor.to_owned()),
        (None, Some(own)) => Some(own.to_owned()),
        (None, None) => None,
    }
}

/// Closest ancestor with a scope selector, and how `links[index]` relates to it.
///
/// The relation is only `Child` when that ancestor is the direct parent.
fn nearest_scoped_ancestor(links: &[ChainLink], index: usize) -> Option<(&str, Relation)> {
    let mut relation = links[index].relation?;
    let mut current = links[index].parent;
    while let Some(i) = current {
        if let Some(scope) = links[i].template.scope() {
            return Some((scope, relation));
        }
        relation = Relation::Descendant;
        current = links[i].parent;
    }
    None
}

fn scope_selector(selector: &str, prefix: Option<&str>) -> String {
    match prefix {
        Some(prefix) if selector.contains('&') => selector.replace('&', prefix),
        Some(prefix) => format!("{prefix} {selector}"),
        None if selector.contains('&') => selector.replace('&', "").trim().to_owned(),
        None => selector.to_owned(),
    }
}
