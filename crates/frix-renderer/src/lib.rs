//! Template injection, loop expansion and scoped CSS aggregation for frix.
//!
//! This crate is the pure core of the render pipeline. It performs no I/O:
//! templates are handed in as strings, content as [`serde_json::Value`]s.
//!
//! # Pipeline
//!
//! 1. [`TemplateLibrary`] parses fragments and their stylesheets.
//! 2. [`TemplateChain::build`] resolves the fragments a page reaches.
//! 3. [`resolve_content`] types a raw content document against those fragments,
//!    producing a [`ContentNode`] tree.
//! 4. [`Injector`] expands loops via [`LoopExpander`] and binds the tree into HTML.
//! 5. [`CssAggregator`] merges the stylesheets of every chain in the pass,
//!    scoping selectors by fragment nesting.
//!
//! # Example
//!
//! ```
//! use frix_renderer::{resolve_content, CssAggregator, Injector, TemplateChain, TemplateLibrary};
//! use serde_json::json;
//!
//! let library = TemplateLibrary::new()
//!     .with_template("page", "<main>{{> author}}</main>", None)
//!     .with_template(
//!         "author",
//!         r#"<p class="author"><a href="{{link:url}}">{{name}}</a></p>"#,
//!         Some("a { color: red; }"),
//!     );
//! let raw = json!({ "author": { "name": "Wikipedia", "link": "https://wikipedia.org" } });
//!
//! let chain = TemplateChain::build(&library, "page").unwrap();
//! let content = resolve_content(&library, "page", &raw).unwrap();
//! let html = Injector::new(&library).render("page", &content).unwrap();
//! assert_eq!(
//!     html,
//!     r#"<main><p class="author"><a href="https://wikipedia.org">Wikipedia</a></p></main>"#
//! );
//!
//! let mut css = CssAggregator::new();
//! css.add_chain(&chain);
//! assert_eq!(css.finish(), ".author a { color: red; }\n");
//! ```

mod chain;
mod content;
mod css;
mod error;
mod html;
mod inject;
mod library;
mod loops;
mod structure;
mod stylesheet;
mod template;

pub use chain::{ChainLink, TemplateChain};
pub use content::{ContentLeaf, ContentNode, LeafKind};
pub use css::CssAggregator;
pub use error::{RenderError, TemplateError};
pub use html::{escape_html, escape_url};
pub use inject::Injector;
pub use library::TemplateLibrary;
pub use loops::{Instance, LoopExpander};
pub use structure::resolve_content;
pub use stylesheet::{CssItem, Rule, Stylesheet};
pub use template::{Binding, Each, Node, Partial, Relation, Slot, Template};
