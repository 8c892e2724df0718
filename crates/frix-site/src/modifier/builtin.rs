//! Modifiers selectable by name from configuration.
//!
//! `minify` runs the HTML minifier on page documents and head sections.
//! `strip-comments` removes `/* */` comments from the aggregated stylesheet.
//! `trim` works everywhere.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;

use super::{ExtensionPoint, Modifier};

/// Names accepted by [`builtin`], each with the points it applies to.
pub const BUILTIN_NAMES: &[(&str, &[ExtensionPoint])] = &[
    ("trim", &ExtensionPoint::ALL),
    ("minify", &[ExtensionPoint::Content, ExtensionPoint::Header]),
    ("strip-comments", &[ExtensionPoint::Css]),
];

static CSS_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

struct Builtin {
    transform: fn(String) -> String,
}

#[async_trait]
impl Modifier for Builtin {
    async fn modify(&self, input: String) -> String {
        (self.transform)(input)
    }
}

/// Look up the built-in modifier `name` for `point`.
///
/// Returns `None` for unknown names and for names that do not apply at
/// `point`.
#[must_use]
pub fn builtin(name: &str, point: ExtensionPoint) -> Option<Arc<dyn Modifier>> {
    let transform: fn(String) -> String = match (name, point) {
        ("trim", _) => trim,
        ("minify", ExtensionPoint::Content | ExtensionPoint::Header) => minify,
        ("strip-comments", ExtensionPoint::Css) => strip_css_comments,
        _ => return None,
    };
    Some(Arc::new(Builtin { transform }))
}

fn trim(s: String) -> String {
    s.trim().to_owned()
}

fn minify(s: String) -> String {
    let minified = minify_html::minify(s.as_bytes(), &minify_html::Cfg::new());
    String::from_utf8(minified).unwrap_or(s)
}

fn strip_css_comments(s: String) -> String {
    CSS_COMMENT.replace_all(&s, "").trim().to_owned()
}
