//! HTML escaping for injected leaf values.

use crate::content::{ContentLeaf, LeafKind};

/// Schemes that execute script when followed.
const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:"];

/// Escape special HTML characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Neutralise script-bearing URLs, then escape for an attribute value.
#[must_use]
pub fn escape_url(url: &str) -> String {
    let normalized: String = url
        .trim()
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect::<String>()
        .to_ascii_lowercase();
    if UNSAFE_SCHEMES.iter().any(|s| normalized.starts_with(s)) {
        return "#".to_owned();
    }
    escape_html(url)
}

/// Format a leaf for insertion according to its type.
pub(crate) fn write_leaf(out: &mut String, leaf: &ContentLeaf) {
    match leaf.kind {
        LeafKind::Text => out.push_str(&escape_html(&leaf.value)),
        LeafKind::RichText => out.push_str(&leaf.value),
        LeafKind::Url => out.push_str(&escape_url(&leaf.value)),
    }
}
