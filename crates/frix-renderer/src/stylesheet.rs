//! Structural stylesheet splitting.
//!
//! Only selector/body pairs are recognised. Declarations are never parsed;
//! at-rules (`@media`, `@import`, ...) are carried through as opaque text.

use std::fmt;

/// A selector list with its declaration block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Comma-separated selectors, trimmed.
    pub selectors: Vec<String>,
    /// Declarations with whitespace collapsed, always `;`-terminated when non-empty.
    pub body: String,
}

/// Top-level stylesheet item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssItem {
    /// Ordinary rule, subject to scoping.
    Rule(Rule),
    /// At-rule, emitted verbatim.
    AtRule(String),
}

/// A fragment's stylesheet, split into top-level items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    items: Vec<CssItem>,
}

impl Stylesheet {
    /// Split CSS source into rules and at-rules.
    ///
    /// # Errors
    ///
    /// Returns a message for unclosed comments, unbalanced braces and rules
    /// without selectors.
    pub fn parse(css: &str) -> Result<Self, String> {
        let css = strip_comments(css)?;
        let mut items = Vec::new();
        let mut rest = css.as_str();

        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }

            if rest.starts_with('@') {
                let semi = rest.find(';');
                let open = rest.find('{');
                let end = match (semi, open) {
                    (Some(semi), open) if open.is_none_or(|open| semi < open) => semi,
                    (_, Some(open)) => matching_brace(rest, open)?,
                    _ => return Err(format!("unterminated at-rule '{}'", rest.trim())),
                };
                items.push(CssItem::AtRule(rest[..=end].trim().to_owned()));
                rest = &rest[end + 1..];
                continue;
            }

            let Some(open) = rest.find('{') else {
                return Err(format!("expected '{{' after '{}'", rest.trim()));
            };
            if rest[..open].contains('}') {
                return Err("unexpected '}'".to_owned());
            }
            let close = matching_brace(rest, open)?;
            let selectors: Vec<String> = rest[..open]
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
            if selectors.is_empty() {
                return Err("rule without selector".to_owned());
            }
            items.push(CssItem::Rule(Rule {
                selectors,
                body: normalize_body(&rest[open + 1..close]),
            }));
            rest = &rest[close + 1..];
        }

        Ok(Self { items })
    }

    /// Items in source order.
    #[must_use]
    pub fn items(&self) -> &[CssItem] {
        &self.items
    }

    /// Whether the stylesheet has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let selectors = self.selectors.join(", ");
        if self.body.is_empty() {
            write!(f, "{selectors} {{}}")
        } else {
            write!(f, "{selectors} {{ {} }}", self.body)
        }
    }
}

fn strip_comments(css: &str) -> Result<String, String> {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        let Some(end) = rest[start + 2..].find("*/") else {
            return Err("unclosed comment".to_owned());
        };
        rest = &rest[start + 2 + end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Byte index of the `}` closing the `{` at `open`.
fn matching_brace(s: &str, open: usize) -> Result<usize, String> {
    let mut depth = 0usize;
    for (i, c) in s[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(open + i);
                }
            }
            _ => {}
        }
    }
    Err("unbalanced braces".to_owned())
}

fn normalize_body(body: &str) -> String {
    let mut out = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if !out.is_empty() && !out.ends_with(';') && !out.ends_with('}') {
        out.push(';');
    }
    out
}
