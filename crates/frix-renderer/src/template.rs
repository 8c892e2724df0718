//! Template fragment parsing.
//!
//! Fragments are HTML with `{{ }}` tags:
//!
//! | Tag                        | Node            |
//! |----------------------------|-----------------|
//! | `{{key}}`                  | text placeholder |
//! | `{{key:url}}`              | typed placeholder (`text`, `richtext`, `url`) |
//! | `{{key|fallback}}`         | placeholder with default |
//! | `{{> name}}`               | partial bound to content key `name` |
//! | `{{> name key}}`           | partial bound to content key `key` |
//! | `{{> name .}}`             | partial bound to the current scope |
//! | `{{#each key}}…{{/each}}`  | loop over the sequence at `key` |
//! | `{{! comment }}`           | dropped |
//!
//! While parsing, the surrounding HTML is scanned just enough to know how
//! many elements are open at each partial and which class the fragment's
//! root element carries. CSS scoping is derived from both.

use std::sync::LazyLock;

use regex::Regex;

use crate::content::LeafKind;
use crate::error::TemplateError;
use crate::stylesheet::Stylesheet;

/// Elements that never take a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

static CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)class\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>/]+))"#).unwrap()
});

/// How a partial sits inside its parent fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Directly inside the parent's root element.
    Child,
    /// Anywhere deeper, or outside any element.
    Descendant,
}

impl Relation {
    /// CSS combinator expressing this relation.
    #[must_use]
    pub fn combinator(self) -> &'static str {
        match self {
            Self::Child => " > ",
            Self::Descendant => " ",
        }
    }
}

/// Content a partial is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Sub-tree under this key of the current scope.
    Key(String),
    /// The current scope itself.
    Current,
}

/// Placeholder slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Content key.
    pub key: String,
    /// Type assigned to the leaf when content is resolved.
    pub kind: LeafKind,
    /// Fallback used when the key is absent.
    pub default: Option<String>,
}

/// Nested fragment inclusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partial {
    /// Included template name.
    pub template: String,
    /// Content scope handed to the included template.
    pub binding: Binding,
    /// Position relative to the including fragment's root element.
    pub relation: Relation,
}

/// Loop block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Each {
    /// Content key of the sequence.
    pub key: String,
    /// Repeated body.
    pub body: Vec<Node>,
}

/// Parsed template node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal HTML.
    Text(String),
    /// Placeholder.
    Slot(Slot),
    /// Nested fragment.
    Partial(Partial),
    /// Loop directive.
    Each(Each),
}

/// A parsed template fragment with its optional stylesheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    name: String,
    nodes: Vec<Node>,
    scope: Option<String>,
    stylesheet: Option<Stylesheet>,
}

impl Template {
    /// Parse a fragment.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Syntax`] for malformed tags, unknown block
    /// keywords, invalid content types and unbalanced loop blocks.
    pub fn parse(name: &str, source: &str) -> Result<Self, TemplateError> {
        let (nodes, scope) = Parser::new(name, source).run()?;
        Ok(Self {
            name: name.to_owned(),
            nodes,
            scope,
            stylesheet: None,
        })
    }

    /// Attach the fragment's stylesheet.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Stylesheet`] if the CSS can't be split into rules.
    pub fn with_stylesheet(mut self, css: &str) -> Result<Self, TemplateError> {
        let stylesheet = Stylesheet::parse(css).map_err(|message| TemplateError::Stylesheet {
            template: self.name.clone(),
            message,
        })?;
        self.stylesheet = Some(stylesheet);
        Ok(self)
    }

    /// Template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-level nodes.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Scope selector (`.class` of the root element), if any.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Attached stylesheet, if any.
    #[must_use]
    pub fn stylesheet(&self) -> Option<&Stylesheet> {
        self.stylesheet.as_ref()
    }

    /// All partial inclusions in document order, including those in loop bodies.
    #[must_use]
    pub fn partials(&self) -> Vec<&Partial> {
        fn collect<'a>(nodes: &'a [Node], out: &mut Vec<&'a Partial>) {
            for node in nodes {
                match node {
                    Node::Partial(partial) => out.push(partial),
                    Node::Each(each) => collect(&each.body, out),
                    Node::Text(_) | Node::Slot(_) => {}
                }
            }
        }

        let mut out = Vec::new();
        collect(&self.nodes, &mut out);
        out
    }
}

/// Open loop block awaiting its `{{/each}}`.
struct Frame {
    key: String,
    line: usize,
    nodes: Vec<Node>,
}

struct Parser<'a> {
    name: &'a str,
    source: &'a str,
    root: Vec<Node>,
    frames: Vec<Frame>,
    elements: ElementTracker,
}

impl<'a> Parser<'a> {
    fn new(name: &'a str, source: &'a str) -> Self {
        Self {
            name,
            source,
            root: Vec::new(),
            frames: Vec::new(),
            elements: ElementTracker::default(),
        }
    }

    fn run(mut self) -> Result<(Vec<Node>, Option<String>), TemplateError> {
        let source = self.source;
        let mut offset = 0;

        while let Some(start) = source[offset..].find("{{") {
            let tag_start = offset + start;
            self.push_text(&source[offset..tag_start]);

            let inner_start = tag_start + 2;
            let Some(len) = source[inner_start..].find("}}") else {
                return Err(self.error(tag_start, "unclosed tag"));
            };
            self.tag(tag_start, source[inner_start..inner_start + len].trim())?;
            offset = inner_start + len + 2;
        }
        self.push_text(&source[offset..]);

        if let Some(frame) = self.frames.last() {
            return Err(TemplateError::Syntax {
                template: self.name.to_owned(),
                line: frame.line,
                message: format!("unclosed {{{{#each {}}}}}", frame.key),
            });
        }
        Ok((self.root, self.elements.scope))
    }

    fn current(&mut self) -> &mut Vec<Node> {
        match self.frames.last_mut() {
            Some(frame) => &mut frame.nodes,
            None => &mut self.root,
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.elements.feed(text);
        let nodes = self.current();
        if let Some(Node::Text(last)) = nodes.last_mut() {
            last.push_str(text);
        } else {
            nodes.push(Node::Text(text.to_owned()));
        }
    }

    fn tag(&mut self, pos: usize, tag: &str) -> Result<(), TemplateError> {
        if tag.is_empty() {
            return Err(self.error(pos, "empty tag"));
        }
        if tag.starts_with('!') {
            return Ok(());
        }
        if let Some(rest) = tag.strip_prefix('>') {
            let partial = self.partial(pos, rest)?;
            self.current().push(Node::Partial(partial));
            return Ok(());
        }
        if let Some(rest) = tag.strip_prefix('#') {
            let key = match rest.split_once(char::is_whitespace) {
                Some(("each", key)) => key.trim(),
                _ => return Err(self.error(pos, &format!("unknown block '{{{{#{rest}}}}}'"))),
            };
            self.require_name(pos, key)?;
            let line = self.line(pos);
            self.frames.push(Frame {
                key: key.to_owned(),
                line,
                nodes: Vec::new(),
            });
            return Ok(());
        }
        if let Some(rest) = tag.strip_prefix('/') {
            if rest.trim() != "each" {
                return Err(self.error(pos, &format!("unknown closing tag '{{{{/{rest}}}}}'")));
            }
            let Some(frame) = self.frames.pop() else {
                return Err(self.error(pos, "{{/each}} without matching {{#each}}"));
            };
            self.current().push(Node::Each(Each {
                key: frame.key,
                body: frame.nodes,
            }));
            return Ok(());
        }

        let slot = self.slot(pos, tag)?;
        self.current().push(Node::Slot(slot));
        Ok(())
    }

    fn partial(&self, pos: usize, rest: &str) -> Result<Partial, TemplateError> {
        let mut parts = rest.split_whitespace();
        let Some(template) = parts.next() else {
            return Err(self.error(pos, "partial tag needs a template name"));
        };
        self.require_name(pos, template)?;
        let binding = match parts.next() {
            None => Binding::Key(template.to_owned()),
            Some(".") => Binding::Current,
            Some(key) => {
                self.require_name(pos, key)?;
                Binding::Key(key.to_owned())
            }
        };
        if parts.next().is_some() {
            return Err(self.error(pos, "partial tag takes at most a template and a key"));
        }
        let relation = if self.elements.depth == 1 {
            Relation::Child
        } else {
            Relation::Descendant
        };
        Ok(Partial {
            template: template.to_owned(),
            binding,
            relation,
        })
    }

    fn slot(&self, pos: usize, tag: &str) -> Result<Slot, TemplateError> {
        let (spec, default) = match tag.split_once('|') {
            Some((spec, default)) => (spec.trim(), Some(default.trim().to_owned())),
            None => (tag, None),
        };
        let (key, kind) = match spec.split_once(':') {
            Some((key, kind)) => {
                let kind = kind
                    .trim()
                    .parse::<LeafKind>()
                    .map_err(|message| self.error(pos, &message))?;
                (key.trim(), kind)
            }
            None => (spec, LeafKind::Text),
        };
        self.require_name(pos, key)?;
        Ok(Slot {
            key: key.to_owned(),
            kind,
            default,
        })
    }

    fn require_name(&self, pos: usize, name: &str) -> Result<(), TemplateError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(())
        } else {
            Err(self.error(pos, &format!("invalid name '{name}'")))
        }
    }

    fn line(&self, pos: usize) -> usize {
        self.source[..pos].matches('\n').count() + 1
    }

    fn error(&self, pos: usize, message: &str) -> TemplateError {
        TemplateError::Syntax {
            template: self.name.to_owned(),
            line: self.line(pos),
            message: message.to_owned(),
        }
    }
}

/// Minimal HTML tag scanner tracking open-element depth.
#[derive(Debug, Default)]
struct ElementTracker {
    depth: usize,
    tag: Option<String>,
    quote: Option<char>,
    root_seen: bool,
    scope: Option<String>,
}

impl ElementTracker {
    fn feed(&mut self, text: &str) {
        for c in text.chars() {
            let Some(buf) = self.tag.as_mut() else {
                if c == '<' {
                    self.tag = Some(String::new());
                }
                continue;
            };
            if let Some(quote) = self.quote {
                if c == quote {
                    self.quote = None;
                }
                buf.push(c);
                continue;
            }
            match c {
                // "a < b" is text, not a tag.
                _ if buf.is_empty() && c.is_whitespace() => self.tag = None,
                '"' | '\'' if !buf.starts_with('!') => {
                    self.quote = Some(c);
                    buf.push(c);
                }
                '>' if !(buf.starts_with("!--") && !buf.ends_with("--")) => {
                    let tag = std::mem::take(buf);
                    self.tag = None;
                    self.close(&tag);
                }
                _ => buf.push(c),
            }
        }
    }

    fn close(&mut self, tag: &str) {
        if tag.starts_with('!') || tag.starts_with('?') {
            return;
        }
        if tag.starts_with('/') {
            self.depth = self.depth.saturating_sub(1);
            return;
        }
        let name = tag
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect::<String>()
            .to_ascii_lowercase();
        if name.is_empty() {
            return;
        }
        if !self.root_seen {
            self.root_seen = true;
            self.scope = first_class(tag).map(|class| format!(".{class}"));
        }
        if !tag.ends_with('/') && !VOID_ELEMENTS.contains(&name.as_str()) {
            self.depth += 1;
        }
    }
}

fn first_class(tag: &str) -> Option<String> {
    let caps = CLASS_ATTR.captures(tag)?;
    let value = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
    value.as_str().split_whitespace().next().map(str::to_owned)
}
