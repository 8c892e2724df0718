//! Typed content tree bound into templates.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a leaf value is written into HTML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafKind {
    /// Plain text, HTML-escaped.
    #[default]
    Text,
    /// Markup, inserted verbatim.
    RichText,
    /// Link target, attribute-escaped with unsafe schemes neutralised.
    Url,
}

impl LeafKind {
    /// Name used in templates and serialized content.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::RichText => "richtext",
            Self::Url => "url",
        }
    }
}

impl fmt::Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeafKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "richtext" => Ok(Self::RichText),
            "url" => Ok(Self::Url),
            other => Err(format!("unknown content type '{other}'")),
        }
    }
}

/// A typed value at the bottom of a content tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentLeaf {
    /// Raw value.
    pub value: String,
    /// Injection type.
    #[serde(rename = "type")]
    pub kind: LeafKind,
}

impl ContentLeaf {
    /// Create a leaf of the given kind.
    #[must_use]
    pub fn new(value: impl Into<String>, kind: LeafKind) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }

    /// Create a `text` leaf.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(value, LeafKind::Text)
    }
}

/// Node of a resolved content tree.
///
/// Serializes to the nested `{ "key": { "value": ..., "type": ... } }` shape;
/// sequences (loop sources) serialize as arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentNode {
    /// Typed leaf value.
    Leaf(ContentLeaf),
    /// Ordered sequence consumed by a loop directive.
    List(Vec<ContentNode>),
    /// Nested mapping consumed by a partial.
    Tree(BTreeMap<String, ContentNode>),
}

/// Shared empty scope for partials whose content key is absent.
pub(crate) static EMPTY: ContentNode = ContentNode::Tree(BTreeMap::new());

impl Default for ContentNode {
    fn default() -> Self {
        Self::Tree(BTreeMap::new())
    }
}

impl ContentNode {
    /// Child node by key. Returns `None` for leaves and sequences.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ContentNode> {
        match self {
            Self::Tree(map) => map.get(key),
            Self::Leaf(_) | Self::List(_) => None,
        }
    }

    /// Leaf value, if this node is one.
    #[must_use]
    pub fn as_leaf(&self) -> Option<&ContentLeaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::List(_) | Self::Tree(_) => None,
        }
    }

    /// Sequence items, if this node is one.
    #[must_use]
    pub fn as_list(&self) -> Option<&[ContentNode]> {
        match self {
            Self::List(items) => Some(items),
            Self::Leaf(_) | Self::Tree(_) => None,
        }
    }

    /// Follow a `/`-separated key path (e.g. `article/header/author`).
    #[must_use]
    pub fn pointer(&self, path: &str) -> Option<&ContentNode> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| match node {
                Self::List(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => node.get(segment),
            })
    }

    /// Shape name used in error messages.
    #[must_use]
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "leaf",
            Self::List(_) => "sequence",
            Self::Tree(_) => "mapping",
        }
    }
}

impl From<ContentLeaf> for ContentNode {
    fn from(leaf: ContentLeaf) -> Self {
        Self::Leaf(leaf)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn sample() -> ContentNode {
        let mut author = BTreeMap::new();
        author.insert("name".to_owned(), ContentLeaf::text("Wikipedia").into());
        author.insert(
            "link".to_owned(),
            ContentLeaf::new("https://simple.wikipedia.org/wiki/Atom", LeafKind::Url).into(),
        );
        let mut root = BTreeMap::new();
        root.insert("title".to_owned(), ContentLeaf::text("Atomic").into());
        root.insert("author".to_owned(), ContentNode::Tree(author));
        root.insert(
            "quotes".to_owned(),
            ContentNode::List(vec![ContentNode::Tree(BTreeMap::from([(
                "text".to_owned(),
                ContentLeaf::text("q").into(),
            )]))]),
        );
        ContentNode::Tree(root)
    }

    #[test]
    fn test_serializes_to_typed_shape() {
        let value = serde_json::to_value(sample()).unwrap();

        assert_eq!(
            value,
            json!({
                "title": { "value": "Atomic", "type": "text" },
                "author": {
                    "name": { "value": "Wikipedia", "type": "text" },
                    "link": { "value": "https://simple.wikipedia.org/wiki/Atom", "type": "url" }
                },
                "quotes": [ { "text": { "value": "q", "type": "text" } } ]
            })
        );
    }

    #[test]
    fn test_deserializes_leaf_and_tree() {
        let node: ContentNode = serde_json::from_value(json!({
            "text": { "value": "<b>x</b>", "type": "richtext" },
            "nested": { "value": { "value": "v", "type": "text" } }
        }))
        .unwrap();

        assert_eq!(
            node.pointer("text").and_then(ContentNode::as_leaf),
            Some(&ContentLeaf::new("<b>x</b>", LeafKind::RichText))
        );
        // A mapping whose key happens to be "value" stays a mapping.
        assert_eq!(
            node.pointer("nested/value").and_then(ContentNode::as_leaf),
            Some(&ContentLeaf::text("v"))
        );
    }

    #[test]
    fn test_pointer() {
        let node = sample();

        assert_eq!(
            node.pointer("author/name").and_then(ContentNode::as_leaf),
            Some(&ContentLeaf::text("Wikipedia"))
        );
        assert_eq!(
            node.pointer("quotes/0/text").and_then(ContentNode::as_leaf),
            Some(&ContentLeaf::text("q"))
        );
        assert!(node.pointer("author/missing").is_none());
        assert!(node.pointer("title/value").is_none());
    }

    #[test]
    fn test_leaf_kind_from_str() {
        assert_eq!("richtext".parse::<LeafKind>(), Ok(LeafKind::RichText));
        assert_eq!("url".parse::<LeafKind>(), Ok(LeafKind::Url));
        assert!("markdown".parse::<LeafKind>().is_err());
    }

    #[test]
    fn test_shape() {
        assert_eq!(ContentNode::default().shape(), "mapping");
        assert_eq!(ContentNode::List(Vec::new()).shape(), "sequence");
        assert_eq!(ContentNode::from(ContentLeaf::text("x")).shape(), "leaf");
    }
}
