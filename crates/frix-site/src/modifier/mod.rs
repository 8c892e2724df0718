//! Extension points and the modifiers attached to them.
//!
//! A [`Modifier`] is an async text transformation. Modifiers are appended to
//! the ordered list of an [`ExtensionPoint`] and run strictly in registration
//! order, each one receiving the previous one's output.

mod builtin;
mod registry;

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

pub use builtin::{BUILTIN_NAMES, builtin};
pub use registry::ModifierRegistry;

/// Named stage of a render pass where modifiers run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExtensionPoint {
    /// Whole page document, after template injection.
    Content,
    /// Inner HTML of the page's `<head>` section.
    Header,
    /// Aggregated stylesheet, once per pass.
    Css,
}

impl ExtensionPoint {
    /// All points in pipeline order.
    pub const ALL: [Self; 3] = [Self::Content, Self::Header, Self::Css];

    /// Registration name of the point.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Header => "header",
            Self::Css => "css",
        }
    }
}

impl fmt::Display for ExtensionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtensionPoint {
    type Err = ModifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content" => Ok(Self::Content),
            "header" => Ok(Self::Header),
            "css" => Ok(Self::Css),
            _ => Err(ModifierError::UnknownExtensionPoint {
                target: s.to_owned(),
            }),
        }
    }
}

/// Rejected modifier registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModifierError {
    /// The registration carried no callable modifier.
    #[error("Not a function.")]
    InvalidModifier {
        /// Target the registration named.
        target: String,
    },
    /// The target names no extension point.
    #[error("Event does not exist.")]
    UnknownExtensionPoint {
        /// Target the registration named.
        target: String,
    },
    /// No built-in modifier has this name at the target point.
    #[error("Unknown built-in modifier '{name}' for '{target}'")]
    UnknownBuiltin {
        /// Requested name.
        name: String,
        /// Target the registration named.
        target: String,
    },
}

/// Async text transformation run at an extension point.
///
/// Implemented for every `Fn(String) -> impl Future<Output = String>`, so
/// closures returning `async move` blocks can be registered directly.
#[async_trait]
pub trait Modifier: Send + Sync {
    /// Transform `input` and return the result.
    async fn modify(&self, input: String) -> String;
}

#[async_trait]
impl<F, Fut> Modifier for F
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = String> + Send + 'static,
{
    async fn modify(&self, input: String) -> String {
        (self)(input).await
    }
}

/// Object form of a registration.
///
/// `modifier` is optional so that registrations assembled from loosely typed
/// sources can be checked; a `None` modifier is rejected by
/// [`ModifierRegistry::add`].
#[derive(Clone)]
pub struct Registration {
    /// Extension point name.
    pub target: String,
    /// Modifier to append.
    pub modifier: Option<Arc<dyn Modifier>>,
}

impl Registration {
    /// Registration of `modifier` at `target`.
    #[must_use]
    pub fn new(target: impl Into<String>, modifier: Arc<dyn Modifier>) -> Self {
        Self {
            target: target.into(),
            modifier: Some(modifier),
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("target", &self.target)
            .field("modifier", &self.modifier.as_ref().map(|_| "<modifier>"))
            .finish()
    }
}
