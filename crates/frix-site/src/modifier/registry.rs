use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::{ExtensionPoint, Modifier, ModifierError, Registration, builtin};

/// Ordered modifier lists, one per extension point.
///
/// Registrations persist across render passes until removed with
/// [`clear`](Self::clear) or [`clear_all`](Self::clear_all).
#[derive(Clone, Default)]
pub struct ModifierRegistry {
    points: BTreeMap<ExtensionPoint, Vec<Arc<dyn Modifier>>>,
}

impl ModifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `modifier` to the point named `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ModifierError::UnknownExtensionPoint`] if `target` names no
    /// extension point.
    pub fn add_modifier<M>(&mut self, target: &str, modifier: M) -> Result<(), ModifierError>
    where
        M: Modifier + 'static,
    {
        let point = target.parse()?;
        self.register(point, Arc::new(modifier));
        Ok(())
    }

    /// Append the modifier of an object-form registration.
    ///
    /// # Errors
    ///
    /// Returns [`ModifierError::InvalidModifier`] if the registration has no
    /// modifier, otherwise [`ModifierError::UnknownExtensionPoint`] if its
    /// target names no extension point.
    pub fn add(&mut self, registration: Registration) -> Result<(), ModifierError> {
        let Registration { target, modifier } = registration;
        let Some(modifier) = modifier else {
            return Err(ModifierError::InvalidModifier { target });
        };
        let point = target.parse()?;
        self.register(point, modifier);
        Ok(())
    }

    /// Append the built-in modifier `name` to the point named `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ModifierError::UnknownExtensionPoint`] for an unknown target
    /// and [`ModifierError::UnknownBuiltin`] for a name that is unknown or
    /// does not apply at that point.
    pub fn add_named(&mut self, target: &str, name: &str) -> Result<(), ModifierError> {
        let point = target.parse()?;
        let modifier = builtin(name, point).ok_or_else(|| ModifierError::UnknownBuiltin {
            name: name.to_owned(),
            target: target.to_owned(),
        })?;
        self.register(point, modifier);
        Ok(())
    }

    /// Append `modifier` to `point`.
    pub fn register(&mut self, point: ExtensionPoint, modifier: Arc<dyn Modifier>) {
        self.points.entry(point).or_default().push(modifier);
    }

    /// Modifiers of `point` in registration order.
    #[must_use]
    pub fn get(&self, point: ExtensionPoint) -> &[Arc<dyn Modifier>] {
        self.points.get(&point).map_or(&[], Vec::as_slice)
    }

    /// Whether this exact modifier instance is registered at `point`.
    #[must_use]
    pub fn contains(&self, point: ExtensionPoint, modifier: &Arc<dyn Modifier>) -> bool {
        self.get(point).iter().any(|m| Arc::ptr_eq(m, modifier))
    }

    /// Number of modifiers registered at `point`.
    #[must_use]
    pub fn len(&self, point: ExtensionPoint) -> usize {
        self.get(point).len()
    }

    /// Whether no modifier is registered anywhere.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.values().all(Vec::is_empty)
    }

    /// Remove every modifier registered at `point`.
    pub fn clear(&mut self, point: ExtensionPoint) {
        self.points.remove(&point);
    }

    /// Remove every modifier.
    pub fn clear_all(&mut self) {
        self.points.clear();
    }

    /// Run the modifiers of `point` over `input` in order.
    pub async fn apply(&self, point: ExtensionPoint, input: String) -> String {
        let mut output = input;
        for modifier in self.get(point) {
            output = modifier.modify(output).await;
        }
        output
    }
}

impl fmt::Debug for ModifierRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (point, modifiers) in &self.points {
            map.entry(&point.as_str(), &modifiers.len());
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;

    fn suffix(tag: &'static str) -> impl Modifier {
        move |html: String| async move { format!("{html}{tag}") }
    }

    #[test]
    fn test_add_modifier_string_form() {
        let mut registry = ModifierRegistry::new();

        registry.add_modifier("content", suffix("a")).unwrap();
        registry.add_modifier("content", suffix("b")).unwrap();

        assert_eq!(registry.len(ExtensionPoint::Content), 2);
        assert_eq!(registry.len(ExtensionPoint::Css), 0);
    }

    #[test]
    fn test_add_object_form() {
        let mut registry = ModifierRegistry::new();
        let modifier: Arc<dyn Modifier> = Arc::new(suffix("a"));

        registry
            .add(Registration::new("header", Arc::clone(&modifier)))
            .unwrap();

        assert!(registry.contains(ExtensionPoint::Header, &modifier));
        assert!(!registry.contains(ExtensionPoint::Content, &modifier));
    }

    #[test]
    fn test_add_without_modifier_is_rejected() {
        let mut registry = ModifierRegistry::new();

        let err = registry
            .add(Registration {
                target: "content".to_owned(),
                modifier: None,
            })
            .unwrap_err();

        assert_eq!(err.to_string(), "Not a function.");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_missing_modifier_checked_before_target() {
        let mut registry = ModifierRegistry::new();

        let err = registry
            .add(Registration {
                target: "invalid-string".to_owned(),
                modifier: None,
            })
            .unwrap_err();

        assert!(matches!(err, ModifierError::InvalidModifier { .. }));
    }

    #[test]
    fn test_unknown_target_is_rejected_in_every_form() {
        let mut registry = ModifierRegistry::new();

        let string_form = registry.add_modifier("invalid-string", suffix("a"));
        let object_form = registry.add(Registration::new("invalid-string", Arc::new(suffix("a"))));
        let named_form = registry.add_named("invalid-string", "trim");

        for result in [string_form, object_form, named_form] {
            assert_eq!(result.unwrap_err().to_string(), "Event does not exist.");
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_named() {
        let mut registry = ModifierRegistry::new();

        registry.add_named("css", "trim").unwrap();
        registry.add_named("css", "strip-comments").unwrap();
        registry.add_named("content", "minify").unwrap();
        let misplaced = registry.add_named("css", "minify").unwrap_err();
        let unknown = registry.add_named("content", "collapse").unwrap_err();

        assert_eq!(registry.len(ExtensionPoint::Css), 2);
        assert_eq!(registry.len(ExtensionPoint::Content), 1);
        assert_eq!(
            misplaced,
            ModifierError::UnknownBuiltin {
                name: "minify".to_owned(),
                target: "css".to_owned(),
            }
        );
        assert_eq!(
            unknown.to_string(),
            "Unknown built-in modifier 'collapse' for 'content'"
        );
    }

    #[tokio::test]
    async fn test_apply_runs_in_registration_order() {
        let mut registry = ModifierRegistry::new();
        registry.add_modifier("content", suffix("1")).unwrap();
        registry.add_modifier("content", suffix("2")).unwrap();
        registry.add_modifier("content", suffix("3")).unwrap();

        let output = registry
            .apply(ExtensionPoint::Content, "x".to_owned())
            .await;

        assert_eq!(output, "x123");
    }

    #[tokio::test]
    async fn test_apply_without_modifiers_is_identity() {
        let registry = ModifierRegistry::new();

        assert_eq!(
            registry.apply(ExtensionPoint::Css, "p {}".to_owned()).await,
            "p {}"
        );
    }

    #[tokio::test]
    async fn test_same_instance_registered_twice_runs_twice() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let modifier: Arc<dyn Modifier> = Arc::new(move |html: String| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                html
            }
        });
        let mut registry = ModifierRegistry::new();
        registry.register(ExtensionPoint::Header, Arc::clone(&modifier));
        registry.register(ExtensionPoint::Header, modifier);

        registry
            .apply(ExtensionPoint::Header, String::new())
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_clear() {
        let mut registry = ModifierRegistry::new();
        registry.add_modifier("content", suffix("a")).unwrap();
        registry.add_modifier("css", suffix("a")).unwrap();

        registry.clear(ExtensionPoint::Content);
        assert_eq!(registry.len(ExtensionPoint::Content), 0);
        assert_eq!(registry.len(ExtensionPoint::Css), 1);

        registry.clear_all();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_debug_lists_counts() {
        let mut registry = ModifierRegistry::new();
        registry.add_modifier("css", suffix("a")).unwrap();

        assert_eq!(format!("{registry:?}"), "{\"css\": 1}");
    }
}
