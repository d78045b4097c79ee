//! Validator registry and resolved-chain cache.
//!
//! The registry maps a validator id to an ordered list of
//! `(selector, validator)` overrides. A field's chain is resolved from its
//! class names: each class that names a registered id contributes the
//! validator of the first override whose selector matches the field.
//!
//! Class names with no registered id, and ids with no matching selector,
//! are skipped. Both are logged at `debug` and never fail resolution.

mod cache;
mod selector;

pub use cache::TargetCache;
pub use selector::Selector;

use crate::core::FieldElement;
use crate::errors::Result;
use crate::validators::{builtin, Predicate, Validator};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    selector: Selector,
    validator: Validator,
}

/// Registry of validators with per-selector overrides.
#[derive(Debug, Default)]
pub struct ValidatorRegistry {
    entries: RwLock<HashMap<String, Vec<Entry>>>,
    generation: AtomicU64,
}

impl ValidatorRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the stock validators, each bound to
    /// `input.<id>`.
    pub fn with_builtins() -> Result<Self> {
        let registry = Self::new();
        for validator in builtin::all() {
            let selector = format!("input.{}", validator.id());
            registry.add(&selector, validator)?;
        }
        Ok(registry)
    }

    /// Registers `validator` under its own id for fields matching `selector`.
    ///
    /// Overrides are tried in registration order. Registering the same
    /// selector again for the same id replaces the earlier entry in place.
    pub fn add(&self, selector: &str, validator: Validator) -> Result<()> {
        let selector = Selector::parse(selector)?;
        let id = validator.id().to_string();
        debug!(validator = %id, selector = %selector, "Registering validator");

        let mut entries = self.entries.write();
        let overrides = entries.entry(id).or_default();
        let entry = Entry { selector, validator };
        match overrides
            .iter_mut()
            .find(|e| e.selector.as_str() == entry.selector.as_str())
        {
            Some(existing) => *existing = entry,
            None => overrides.push(entry),
        }
        drop(entries);

        self.generation.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Registers a bare predicate under `id`.
    pub fn add_validator(&self, id: &str, selector: &str, predicate: Predicate) -> Result<()> {
        self.add(selector, Validator::new(id, predicate))
    }

    /// Removes every override of `id`. Returns true if any existed.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.entries.write().remove(id).is_some();
        if removed {
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
        removed
    }

    /// Resolves the validator `id` for `field`.
    ///
    /// Returns `None` when `id` is unknown or no override matches.
    #[must_use]
    pub fn resolve_one(&self, field: &FieldElement, id: &str) -> Option<Validator> {
        let entries = self.entries.read();
        let Some(overrides) = entries.get(id) else {
            debug!(field = %field.id, class = id, "No validator registered for class");
            return None;
        };
        let found = overrides
            .iter()
            .find(|e| e.selector.matches(field))
            .map(|e| e.validator.clone());
        if found.is_none() {
            debug!(field = %field.id, validator = id, "No selector of validator matches field");
        }
        found
    }

    /// Resolves the full chain for `field`, in class order.
    #[must_use]
    pub fn resolve(&self, field: &FieldElement) -> Vec<Validator> {
        field
            .classes
            .iter()
            .filter_map(|class| self.resolve_one(field, class))
            .collect()
    }

    /// Returns true if `id` has at least one override.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.read().contains_key(id)
    }

    /// Registered ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Counter bumped by every change; caches compare against it.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Removes everything.
    pub fn clear(&self) {
        self.entries.write().clear();
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::Check;
    use pretty_assertions::assert_eq;

    fn ids(validators: &[Validator]) -> Vec<&str> {
        validators.iter().map(Validator::id).collect()
    }

    fn answer(v: &Validator, field: &FieldElement, value: &str) -> bool {
        match v.check(&field.clone().into_ref(), value) {
            Check::Ready(Ok(ok)) => ok,
            other => panic!("unexpected answer {other:?}"),
        }
    }

    #[test]
    fn test_registry_creation() {
        let registry = ValidatorRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.generation(), 0);
    }

    #[test]
    fn test_builtins() {
        let registry = ValidatorRegistry::with_builtins().unwrap();
        assert_eq!(registry.ids(), vec!["email", "mandatory", "numeric"]);

        let field = FieldElement::input("mail").with_class_attr("mandatory email");
        assert_eq!(ids(&registry.resolve(&field)), vec!["mandatory", "email"]);
    }

    #[test]
    fn test_resolve_follows_class_order_and_skips_gaps() {
        let registry = ValidatorRegistry::with_builtins().unwrap();
        let field = FieldElement::input("x").with_class_attr("wide email unknown mandatory");
        assert_eq!(ids(&registry.resolve(&field)), vec!["email", "mandatory"]);
    }

    #[test]
    fn test_unmatched_selector_is_skipped() {
        let registry = ValidatorRegistry::with_builtins().unwrap();
        let field = FieldElement::new("notes", "textarea").with_class("mandatory");
        assert!(registry.resolve(&field).is_empty());
        assert!(registry.resolve_one(&field, "mandatory").is_none());
    }

    #[test]
    fn test_first_matching_override_wins() {
        let registry = ValidatorRegistry::new();
        registry
            .add_validator("size", "textarea.size", Predicate::simple(|v: &str| v.len() <= 100))
            .unwrap();
        registry
            .add_validator("size", "input.size", Predicate::simple(|v: &str| v.len() <= 3))
            .unwrap();
        registry
            .add_validator("size", "*.size", Predicate::simple(|_: &str| false))
            .unwrap();

        let input = FieldElement::input("a").with_class("size");
        let area = FieldElement::new("b", "textarea").with_class("size");
        let select = FieldElement::new("c", "select").with_class("size");

        let v = registry.resolve_one(&input, "size").unwrap();
        assert!(answer(&v, &input, "abc"));
        assert!(!answer(&v, &input, "abcd"));

        let v = registry.resolve_one(&area, "size").unwrap();
        assert!(answer(&v, &area, "abcd"));

        let v = registry.resolve_one(&select, "size").unwrap();
        assert!(!answer(&v, &select, ""));
    }

    #[test]
    fn test_same_selector_replaces_in_place() {
        let registry = ValidatorRegistry::new();
        registry.add_validator("x", "input.x", Predicate::simple(|_: &str| false)).unwrap();
        registry.add_validator("x", "*.x", Predicate::simple(|_: &str| false)).unwrap();
        registry.add_validator("x", "input.x", Predicate::simple(|_: &str| true)).unwrap();

        let field = FieldElement::input("f").with_class("x");
        let v = registry.resolve_one(&field, "x").unwrap();
        assert!(answer(&v, &field, ""));
        assert_eq!(registry.generation(), 3);
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let registry = ValidatorRegistry::new();
        let result = registry.add_validator("x", "input..x", Predicate::simple(|_: &str| true));
        assert!(result.is_err());
        assert!(!registry.contains("x"));
        assert_eq!(registry.generation(), 0);
    }

    #[test]
    fn test_remove_and_clear() {
        let registry = ValidatorRegistry::with_builtins().unwrap();
        let before = registry.generation();
        assert!(registry.remove("email"));
        assert!(!registry.remove("email"));
        assert_eq!(registry.generation(), before + 1);

        registry.clear();
        assert!(registry.is_empty());
    }
}
