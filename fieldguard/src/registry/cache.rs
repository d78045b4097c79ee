//! Resolved validator chains, cached per field id.

use super::ValidatorRegistry;
use crate::core::{FieldElement, TargetId};
use crate::validators::Validator;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
struct CachedChain {
    generation: u64,
    validators: Arc<[Validator]>,
}

/// Cache of resolved chains keyed by [`TargetId`].
///
/// Entries are stamped with the registry generation they were resolved
/// against and re-resolved once the registry changes. A field whose classes
/// or type change under the same id must be invalidated by the caller.
#[derive(Debug, Default)]
pub struct TargetCache {
    entries: DashMap<TargetId, CachedChain>,
}

impl TargetCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached chain for `field`, resolving it if missing or stale.
    pub fn get_or_resolve(
        &self,
        field: &FieldElement,
        registry: &ValidatorRegistry,
    ) -> Arc<[Validator]> {
        let generation = registry.generation();
        if let Some(cached) = self.entries.get(&field.id) {
            if cached.generation == generation {
                return Arc::clone(&cached.validators);
            }
        }

        let validators: Arc<[Validator]> = registry.resolve(field).into();
        debug!(
            field = %field.id,
            validators = validators.len(),
            generation,
            "Resolved validator chain"
        );
        self.entries.insert(
            field.id.clone(),
            CachedChain {
                generation,
                validators: Arc::clone(&validators),
            },
        );
        validators
    }

    /// Returns the cached chain for `id` without resolving.
    #[must_use]
    pub fn get(&self, id: &TargetId) -> Option<Arc<[Validator]>> {
        self.entries.get(id).map(|c| Arc::clone(&c.validators))
    }

    /// Drops the entry for `id`. Returns true if one existed.
    pub fn invalidate(&self, id: &TargetId) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of cached chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
