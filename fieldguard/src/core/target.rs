//! The unit of work handed to the engine.

use super::FieldRef;
use crate::validators::Validator;
use std::sync::Arc;

/// A field, its current value and its resolved validator list.
///
/// Validators run in list order. An empty list passes.
#[derive(Debug, Clone)]
pub struct ValidationTarget {
    /// The field being validated; opaque to the engine.
    pub field: FieldRef,
    /// The value to validate.
    pub value: String,
    /// Resolved validators, in execution order.
    pub validators: Arc<[Validator]>,
}

impl ValidationTarget {
    /// Creates a new validation target.
    #[must_use]
    pub fn new(
        field: FieldRef,
        value: impl Into<String>,
        validators: impl Into<Arc<[Validator]>>,
    ) -> Self {
        Self {
            field,
            value: value.into(),
            validators: validators.into(),
        }
    }

    /// Number of validators in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Returns true when the chain has no validators.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}
