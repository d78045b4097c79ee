//! Form-level glue: resolving chains, dispatching events and submitting.
//!
//! [`FormValidator`] owns the engine, the validator registry, the chain cache
//! and the handlers. [`Form`] holds the fields and their current values and
//! decides when to validate.

mod submit;

pub use submit::SubmitReport;

use crate::config::FieldguardConfig;
use crate::core::{FieldElement, FieldRef, TargetId, ValidationTarget};
use crate::engine::ValidationEngine;
use crate::errors::{FieldguardError, Result};
use crate::handlers::{FeedbackDisplay, FeedbackHandler, Handler, HandlerRegistry};
use crate::outcome::Outcome;
use crate::registry::{TargetCache, ValidatorRegistry};
use crate::validators::{Predicate, Validator};
use std::sync::Arc;
use tracing::debug;

/// Validates fields against a registry and notifies handlers.
#[derive(Debug)]
pub struct FormValidator {
    engine: ValidationEngine,
    registry: Arc<ValidatorRegistry>,
    cache: TargetCache,
    handlers: HandlerRegistry,
    config: FieldguardConfig,
}

impl FormValidator {
    /// Creates a validator with an empty registry.
    #[must_use]
    pub fn new(config: FieldguardConfig) -> Self {
        Self::with_registry(config, Arc::new(ValidatorRegistry::new()))
    }

    /// Creates a validator whose registry holds the stock validators.
    pub fn with_builtins(config: FieldguardConfig) -> Result<Self> {
        Ok(Self::with_registry(
            config,
            Arc::new(ValidatorRegistry::with_builtins()?),
        ))
    }

    /// Creates a validator over a shared registry.
    #[must_use]
    pub fn with_registry(config: FieldguardConfig, registry: Arc<ValidatorRegistry>) -> Self {
        Self {
            engine: ValidationEngine::new(config.engine.clone()),
            registry,
            cache: TargetCache::new(),
            handlers: HandlerRegistry::new(),
            config,
        }
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &FieldguardConfig {
        &self.config
    }

    /// The validator registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ValidatorRegistry> {
        &self.registry
    }

    /// The resolved-chain cache.
    #[must_use]
    pub fn cache(&self) -> &TargetCache {
        &self.cache
    }

    /// Registers a predicate under `id` for fields matching `selector`.
    pub fn add_validator(&self, id: &str, selector: &str, predicate: Predicate) -> Result<()> {
        self.registry.add_validator(id, selector, predicate)
    }

    /// Registers a full validator descriptor.
    pub fn add(&self, selector: &str, validator: Validator) -> Result<()> {
        self.registry.add(selector, validator)
    }

    /// Appends a handler; it sees every later outcome.
    pub fn add_handler(&self, handler: Arc<dyn Handler>) {
        self.handlers.add(handler);
    }

    /// Builds a feedback handler for `display` using the configured messages.
    #[must_use]
    pub fn feedback_handler<D>(&self, display: Arc<D>) -> FeedbackHandler<D>
    where
        D: FeedbackDisplay + 'static,
    {
        FeedbackHandler::new(display, self.config.messages.clone())
    }

    /// Adds a feedback handler for `display` using the configured messages.
    pub fn add_feedback<D: FeedbackDisplay + 'static>(&self, display: Arc<D>) {
        self.add_handler(Arc::new(self.feedback_handler(display)));
    }

    /// Validates `field` holding `value`.
    ///
    /// Hidden fields pass without running validators when `skip_hidden` is
    /// on. Every outcome is handed to the handlers before it is returned.
    pub fn validate(&self, field: &FieldRef, value: &str) -> Outcome {
        let validators: Arc<[Validator]> = if self.config.skip_hidden && field.hidden {
            debug!(field = %field.id, "Skipping hidden field");
            Arc::from(Vec::new())
        } else {
            self.cache.get_or_resolve(field, &self.registry)
        };

        let outcome = self
            .engine
            .validate(ValidationTarget::new(Arc::clone(field), value, validators));
        self.handlers.notify(&outcome);
        outcome
    }

    /// Events that trigger validation for `field`.
    #[must_use]
    pub fn triggers_for(&self, field: &FieldElement) -> &[String] {
        self.config.triggers_for(field)
    }

    /// Returns true if `event` triggers validation for `field`.
    #[must_use]
    pub fn is_trigger(&self, field: &FieldElement, event: &str) -> bool {
        self.triggers_for(field).iter().any(|e| e == event)
    }
}

#[derive(Debug, Clone)]
struct FieldSlot {
    field: FieldRef,
    value: String,
}

/// A set of fields validated together.
///
/// Fields keep their insertion order; submission validates them in that
/// order.
#[derive(Debug)]
pub struct Form {
    validator: Arc<FormValidator>,
    fields: Vec<FieldSlot>,
}

impl Form {
    /// Creates an empty form.
    #[must_use]
    pub fn new(validator: Arc<FormValidator>) -> Self {
        Self {
            validator,
            fields: Vec::new(),
        }
    }

    /// The validator this form uses.
    #[must_use]
    pub fn validator(&self) -> &Arc<FormValidator> {
        &self.validator
    }

    fn position(&self, id: &TargetId) -> Option<usize> {
        self.fields.iter().position(|slot| &slot.field.id == id)
    }

    fn slot(&self, id: &TargetId) -> Result<&FieldSlot> {
        self.position(id)
            .map(|i| &self.fields[i])
            .ok_or_else(|| FieldguardError::UnknownField(id.to_string()))
    }

    /// Adds a field, or replaces the field with the same id.
    ///
    /// Replacing drops the cached chain for that id.
    pub fn insert(&mut self, field: FieldElement, value: impl Into<String>) -> FieldRef {
        let slot = FieldSlot {
            field: field.into_ref(),
            value: value.into(),
        };
        let field = Arc::clone(&slot.field);
        match self.position(&field.id) {
            Some(i) => {
                self.validator.cache.invalidate(&field.id);
                self.fields[i] = slot;
            }
            None => self.fields.push(slot),
        }
        field
    }

    /// Removes a field. Returns true if it existed.
    pub fn remove(&mut self, id: &TargetId) -> bool {
        match self.position(id) {
            Some(i) => {
                self.fields.remove(i);
                self.validator.cache.invalidate(id);
                true
            }
            None => false,
        }
    }

    /// Updates the current value of a field.
    pub fn set_value(&mut self, id: &TargetId, value: impl Into<String>) -> Result<()> {
        let i = self
            .position(id)
            .ok_or_else(|| FieldguardError::UnknownField(id.to_string()))?;
        self.fields[i].value = value.into();
        Ok(())
    }

    /// The current value of a field.
    #[must_use]
    pub fn value(&self, id: &TargetId) -> Option<&str> {
        self.position(id).map(|i| self.fields[i].value.as_str())
    }

    /// The field with the given id.
    #[must_use]
    pub fn field(&self, id: &TargetId) -> Option<&FieldRef> {
        self.position(id).map(|i| &self.fields[i].field)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the form has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validates one field with its current value.
    pub fn validate_field(&self, id: &TargetId) -> Result<Outcome> {
        let slot = self.slot(id)?;
        Ok(self.validator.validate(&slot.field, &slot.value))
    }

    /// Handles an event on a field.
    ///
    /// Returns the outcome when `event` is a trigger for the field, `None`
    /// otherwise.
    pub fn dispatch(&self, id: &TargetId, event: &str) -> Result<Option<Outcome>> {
        let slot = self.slot(id)?;
        if !self.validator.is_trigger(&slot.field, event) {
            return Ok(None);
        }
        debug!(field = %id, event, "Validation triggered");
        Ok(Some(self.validator.validate(&slot.field, &slot.value)))
    }
}
