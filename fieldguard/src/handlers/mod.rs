//! Handlers react to settled outcomes.
//!
//! A [`Handler`] is given every outcome the form layer produces and
//! subscribes to it through the outcome's public API. Handlers never
//! influence the result.

mod feedback;

pub use feedback::{FeedbackDisplay, FeedbackHandler, InMemoryDisplay};

use crate::core::TargetId;
use crate::outcome::{Outcome, Settlement};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, Level};

/// Trait for outcome handlers.
pub trait Handler: Send + Sync {
    /// Returns the handler's name, for logs.
    fn name(&self) -> &str {
        "handler"
    }

    /// Subscribes to `outcome`.
    ///
    /// Called once per run, before or after settlement.
    fn attach(&self, outcome: &Outcome);
}

/// Ordered set of handlers.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<Vec<Arc<dyn Handler>>>,
}

impl HandlerRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler.
    pub fn add(&self, handler: Arc<dyn Handler>) {
        debug!(handler = handler.name(), "Registering handler");
        self.handlers.write().push(handler);
    }

    /// Attaches every handler to `outcome`, in registration order.
    pub fn notify(&self, outcome: &Outcome) {
        let handlers = self.handlers.read().clone();
        for handler in handlers {
            handler.attach(outcome);
        }
    }

    /// Number of handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    /// Returns true if no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    /// Removes every handler.
    pub fn clear(&self) {
        self.handlers.write().clear();
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .handlers
            .read()
            .iter()
            .map(|h| h.name().to_string())
            .collect();
        f.debug_struct("HandlerRegistry").field("handlers", &names).finish()
    }
}

/// A handler that ignores every outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpHandler;

impl Handler for NoOpHandler {
    fn name(&self) -> &str {
        "noop"
    }

    fn attach(&self, _outcome: &Outcome) {}
}

/// A handler that logs settlements using the tracing framework.
#[derive(Debug, Clone)]
pub struct LoggingHandler {
    level: Level,
}

impl Default for LoggingHandler {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingHandler {
    /// Creates a logging handler with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging handler.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Creates an info-level logging handler.
    #[must_use]
    pub fn info() -> Self {
        Self::new(Level::INFO)
    }
}

fn log_settlement(level: Level, run_id: uuid::Uuid, settlement: &Settlement) {
    let field = &settlement.field().id;
    let status = settlement.status();
    let validator = settlement.failed_validator();
    if level == Level::DEBUG {
        debug!(%run_id, %field, %status, ?validator, "Validation {}", status);
    } else {
        info!(%run_id, %field, %status, ?validator, "Validation {}", status);
    }
}

impl Handler for LoggingHandler {
    fn name(&self) -> &str {
        "logging"
    }

    fn attach(&self, outcome: &Outcome) {
        let level = self.level;
        let run_id = outcome.run_id();
        outcome.on_settled(move |settlement| log_settlement(level, run_id, settlement));
    }
}

/// A collecting handler for testing purposes.
#[derive(Debug, Clone, Default)]
pub struct CollectingHandler {
    settlements: Arc<RwLock<Vec<Settlement>>>,
}

impl CollectingHandler {
    /// Creates a new collecting handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected settlements, in settlement order.
    #[must_use]
    pub fn settlements(&self) -> Vec<Settlement> {
        self.settlements.read().clone()
    }

    /// Returns the number of collected settlements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.settlements.read().len()
    }

    /// Returns true if nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.settlements.read().is_empty()
    }

    /// Returns the settlements for one field.
    #[must_use]
    pub fn settlements_for(&self, id: &TargetId) -> Vec<Settlement> {
        self.settlements
            .read()
            .iter()
            .filter(|s| &s.field().id == id)
            .cloned()
            .collect()
    }

    /// Clears all collected settlements.
    pub fn clear(&self) {
        self.settlements.write().clear();
    }
}

impl Handler for CollectingHandler {
    fn name(&self) -> &str {
        "collecting"
    }

    fn attach(&self, outcome: &Outcome) {
        let settlements = Arc::clone(&self.settlements);
        outcome.on_settled(move |settlement| settlements.write().push(settlement.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FieldElement, ValidationTarget};
    use crate::engine::ValidationEngine;
    use crate::validators::Validator;

    fn outcome(id: &str, pass: bool) -> Outcome {
        ValidationEngine::default().validate(ValidationTarget::new(
            FieldElement::input(id).into_ref(),
            "v",
            vec![Validator::simple("check", move |_: &str| pass)],
        ))
    }

    #[test]
    fn test_registry_notifies_in_order() {
        struct Recording {
            name: String,
            log: Arc<RwLock<Vec<String>>>,
        }

        impl Handler for Recording {
            fn name(&self) -> &str {
                &self.name
            }

            fn attach(&self, _outcome: &Outcome) {
                self.log.write().push(self.name.clone());
            }
        }

        let log = Arc::new(RwLock::new(Vec::new()));
        let registry = HandlerRegistry::new();
        for name in ["tooltip", "audit"] {
            registry.add(Arc::new(Recording {
                name: name.to_string(),
                log: log.clone(),
            }));
        }

        registry.notify(&outcome("a", true));
        assert_eq!(*log.read(), vec!["tooltip", "audit"]);
        assert_eq!(registry.len(), 2);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_noop_and_logging_handlers() {
        let o = outcome("a", false);
        NoOpHandler.attach(&o);
        LoggingHandler::default().attach(&o);
        LoggingHandler::debug().attach(&o);
        // Should not panic
    }

    #[test]
    fn test_collecting_handler() {
        let collector = CollectingHandler::new();
        assert!(collector.is_empty());

        collector.attach(&outcome("a", true));
        collector.attach(&outcome("b", false));
        collector.attach(&outcome("a", false));

        assert_eq!(collector.len(), 3);
        let for_a = collector.settlements_for(&TargetId::new("a"));
        assert_eq!(for_a.len(), 2);
        assert!(for_a[0].is_passed());
        assert_eq!(for_a[1].failed_validator(), Some("check"));

        collector.clear();
        assert!(collector.is_empty());
    }
}
