//! # Fieldguard
//!
//! Ordered, short-circuiting validation of form fields.
//!
//! Each field carries a chain of validators. A run calls them in order and
//! stops at the first one that does not answer `true`. Predicates may answer
//! synchronously or return a future; either way the caller gets an
//! [`Outcome`](outcome::Outcome) that settles exactly once and runs the
//! callbacks registered on it.
//!
//! - **Engine**: runs chains, resuming after asynchronous answers
//! - **Registry**: maps validator ids to selectors and predicates
//! - **Handlers**: react to outcomes, e.g. to show feedback
//! - **Form**: dispatches events and validates whole forms on submit
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fieldguard::prelude::*;
//! use std::sync::Arc;
//!
//! let validator = FormValidator::with_builtins(FieldguardConfig::default())?;
//! let mut form = Form::new(Arc::new(validator));
//! form.insert(FieldElement::input("mail").with_class_attr("mandatory email"), "");
//!
//! form.validate_field(&TargetId::new("mail"))?
//!     .on_failure(|s| println!("{} failed", s.field().id));
//!
//! let valid = form.submit().await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod engine;
pub mod errors;
pub mod form;
pub mod handlers;
pub mod messages;
pub mod observability;
pub mod outcome;
pub mod registry;
pub mod testing;
pub mod validators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{FieldguardConfig, TriggerRule};
    pub use crate::core::{
        FailureCause, FieldElement, FieldRef, OutcomeStatus, TargetId, ValidationTarget,
    };
    pub use crate::engine::{EngineConfig, ValidationEngine};
    pub use crate::errors::{FieldguardError, InvalidSelectorError};
    pub use crate::form::{Form, FormValidator, SubmitReport};
    pub use crate::handlers::{
        CollectingHandler, FeedbackDisplay, FeedbackHandler, Handler, HandlerRegistry,
        InMemoryDisplay, LoggingHandler, NoOpHandler,
    };
    pub use crate::messages::MessageTable;
    pub use crate::observability::{init_tracing, LogFormat};
    pub use crate::outcome::{Outcome, Settlement};
    pub use crate::registry::{Selector, TargetCache, ValidatorRegistry};
    pub use crate::validators::{builtin, Check, Predicate, RemoteCheck, Validator};
}
