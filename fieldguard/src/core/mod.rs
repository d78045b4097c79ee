//! Core types: form fields, validation targets and outcome status.

mod field;
mod status;
mod target;

pub use field::{FieldElement, FieldRef, TargetId};
pub use status::{FailureCause, OutcomeStatus};
pub use target::ValidationTarget;
