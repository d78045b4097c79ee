//! Feedback handler: shows a message next to a failed field and hides it
//! again once the field passes.

use super::Handler;
use crate::core::{FieldRef, TargetId};
use crate::messages::MessageTable;
use crate::outcome::{Outcome, Settlement};
use dashmap::DashMap;
use std::sync::Arc;

/// Where feedback is rendered (a tooltip, a status line, ...).
#[cfg_attr(test, mockall::automock)]
pub trait FeedbackDisplay: Send + Sync {
    /// Shows `message` for `field`, replacing any current message.
    fn show(&self, field: &FieldRef, message: &str);

    /// Hides any message for `field`.
    fn hide(&self, field: &FieldRef);
}

/// A display that keeps the visible messages in memory.
#[derive(Debug, Default)]
pub struct InMemoryDisplay {
    visible: DashMap<TargetId, String>,
}

impl InMemoryDisplay {
    /// Creates an empty display.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The message currently shown for `id`.
    #[must_use]
    pub fn message_for(&self, id: &TargetId) -> Option<String> {
        self.visible.get(id).map(|m| m.clone())
    }

    /// Number of fields with a visible message.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }
}

impl FeedbackDisplay for InMemoryDisplay {
    fn show(&self, field: &FieldRef, message: &str) {
        self.visible.insert(field.id.clone(), message.to_string());
    }

    fn hide(&self, field: &FieldRef) {
        self.visible.remove(&field.id);
    }
}

/// Handler that drives a [`FeedbackDisplay`].
pub struct FeedbackHandler<D: FeedbackDisplay + 'static> {
    display: Arc<D>,
    messages: Arc<MessageTable>,
}

impl<D: FeedbackDisplay + 'static> FeedbackHandler<D> {
    /// Creates a handler using the given display and message table.
    pub fn new(display: Arc<D>, messages: MessageTable) -> Self {
        Self {
            display,
            messages: Arc::new(messages),
        }
    }

    /// The display this handler drives.
    pub fn display(&self) -> &Arc<D> {
        &self.display
    }
}

impl<D: FeedbackDisplay + 'static> Handler for FeedbackHandler<D> {
    fn name(&self) -> &str {
        "feedback"
    }

    fn attach(&self, outcome: &Outcome) {
        let display = Arc::clone(&self.display);
        let messages = Arc::clone(&self.messages);
        outcome.on_settled(move |settlement| match settlement {
            Settlement::Passed { field } => display.hide(field),
            Settlement::Failed {
                field,
                validator_id,
                message,
                ..
            } => {
                let text = messages.resolve(validator_id, message.as_deref());
                display.show(field, text);
            }
        });
    }
}
