//! The writer side of an [`Outcome`].

use super::{invoke, Outcome, Settlement};
use crate::core::FieldRef;
use chrono::Utc;

/// Settles an [`Outcome`] exactly once.
///
/// Settling consumes the writer. Dropping it unsettled marks the run as
/// abandoned and releases every pending callback without calling it.
pub(crate) struct Deferred {
    outcome: Outcome,
    settled: bool,
}

impl Deferred {
    pub(crate) fn new(field: FieldRef) -> Self {
        Self {
            outcome: Outcome::new(field),
            settled: false,
        }
    }

    pub(crate) fn outcome(&self) -> Outcome {
        self.outcome.clone()
    }

    /// Stores the settlement and runs the queued callbacks outside the lock.
    ///
    /// Callbacks registered while the queue is draining are appended to it,
    /// so every subscriber runs in registration order.
    pub(crate) fn settle(mut self, settlement: Settlement) {
        {
            let mut state = self.outcome.inner.state.lock();
            state.settlement = Some(settlement.clone());
            state.settled_at = Some(Utc::now());
            state.notifying = true;
        }
        self.settled = true;
        self.outcome.inner.task.lock().take();

        loop {
            let callbacks = {
                let mut state = self.outcome.inner.state.lock();
                if state.callbacks.is_empty() {
                    state.notifying = false;
                    break;
                }
                std::mem::take(&mut state.callbacks)
            };
            for callback in callbacks {
                invoke(callback, &settlement);
            }
        }
    }
}

impl Drop for Deferred {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let pending = {
            let mut state = self.outcome.inner.state.lock();
            state.abandoned = true;
            std::mem::take(&mut state.callbacks)
        };
        drop(pending);
    }
}
