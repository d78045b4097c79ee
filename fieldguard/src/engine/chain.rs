//! Cursor over a validator list.
//!
//! The chain runs ready answers inline and hands pending ones back to the
//! caller, so a run only needs an executor once a predicate actually
//! suspends.

use crate::core::{FailureCause, ValidationTarget};
use crate::outcome::Settlement;
use crate::validators::{Check, CheckFuture};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tracing::{debug, warn};

/// What the chain needs next.
pub(crate) enum Step {
    /// The run is over.
    Settled(Settlement),
    /// The validator at the cursor answered asynchronously.
    Suspended(CheckFuture),
}

pub(crate) struct Chain {
    target: ValidationTarget,
    cursor: usize,
}

impl Chain {
    pub(crate) fn new(target: ValidationTarget) -> Self {
        Self { target, cursor: 0 }
    }

    /// Runs validators from the cursor while their answers are ready.
    pub(crate) fn advance(&mut self) -> Step {
        loop {
            let Some(validator) = self.target.validators.get(self.cursor) else {
                return Step::Settled(Settlement::Passed {
                    field: self.target.field.clone(),
                });
            };
            debug!(validator = validator.id(), index = self.cursor, "Running validator");

            let field = &self.target.field;
            let value = self.target.value.as_str();
            let check =
                std::panic::catch_unwind(AssertUnwindSafe(|| validator.check(field, value)));

            let verdict = match check {
                Ok(Check::Ready(answer)) => interpret(answer),
                Ok(Check::Pending(fut)) => return Step::Suspended(fut),
                Err(_) => Err(FailureCause::Panicked),
            };
            if let Some(settlement) = self.complete(verdict) {
                return Step::Settled(settlement);
            }
        }
    }

    /// Applies the verdict of the validator at the cursor.
    ///
    /// Returns the settlement when the verdict ends the run.
    pub(crate) fn complete(&mut self, verdict: Result<(), FailureCause>) -> Option<Settlement> {
        match verdict {
            Ok(()) => {
                self.cursor += 1;
                None
            }
            Err(cause) => Some(self.fail(cause)),
        }
    }

    /// Settles as failed at the cursor.
    pub(crate) fn fail(&self, cause: FailureCause) -> Settlement {
        let validator = self.target.validators.get(self.cursor);
        let validator_id = validator.map(|v| v.id().to_string()).unwrap_or_default();
        let message = validator.and_then(|v| v.message().map(String::from));
        match &cause {
            FailureCause::Rejected => {
                debug!(validator = %validator_id, index = self.cursor, "Validator rejected value");
            }
            other => {
                warn!(
                    validator = %validator_id,
                    index = self.cursor,
                    cause = %other,
                    "Validator failed"
                );
            }
        }
        Settlement::Failed {
            field: self.target.field.clone(),
            validator_id,
            index: self.cursor,
            cause,
            message,
        }
    }

    /// Awaits `pending`, then keeps stepping until the run settles.
    pub(crate) async fn drive(
        mut self,
        mut pending: CheckFuture,
        timeout: Option<Duration>,
    ) -> Settlement {
        loop {
            let verdict = await_check(pending, timeout).await;
            if let Some(settlement) = self.complete(verdict) {
                return settlement;
            }
            match self.advance() {
                Step::Settled(settlement) => return settlement,
                Step::Suspended(next) => pending = next,
            }
        }
    }
}

/// Only an explicit `true` lets the chain move on.
fn interpret(answer: anyhow::Result<bool>) -> Result<(), FailureCause> {
    match answer {
        Ok(true) => Ok(()),
        Ok(false) => Err(FailureCause::Rejected),
        Err(e) => Err(FailureCause::Errored(format!("{e:#}"))),
    }
}

async fn await_check(pending: CheckFuture, timeout: Option<Duration>) -> Result<(), FailureCause> {
    let guarded = AssertUnwindSafe(pending).catch_unwind();
    let answer = match timeout {
        Some(limit) => match tokio::time::timeout(limit, guarded).await {
            Ok(answer) => answer,
            Err(_) => return Err(FailureCause::TimedOut),
        },
        None => guarded.await,
    };
    match answer {
        Ok(answer) => interpret(answer),
        Err(_) => Err(FailureCause::Panicked),
    }
}
