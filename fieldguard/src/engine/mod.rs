//! The validation-chain engine.
//!
//! [`ValidationEngine::validate`] runs a target's validators in order and
//! returns an [`Outcome`]. Synchronous answers are handled inline, so a chain
//! without asynchronous predicates is settled by the time `validate`
//! returns. The first pending answer moves the rest of the chain onto a
//! tokio task that resumes at the same validator.
//!
//! The first validator to answer `false`, error, panic or time out settles
//! the run as failed; validators after it are never called.

mod chain;

use crate::core::{FailureCause, ValidationTarget};
use crate::outcome::{Deferred, Outcome, Settlement};
use chain::{Chain, Step};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, Instrument};

/// Engine settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound for each asynchronous validator answer, in milliseconds.
    ///
    /// `None` waits forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_timeout_ms: Option<u64>,
}

impl EngineConfig {
    /// Creates the default configuration (no step timeout).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the step timeout.
    #[must_use]
    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Gets the step timeout as a Duration.
    #[must_use]
    pub fn step_timeout(&self) -> Option<Duration> {
        self.step_timeout_ms.map(Duration::from_millis)
    }
}

/// Runs validator chains.
///
/// The engine holds no per-run state; one engine can validate any number of
/// targets, concurrently or not.
#[derive(Debug, Clone, Default)]
pub struct ValidationEngine {
    config: EngineConfig,
}

impl ValidationEngine {
    /// Creates an engine.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Starts a validation run and returns its outcome.
    ///
    /// Never fails and never panics on behalf of a predicate. If a predicate
    /// suspends and no tokio runtime is available, that validator fails with
    /// [`FailureCause::NoRuntime`].
    pub fn validate(&self, target: ValidationTarget) -> Outcome {
        let deferred = Deferred::new(target.field.clone());
        let outcome = deferred.outcome();
        let span = tracing::debug_span!(
            "validation",
            run_id = %outcome.run_id(),
            field = %target.field.id,
            validators = target.len(),
        );
        let _entered = span.enter();

        let mut chain = Chain::new(target);
        match chain.advance() {
            Step::Settled(settlement) => settle(deferred, settlement),
            Step::Suspended(pending) => match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let timeout = self.config.step_timeout();
                    let task = handle.spawn(
                        async move {
                            let settlement = chain.drive(pending, timeout).await;
                            settle(deferred, settlement);
                        }
                        .instrument(span.clone()),
                    );
                    outcome.attach_task(task.abort_handle());
                }
                Err(e) => {
                    error!(error = %e, "Asynchronous validator outside a tokio runtime");
                    drop(pending);
                    settle(deferred, chain.fail(FailureCause::NoRuntime));
                }
            },
        }
        outcome
    }

    /// Runs a chain to completion on the current task.
    ///
    /// Same semantics as [`validate`](Self::validate) without the outcome
    /// object or a spawned task.
    pub async fn run(&self, target: ValidationTarget) -> Settlement {
        let span = tracing::debug_span!(
            "validation",
            field = %target.field.id,
            validators = target.len(),
        );
        let mut chain = Chain::new(target);
        match chain.advance() {
            Step::Settled(settlement) => settlement,
            Step::Suspended(pending) => {
                chain
                    .drive(pending, self.config.step_timeout())
                    .instrument(span)
                    .await
            }
        }
    }
}

fn settle(deferred: Deferred, settlement: Settlement) {
    debug!(
        status = %settlement.status(),
        validator = ?settlement.failed_validator(),
        "Validation settled"
    );
    deferred.settle(settlement);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_timeout_roundtrip() {
        let config = EngineConfig::new().with_step_timeout(Duration::from_millis(250));
        assert_eq!(config.step_timeout_ms, Some(250));
        assert_eq!(config.step_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(EngineConfig::default().step_timeout(), None);
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
