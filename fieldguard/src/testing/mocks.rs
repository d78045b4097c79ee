//! Mock validators for testing.
//!
//! Every mock counts its predicate calls so tests can check that the chain
//! stopped where it should.

use crate::validators::{Predicate, Validator};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// A synchronous validator with a fixed answer.
#[derive(Debug, Clone)]
pub struct CountingValidator {
    id: String,
    answer: bool,
    calls: Arc<AtomicUsize>,
}

impl CountingValidator {
    /// Creates a validator that always answers `answer`.
    #[must_use]
    pub fn new(id: impl Into<String>, answer: bool) -> Self {
        Self {
            id: id.into(),
            answer,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a validator that always passes.
    #[must_use]
    pub fn passing(id: impl Into<String>) -> Self {
        Self::new(id, true)
    }

    /// Creates a validator that always fails.
    #[must_use]
    pub fn failing(id: impl Into<String>) -> Self {
        Self::new(id, false)
    }

    /// Number of predicate calls so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Builds the validator; all copies share the call counter.
    #[must_use]
    pub fn validator(&self) -> Validator {
        let calls = Arc::clone(&self.calls);
        let answer = self.answer;
        Validator::simple(self.id.clone(), move |_: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            answer
        })
    }
}

/// An asynchronous validator that answers after a delay.
#[derive(Debug, Clone)]
pub struct DelayedValidator {
    id: String,
    delay: Duration,
    answer: bool,
    calls: Arc<AtomicUsize>,
}

impl DelayedValidator {
    /// Creates a delayed validator.
    #[must_use]
    pub fn new(id: impl Into<String>, delay: Duration, answer: bool) -> Self {
        Self {
            id: id.into(),
            delay,
            answer,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a delayed validator with the delay in milliseconds.
    #[must_use]
    pub fn with_delay_ms(id: impl Into<String>, ms: u64, answer: bool) -> Self {
        Self::new(id, Duration::from_millis(ms), answer)
    }

    /// Number of predicate calls so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Builds the validator.
    #[must_use]
    pub fn validator(&self) -> Validator {
        let calls = Arc::clone(&self.calls);
        let delay = self.delay;
        let answer = self.answer;
        Validator::new(
            self.id.clone(),
            Predicate::simple_async(move |_value| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    tokio::time::sleep(delay).await;
                    Ok(answer)
                }
            }),
        )
    }
}

/// An asynchronous validator that answers when the test opens its gate.
#[derive(Debug, Clone)]
pub struct GatedValidator {
    id: String,
    gate: Arc<Notify>,
    answer: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl GatedValidator {
    /// Creates a closed gate.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            gate: Arc::new(Notify::new()),
            answer: Arc::new(AtomicBool::new(false)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Opens the gate; the pending predicate answers `answer`.
    pub fn open(&self, answer: bool) {
        self.answer.store(answer, Ordering::SeqCst);
        self.gate.notify_one();
    }

    /// Number of predicate calls so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Builds the validator.
    #[must_use]
    pub fn validator(&self) -> Validator {
        let gate = Arc::clone(&self.gate);
        let answer = Arc::clone(&self.answer);
        let calls = Arc::clone(&self.calls);
        Validator::new(
            self.id.clone(),
            Predicate::simple_async(move |_value| {
                calls.fetch_add(1, Ordering::SeqCst);
                let gate = Arc::clone(&gate);
                let answer = Arc::clone(&answer);
                async move {
                    gate.notified().await;
                    Ok(answer.load(Ordering::SeqCst))
                }
            }),
        )
    }
}

/// Records the order in which validators were called.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a synchronous validator that logs its id and answers `answer`.
    #[must_use]
    pub fn validator(&self, id: &str, answer: bool) -> Validator {
        let calls = Arc::clone(&self.calls);
        let name = id.to_string();
        Validator::simple(id, move |_: &str| {
            calls.lock().push(name.clone());
            answer
        })
    }

    /// Ids in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}
