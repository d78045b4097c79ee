//! Settle-once validation outcomes.
//!
//! An [`Outcome`] is the read-only view of one validation run. It settles
//! exactly once, as passed or failed, and notifies every subscriber once:
//! subscribers registered before settlement are called at settlement, later
//! ones are called immediately. Only the engine holds the [`Deferred`]
//! writer that can settle it.

mod deferred;

pub(crate) use deferred::Deferred;

use crate::core::{FailureCause, FieldRef, OutcomeStatus};
use chrono::{DateTime, Utc};
use futures::channel::oneshot;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::task::AbortHandle;
use tracing::warn;
use uuid::Uuid;

/// Terminal state of a validation run.
#[derive(Debug, Clone)]
pub enum Settlement {
    /// All validators accepted the value.
    Passed {
        /// The validated field.
        field: FieldRef,
    },
    /// A validator rejected the value; later validators were not run.
    Failed {
        /// The validated field.
        field: FieldRef,
        /// Id of the failing validator.
        validator_id: String,
        /// Position of the failing validator in the chain.
        index: usize,
        /// Why the validator failed.
        cause: FailureCause,
        /// The failing validator's own message, if it has one.
        message: Option<String>,
    },
}

impl Settlement {
    /// Returns the field the run was about.
    #[must_use]
    pub fn field(&self) -> &FieldRef {
        match self {
            Self::Passed { field } | Self::Failed { field, .. } => field,
        }
    }

    /// Returns the status this settlement represents.
    #[must_use]
    pub fn status(&self) -> OutcomeStatus {
        match self {
            Self::Passed { .. } => OutcomeStatus::Passed,
            Self::Failed { .. } => OutcomeStatus::Failed,
        }
    }

    /// Returns true for [`Settlement::Passed`].
    #[must_use]
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }

    /// Returns the failing validator id, if any.
    #[must_use]
    pub fn failed_validator(&self) -> Option<&str> {
        match self {
            Self::Passed { .. } => None,
            Self::Failed { validator_id, .. } => Some(validator_id),
        }
    }

    /// Returns the failing validator's own message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Passed { .. } => None,
            Self::Failed { message, .. } => message.as_deref(),
        }
    }

    /// Returns the failure cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&FailureCause> {
        match self {
            Self::Passed { .. } => None,
            Self::Failed { cause, .. } => Some(cause),
        }
    }
}

type Callback = Box<dyn FnOnce(&Settlement) + Send>;

#[derive(Default)]
struct State {
    settlement: Option<Settlement>,
    settled_at: Option<DateTime<Utc>>,
    abandoned: bool,
    // Set while the writer drains `callbacks`; late subscribers queue behind it.
    notifying: bool,
    callbacks: Vec<Callback>,
}

struct Inner {
    run_id: Uuid,
    field: FieldRef,
    state: Mutex<State>,
    task: Mutex<Option<AbortHandle>>,
}

fn invoke(callback: Callback, settlement: &Settlement) {
    if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        callback(settlement);
    })) {
        warn!(field = %settlement.field().id, "Outcome callback panicked: {:?}", e);
    }
}

/// Read-only view of a validation run.
///
/// Cloning is cheap; every clone observes the same run.
#[derive(Clone)]
pub struct Outcome {
    inner: Arc<Inner>,
}

impl Outcome {
    fn new(field: FieldRef) -> Self {
        Self {
            inner: Arc::new(Inner {
                run_id: Uuid::new_v4(),
                field,
                state: Mutex::new(State::default()),
                task: Mutex::new(None),
            }),
        }
    }

    /// Unique id of this run.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.inner.run_id
    }

    /// The field being validated.
    #[must_use]
    pub fn field(&self) -> &FieldRef {
        &self.inner.field
    }

    /// Registers a callback for any settlement.
    ///
    /// Called once: immediately if already settled, otherwise at settlement.
    /// While earlier callbacks are still running, the callback waits its
    /// turn. Never called if the run is abandoned.
    pub fn on_settled<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(&Settlement) + Send + 'static,
    {
        let mut state = self.inner.state.lock();
        if state.abandoned {
            return self;
        }
        match state.settlement.clone() {
            Some(settlement) if !state.notifying => {
                drop(state);
                invoke(Box::new(callback), &settlement);
            }
            _ => state.callbacks.push(Box::new(callback)),
        }
        self
    }

    /// Registers a callback for a passed settlement.
    pub fn on_success<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(&FieldRef) + Send + 'static,
    {
        self.on_settled(move |settlement| {
            if let Settlement::Passed { field } = settlement {
                callback(field);
            }
        })
    }

    /// Registers a callback for a failed settlement.
    ///
    /// The callback receives the field and the failing validator id.
    pub fn on_failure<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(&FieldRef, &str) + Send + 'static,
    {
        self.on_settled(move |settlement| {
            if let Settlement::Failed {
                field, validator_id, ..
            } = settlement
            {
                callback(field, validator_id);
            }
        })
    }

    /// Waits for the settlement.
    ///
    /// Returns `None` if the run was abandoned (cancelled, or its task was
    /// dropped) before settling.
    pub async fn wait(&self) -> Option<Settlement> {
        let (tx, rx) = oneshot::channel();
        self.on_settled(move |settlement| {
            let _ = tx.send(settlement.clone());
        });
        rx.await.ok()
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> OutcomeStatus {
        self.inner
            .state
            .lock()
            .settlement
            .as_ref()
            .map_or(OutcomeStatus::Pending, Settlement::status)
    }

    /// The settlement, once available.
    #[must_use]
    pub fn settlement(&self) -> Option<Settlement> {
        self.inner.state.lock().settlement.clone()
    }

    /// When the run settled.
    #[must_use]
    pub fn settled_at(&self) -> Option<DateTime<Utc>> {
        self.inner.state.lock().settled_at
    }

    /// Returns true once settled either way.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.status().is_terminal()
    }

    /// Returns true if settled as passed.
    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.status() == OutcomeStatus::Passed
    }

    /// Returns true if settled as failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status() == OutcomeStatus::Failed
    }

    /// Returns true if the run stopped without settling.
    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.inner.state.lock().abandoned
    }

    /// Aborts the background part of the run, if one is still going.
    ///
    /// A cancelled run never settles. Returns true if a task was aborted.
    pub fn cancel(&self) -> bool {
        if self.is_settled() {
            return false;
        }
        match self.inner.task.lock().take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub(crate) fn attach_task(&self, handle: AbortHandle) {
        *self.inner.task.lock() = Some(handle);
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("run_id", &self.run_id())
            .field("field", &self.field().id)
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FieldElement;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn deferred() -> Deferred {
        Deferred::new(FieldElement::input("zip").into_ref())
    }

    fn failed(deferred: &Deferred, id: &str) -> Settlement {
        Settlement::Failed {
            field: deferred.outcome().field().clone(),
            validator_id: id.to_string(),
            index: 0,
            cause: FailureCause::Rejected,
            message: None,
        }
    }

    #[test]
    fn test_pending_by_default() {
        let d = deferred();
        let outcome = d.outcome();
        assert_eq!(outcome.status(), OutcomeStatus::Pending);
        assert!(!outcome.is_settled());
        assert!(outcome.settled_at().is_none());
    }

    #[test]
    fn test_callbacks_before_settlement_fire_once() {
        let d = deferred();
        let outcome = d.outcome();
        let passes = Arc::new(AtomicUsize::new(0));
        let fails = Arc::new(AtomicUsize::new(0));

        let p = passes.clone();
        let f = fails.clone();
        outcome
            .on_success(move |_| {
                p.fetch_add(1, Ordering::SeqCst);
            })
            .on_failure(move |_, _| {
                f.fetch_add(1, Ordering::SeqCst);
            });
        assert_eq!(passes.load(Ordering::SeqCst), 0);

        let s = failed(&d, "numeric");
        d.settle(s);

        assert_eq!(passes.load(Ordering::SeqCst), 0);
        assert_eq!(fails.load(Ordering::SeqCst), 1);
        assert!(outcome.is_failed());
        assert!(outcome.settled_at().is_some());
    }

    #[test]
    fn test_late_subscription_fires_immediately() {
        let d = deferred();
        let outcome = d.outcome();
        let s = failed(&d, "email");
        d.settle(s);

        let seen = Arc::new(Mutex::new(None));
        let seen_clone = seen.clone();
        outcome.on_failure(move |field, id| {
            *seen_clone.lock() = Some((field.id.to_string(), id.to_string()));
        });
        outcome.on_success(|_| panic!("must not be called"));

        assert_eq!(
            *seen.lock(),
            Some(("zip".to_string(), "email".to_string()))
        );
    }

    #[test]
    fn test_callbacks_run_in_registration_order() {
        let d = deferred();
        let outcome = d.outcome();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let order = order.clone();
            if i % 2 == 0 {
                outcome.on_success(move |_| order.lock().push(i));
            } else {
                outcome.on_settled(move |_| order.lock().push(i));
            }
        }
        let field = outcome.field().clone();
        d.settle(Settlement::Passed { field });

        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_panicking_callback_is_suppressed() {
        let d = deferred();
        let outcome = d.outcome();
        let after = Arc::new(AtomicUsize::new(0));
        let after_clone = after.clone();

        outcome.on_success(|_| panic!("Intentional panic"));
        outcome.on_success(move |_| {
            after_clone.fetch_add(1, Ordering::SeqCst);
        });
        let field = outcome.field().clone();
        d.settle(Settlement::Passed { field });

        assert!(outcome.is_passed());
        assert_eq!(after.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_wait_returns_settlement() {
        let d = deferred();
        let outcome = d.outcome();
        let waiter = tokio::spawn({
            let outcome = outcome.clone();
            async move { outcome.wait().await }
        });
        let s = failed(&d, "mandatory");
        d.settle(s);

        let settlement = waiter.await.unwrap().unwrap();
        assert_eq!(settlement.failed_validator(), Some("mandatory"));
        assert_eq!(settlement.cause(), Some(&FailureCause::Rejected));
    }

    #[tokio::test]
    async fn test_dropped_deferred_abandons() {
        let d = deferred();
        let outcome = d.outcome();
        let called = Arc::new(AtomicUsize::new(0));
        let called_clone = called.clone();
        outcome.on_settled(move |_| {
            called_clone.fetch_add(1, Ordering::SeqCst);
        });

        drop(d);

        assert!(outcome.is_abandoned());
        assert!(!outcome.is_settled());
        assert!(outcome.wait().await.is_none());
        assert_eq!(called.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancel_without_task() {
        let d = deferred();
        assert!(!d.outcome().cancel());
    }

    #[test]
    fn test_subscriber_during_settlement_keeps_order() {
        let d = deferred();
        let outcome = d.outcome();
        let order = Arc::new(Mutex::new(Vec::new()));

        let a = order.clone();
        outcome.on_settled(move |_| {
            std::thread::sleep(std::time::Duration::from_millis(150));
            a.lock().push("A");
        });
        let b = order.clone();
        outcome.on_settled(move |_| b.lock().push("B"));

        let field = outcome.field().clone();
        let settler = std::thread::spawn(move || d.settle(Settlement::Passed { field }));

        std::thread::sleep(std::time::Duration::from_millis(40));
        assert!(outcome.is_passed());
        let c = order.clone();
        outcome.on_settled(move |_| c.lock().push("C"));

        settler.join().unwrap();
        assert_eq!(*order.lock(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_subscribing_from_a_callback() {
        let d = deferred();
        let outcome = d.outcome();
        let order = Arc::new(Mutex::new(Vec::new()));

        let inner_outcome = outcome.clone();
        let first = order.clone();
        outcome.on_settled(move |_| {
            first.lock().push(1);
            let nested = first.clone();
            inner_outcome.on_settled(move |_| nested.lock().push(3));
        });
        let second = order.clone();
        outcome.on_settled(move |_| second.lock().push(2));

        let field = outcome.field().clone();
        d.settle(Settlement::Passed { field });
        assert_eq!(*order.lock(), vec![1, 2, 3]);

        let late = order.clone();
        outcome.on_settled(move |_| late.lock().push(4));
        assert_eq!(*order.lock(), vec![1, 2, 3, 4]);
    }
}
