//! Outcome status and failure cause enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The state of an [`Outcome`](crate::outcome::Outcome).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The chain is still running.
    Pending,
    /// Every validator accepted the value.
    Passed,
    /// A validator rejected the value.
    Failed,
}

impl Default for OutcomeStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl OutcomeStatus {
    /// Returns true for `Passed` and `Failed`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Why a validator step failed.
///
/// Every cause settles the chain the same way; the cause is kept for logs
/// and diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureCause {
    /// The predicate answered `false`.
    Rejected,
    /// The predicate returned an error.
    Errored(String),
    /// The predicate panicked.
    Panicked,
    /// The asynchronous answer did not arrive within the step timeout.
    TimedOut,
    /// The answer was asynchronous but no runtime was available to await it.
    NoRuntime,
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected => write!(f, "rejected"),
            Self::Errored(msg) => write!(f, "errored: {msg}"),
            Self::Panicked => write!(f, "panicked"),
            Self::TimedOut => write!(f, "timed out"),
            Self::NoRuntime => write!(f, "no async runtime"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_default_pending() {
        assert_eq!(OutcomeStatus::default(), OutcomeStatus::Pending);
        assert!(!OutcomeStatus::Pending.is_terminal());
        assert!(OutcomeStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&OutcomeStatus::Passed).unwrap();
        assert_eq!(json, "\"passed\"");
    }

    #[test]
    fn test_cause_display() {
        assert_eq!(FailureCause::Errored("boom".into()).to_string(), "errored: boom");
        assert_eq!(FailureCause::TimedOut.to_string(), "timed out");
    }
}
