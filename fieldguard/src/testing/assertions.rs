//! Test assertions for outcomes and settlements.

use crate::core::{FailureCause, OutcomeStatus};
use crate::outcome::{Outcome, Settlement};

/// Asserts that the outcome settled as passed.
pub fn assert_passed(outcome: &Outcome) {
    assert_eq!(
        outcome.status(),
        OutcomeStatus::Passed,
        "Expected a passed outcome, got {:?}",
        outcome.settlement()
    );
}

/// Asserts that the outcome settled as failed on validator `id`.
pub fn assert_failed_with(outcome: &Outcome, id: &str) {
    let settlement = outcome.settlement();
    assert_eq!(
        settlement.as_ref().and_then(Settlement::failed_validator),
        Some(id),
        "Expected failure on '{}', got {:?}",
        id,
        settlement
    );
}

/// Asserts that the outcome has not settled yet.
pub fn assert_pending(outcome: &Outcome) {
    assert_eq!(
        outcome.status(),
        OutcomeStatus::Pending,
        "Expected a pending outcome, got {:?}",
        outcome.settlement()
    );
}

/// Asserts that a settlement failed on `id` for the given cause.
pub fn assert_settlement_failed(settlement: &Settlement, id: &str, cause: &FailureCause) {
    match settlement {
        Settlement::Failed {
            validator_id,
            cause: actual,
            ..
        } => {
            assert_eq!(validator_id, id, "Wrong failing validator");
            assert_eq!(actual, cause, "Wrong failure cause for '{id}'");
        }
        Settlement::Passed { .. } => panic!("Expected failure on '{id}', got a pass"),
    }
}
