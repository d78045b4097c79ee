//! Whole-form submission.

use super::Form;
use crate::core::TargetId;
use crate::outcome::Settlement;
use futures::future::join_all;
use tracing::{debug, info};

/// Result of validating every field of a form.
#[derive(Debug, Clone, Default)]
pub struct SubmitReport {
    settlements: Vec<Settlement>,
    abandoned: Vec<TargetId>,
}

impl SubmitReport {
    /// Returns true if every validated field passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.abandoned.is_empty() && self.settlements.iter().all(Settlement::is_passed)
    }

    /// Settlements, in field order. Abandoned runs are not included.
    #[must_use]
    pub fn settlements(&self) -> &[Settlement] {
        &self.settlements
    }

    /// Failed settlements, in field order.
    pub fn failures(&self) -> impl Iterator<Item = &Settlement> {
        self.settlements.iter().filter(|s| !s.is_passed())
    }

    /// Fields whose run never settled.
    #[must_use]
    pub fn abandoned(&self) -> &[TargetId] {
        &self.abandoned
    }

    /// Number of fields validated.
    #[must_use]
    pub fn len(&self) -> usize {
        self.settlements.len() + self.abandoned.len()
    }

    /// Returns true if no field was validated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Form {
    /// Validates every field that has trigger events and waits for all of
    /// them.
    ///
    /// All runs start before any is awaited, so async validators on
    /// different fields overlap.
    pub async fn submit_report(&self) -> SubmitReport {
        let outcomes: Vec<_> = self
            .fields
            .iter()
            .filter(|slot| !self.validator.triggers_for(&slot.field).is_empty())
            .map(|slot| self.validator.validate(&slot.field, &slot.value))
            .collect();
        debug!(fields = outcomes.len(), "Submitting form");

        let settled = join_all(outcomes.iter().map(|outcome| outcome.wait())).await;

        let mut report = SubmitReport::default();
        for (outcome, settlement) in outcomes.iter().zip(settled) {
            match settlement {
                Some(settlement) => report.settlements.push(settlement),
                None => report.abandoned.push(outcome.field().id.clone()),
            }
        }

        info!(
            fields = report.len(),
            failed = report.failures().count(),
            abandoned = report.abandoned.len(),
            valid = report.is_valid(),
            "Form submitted"
        );
        report
    }

    /// Validates every field and returns true if all passed.
    pub async fn submit(&self) -> bool {
        self.submit_report().await.is_valid()
    }
}
