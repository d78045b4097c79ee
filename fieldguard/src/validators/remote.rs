//! Validators backed by an asynchronous lookup, such as a server call.

use super::{Predicate, Validator};
use crate::core::FieldRef;
use crate::messages;
use async_trait::async_trait;
use std::sync::Arc;

/// Id of the remote validator.
pub const REMOTE: &str = "remote";

/// An asynchronous check against something outside the process.
///
/// An `Err` fails the validator the same way `Ok(false)` does; the error is
/// logged by the engine.
#[async_trait]
pub trait RemoteCheck: Send + Sync {
    /// Checks `value` entered in `field`.
    async fn check(&self, field: &FieldRef, value: &str) -> anyhow::Result<bool>;
}

/// Builds a validator with id `remote` around `lookup`.
pub fn remote(lookup: Arc<dyn RemoteCheck>) -> Validator {
    remote_with_id(REMOTE, lookup).with_message(messages::default_message(REMOTE))
}

/// Builds a remote validator under a custom id.
pub fn remote_with_id(id: impl Into<String>, lookup: Arc<dyn RemoteCheck>) -> Validator {
    Validator::new(
        id,
        Predicate::contextual_async(move |field, value| {
            let lookup = Arc::clone(&lookup);
            async move { lookup.check(&field, &value).await }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FailureCause, FieldElement, ValidationTarget};
    use crate::engine::ValidationEngine;
    use crate::testing::assert_settlement_failed;
    use std::collections::HashSet;

    struct TakenNames(HashSet<&'static str>);

    #[async_trait]
    impl RemoteCheck for TakenNames {
        async fn check(&self, _field: &FieldRef, value: &str) -> anyhow::Result<bool> {
            tokio::task::yield_now().await;
            Ok(!self.0.contains(value))
        }
    }

    struct Unreachable;

    #[async_trait]
    impl RemoteCheck for Unreachable {
        async fn check(&self, field: &FieldRef, _value: &str) -> anyhow::Result<bool> {
            anyhow::bail!("lookup for {} timed out upstream", field.id)
        }
    }

    fn target(value: &str, lookup: Arc<dyn RemoteCheck>) -> ValidationTarget {
        ValidationTarget::new(
            FieldElement::input("user").into_ref(),
            value,
            vec![remote(lookup)],
        )
    }

    #[tokio::test]
    async fn test_remote_lookup() {
        let lookup: Arc<dyn RemoteCheck> = Arc::new(TakenNames(["fred"].into_iter().collect()));
        let engine = ValidationEngine::default();

        assert!(engine.run(target("wilma", Arc::clone(&lookup))).await.is_passed());

        let settlement = engine.run(target("fred", lookup)).await;
        assert_settlement_failed(&settlement, REMOTE, &FailureCause::Rejected);
        assert_eq!(settlement.message(), Some("Remote call failed..."));
    }

    #[tokio::test]
    async fn test_remote_error_fails() {
        let settlement = ValidationEngine::default()
            .run(target("fred", Arc::new(Unreachable)))
            .await;
        assert_eq!(settlement.failed_validator(), Some(REMOTE));
        assert!(matches!(settlement.cause(), Some(FailureCause::Errored(_))));
    }

    #[test]
    fn test_remote_is_pending() {
        let v = remote_with_id("unique", Arc::new(Unreachable));
        assert_eq!(v.id(), "unique");
        assert!(v.message().is_none());
        assert!(v.predicate().is_contextual());
    }
}
