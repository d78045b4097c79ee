//! Validator descriptors and predicates.
//!
//! A [`Validator`] pairs an id with a [`Predicate`] and an optional message.
//! Whether the predicate wants the field reference is decided when the
//! predicate is built ([`Predicate::Simple`] or [`Predicate::Contextual`]),
//! never at call time.

pub mod builtin;
pub mod remote;

pub use remote::RemoteCheck;

use crate::core::FieldRef;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Boxed asynchronous predicate answer.
pub type CheckFuture = BoxFuture<'static, anyhow::Result<bool>>;

/// The answer of a predicate call.
///
/// `Ok(false)` and `Err(_)` both fail the validator.
pub enum Check {
    /// The answer is available now.
    Ready(anyhow::Result<bool>),
    /// The answer will be available once the future completes.
    Pending(CheckFuture),
}

impl Check {
    /// Wraps a future answer.
    pub fn pending<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        Self::Pending(Box::pin(fut))
    }

    /// Returns true if the answer is available without awaiting.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

impl From<bool> for Check {
    fn from(ok: bool) -> Self {
        Self::Ready(Ok(ok))
    }
}

impl From<anyhow::Result<bool>> for Check {
    fn from(res: anyhow::Result<bool>) -> Self {
        Self::Ready(res)
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(res) => f.debug_tuple("Ready").field(res).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Predicate that only looks at the value.
pub type SimpleFn = Arc<dyn Fn(&str) -> Check + Send + Sync>;

/// Predicate that also receives the field.
pub type ContextualFn = Arc<dyn Fn(&FieldRef, &str) -> Check + Send + Sync>;

/// A validator predicate, tagged by the arguments it takes.
#[derive(Clone)]
pub enum Predicate {
    /// Called with the value only.
    Simple(SimpleFn),
    /// Called with the field and the value.
    Contextual(ContextualFn),
}

impl Predicate {
    /// Builds a value-only predicate from anything convertible to a [`Check`].
    pub fn simple<F, R>(f: F) -> Self
    where
        F: Fn(&str) -> R + Send + Sync + 'static,
        R: Into<Check>,
    {
        Self::Simple(Arc::new(move |value| f(value).into()))
    }

    /// Builds a field-aware predicate.
    pub fn contextual<F, R>(f: F) -> Self
    where
        F: Fn(&FieldRef, &str) -> R + Send + Sync + 'static,
        R: Into<Check>,
    {
        Self::Contextual(Arc::new(move |field, value| f(field, value).into()))
    }

    /// Builds a value-only predicate that answers asynchronously.
    ///
    /// The closure receives an owned copy of the value so the future can
    /// outlive the call.
    pub fn simple_async<F, Fut>(f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        Self::Simple(Arc::new(move |value| Check::pending(f(value.to_owned()))))
    }

    /// Builds a field-aware predicate that answers asynchronously.
    pub fn contextual_async<F, Fut>(f: F) -> Self
    where
        F: Fn(FieldRef, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        Self::Contextual(Arc::new(move |field, value| {
            Check::pending(f(Arc::clone(field), value.to_owned()))
        }))
    }

    /// Calls the predicate with the arguments its variant asks for.
    pub fn call(&self, field: &FieldRef, value: &str) -> Check {
        match self {
            Self::Simple(f) => f(value),
            Self::Contextual(f) => f(field, value),
        }
    }

    /// Returns true for [`Predicate::Contextual`].
    #[must_use]
    pub fn is_contextual(&self) -> bool {
        matches!(self, Self::Contextual(_))
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(_) => f.write_str("Predicate::Simple"),
            Self::Contextual(_) => f.write_str("Predicate::Contextual"),
        }
    }
}

/// An immutable validator descriptor.
#[derive(Debug, Clone)]
pub struct Validator {
    id: String,
    predicate: Predicate,
    message: Option<String>,
}

impl Validator {
    /// Creates a validator from an id and a predicate.
    #[must_use]
    pub fn new(id: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            id: id.into(),
            predicate,
            message: None,
        }
    }

    /// Shorthand for a validator with a value-only predicate.
    pub fn simple<F, R>(id: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str) -> R + Send + Sync + 'static,
        R: Into<Check>,
    {
        Self::new(id, Predicate::simple(f))
    }

    /// Shorthand for a validator with a field-aware predicate.
    pub fn contextual<F, R>(id: impl Into<String>, f: F) -> Self
    where
        F: Fn(&FieldRef, &str) -> R + Send + Sync + 'static,
        R: Into<Check>,
    {
        Self::new(id, Predicate::contextual(f))
    }

    /// Sets the human-readable failure message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns the validator id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the failure message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the predicate.
    #[must_use]
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Calls the predicate.
    pub fn check(&self, field: &FieldRef, value: &str) -> Check {
        self.predicate.call(field, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FieldElement;

    fn field() -> FieldRef {
        FieldElement::input("name").with_class("mandatory").into_ref()
    }

    fn ready(check: Check) -> bool {
        match check {
            Check::Ready(Ok(ok)) => ok,
            other => panic!("expected a ready answer, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_predicate_sees_value() {
        let v = Validator::simple("mandatory", |value: &str| !value.is_empty());
        assert!(!v.predicate().is_contextual());
        assert!(ready(v.check(&field(), "x")));
        assert!(!ready(v.check(&field(), "")));
    }

    #[test]
    fn test_contextual_predicate_sees_field() {
        let v = Validator::contextual("tagged", |field: &FieldRef, _value: &str| {
            field.has_class("mandatory")
        });
        assert!(v.predicate().is_contextual());
        assert!(ready(v.check(&field(), "")));
    }

    #[test]
    fn test_fallible_predicate_keeps_error() {
        let v = Validator::simple("parse", |value: &str| -> anyhow::Result<bool> {
            Ok(value.parse::<u32>()? > 10)
        });
        assert!(matches!(v.check(&field(), "abc"), Check::Ready(Err(_))));
        assert!(ready(v.check(&field(), "42")));
    }

    #[tokio::test]
    async fn test_async_predicate_is_pending() {
        let v = Validator::new(
            "remote",
            Predicate::simple_async(|value| async move { Ok(value == "taken") }),
        );
        match v.check(&field(), "taken") {
            Check::Pending(fut) => assert!(fut.await.unwrap()),
            Check::Ready(_) => panic!("expected a pending answer"),
        }
    }

    #[test]
    fn test_message() {
        let v = Validator::simple("numeric", |_: &str| true).with_message("digits only");
        assert_eq!(v.id(), "numeric");
        assert_eq!(v.message(), Some("digits only"));
    }
}
