//! Failure messages keyed by validator id.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Message used when neither the table nor the validator has one.
pub const FALLBACK_MESSAGE: &str = "Please, check this value";

const DEFAULTS: &[(&str, &str)] = &[
    ("mandatory", "Please, specify"),
    ("email", "Please, enter a valid email"),
    ("numeric", "Please, enter only numeric values (0-9)"),
    ("remote", "Remote call failed..."),
];

/// Returns the stock message for `id`, or [`FALLBACK_MESSAGE`].
#[must_use]
pub fn default_message(id: &str) -> &'static str {
    DEFAULTS
        .iter()
        .find(|(key, _)| *key == id)
        .map_or(FALLBACK_MESSAGE, |(_, msg)| *msg)
}

/// Table of failure messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageTable {
    messages: HashMap<String, String>,
}

impl Default for MessageTable {
    fn default() -> Self {
        Self {
            messages: DEFAULTS
                .iter()
                .map(|(id, msg)| ((*id).to_string(), (*msg).to_string()))
                .collect(),
        }
    }
}

impl MessageTable {
    /// Creates a table with the stock messages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            messages: HashMap::new(),
        }
    }

    /// Sets the message for `id`.
    #[must_use]
    pub fn with(mut self, id: impl Into<String>, message: impl Into<String>) -> Self {
        self.set(id, message);
        self
    }

    /// Sets the message for `id`, replacing any previous one.
    pub fn set(&mut self, id: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(id.into(), message.into());
    }

    /// Returns the table entry for `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&str> {
        self.messages.get(id).map(String::as_str)
    }

    /// Resolves the text to show for a failed validator.
    ///
    /// Lookup order: the table, then the validator's own message, then
    /// [`FALLBACK_MESSAGE`].
    #[must_use]
    pub fn resolve<'a>(&'a self, id: &str, own: Option<&'a str>) -> &'a str {
        self.get(id).or(own).unwrap_or(FALLBACK_MESSAGE)
    }

    /// Merges `other` over this table.
    pub fn extend(&mut self, other: Self) {
        self.messages.extend(other.messages);
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true when the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
