//! Configuration for the form layer.
//!
//! Everything has a default, so an empty JSON object is a valid
//! configuration.

use crate::core::FieldElement;
use crate::engine::EngineConfig;
use crate::errors::{FieldguardError, Result};
use crate::messages::MessageTable;
use crate::registry::Selector;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Events that trigger validation for fields matching a selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRule {
    /// Fields this rule applies to.
    pub selector: Selector,
    /// Event names, e.g. `blur`, `change`.
    pub events: Vec<String>,
}

impl TriggerRule {
    /// Creates a rule from a selector and a space-separated event list.
    pub fn new(selector: &str, events: &str) -> Result<Self> {
        Ok(Self {
            selector: Selector::parse(selector)?,
            events: events.split_whitespace().map(String::from).collect(),
        })
    }

    /// Returns true if `event` is one of this rule's events.
    #[must_use]
    pub fn triggers_on(&self, event: &str) -> bool {
        self.events.iter().any(|e| e == event)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldguardConfig {
    /// Engine settings.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Hidden fields pass without running their validators.
    #[serde(default = "default_skip_hidden")]
    pub skip_hidden: bool,
    /// Trigger rules; the first rule matching a field wins.
    #[serde(default = "default_triggers")]
    pub triggers: Vec<TriggerRule>,
    /// Failure messages, merged over the stock ones.
    ///
    /// Used by handlers built through
    /// [`FormValidator::feedback_handler`](crate::form::FormValidator::feedback_handler).
    #[serde(default)]
    pub messages: MessageTable,
}

fn default_skip_hidden() -> bool {
    true
}

fn default_triggers() -> Vec<TriggerRule> {
    [
        (":radio", "change"),
        (":input:not(:radio):not(:submit)", "blur change keyup"),
    ]
    .into_iter()
    .filter_map(|(selector, events)| TriggerRule::new(selector, events).ok())
    .collect()
}

impl Default for FieldguardConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            skip_hidden: default_skip_hidden(),
            triggers: default_triggers(),
            messages: MessageTable::default(),
        }
    }
}

impl FieldguardConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON configuration.
    ///
    /// Messages given in the document are merged over the stock table.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        let mut messages = MessageTable::default();
        messages.extend(std::mem::replace(&mut config.messages, MessageTable::empty()));
        config.messages = messages;
        Ok(config)
    }

    /// Loads a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
            .map_err(|e| FieldguardError::Config(format!("{}: {e}", path.display())))
    }

    /// Sets the engine configuration.
    #[must_use]
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Enables or disables skipping hidden fields.
    #[must_use]
    pub fn with_skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    /// Replaces every trigger rule with a single rule.
    pub fn with_trigger(mut self, selector: &str, events: &str) -> Result<Self> {
        self.triggers = vec![TriggerRule::new(selector, events)?];
        Ok(self)
    }

    /// Sets one message.
    #[must_use]
    pub fn with_message(mut self, id: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.set(id, message);
        self
    }

    /// Returns the events that trigger validation for `field`.
    ///
    /// Only the first matching rule applies.
    #[must_use]
    pub fn triggers_for(&self, field: &FieldElement) -> &[String] {
        self.triggers
            .iter()
            .find(|rule| rule.selector.matches(field))
            .map(|rule| rule.events.as_slice())
            .unwrap_or_default()
    }
}
