//! The form field model the engine and registry work against.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Stable identifier of a form field.
///
/// Caches and forms key their entries by this id, never by the address of
/// a [`FieldElement`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    /// Creates a new target id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TargetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Shared, read-only handle to a field.
pub type FieldRef = Arc<FieldElement>;

/// A form control as far as validation is concerned.
///
/// The element carries its shape (tag, type, classes, visibility). Its current
/// value lives with the caller and is passed to the engine per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldElement {
    /// Stable id of the field.
    pub id: TargetId,
    /// Tag name, lowercase (`input`, `select`, `textarea`, ...).
    pub tag: String,
    /// The `type` attribute for inputs (`text`, `radio`, `submit`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    /// Class names in declaration order.
    #[serde(default)]
    pub classes: Vec<String>,
    /// Whether the field is currently hidden.
    #[serde(default)]
    pub hidden: bool,
}

impl FieldElement {
    /// Creates a field with the given id and tag.
    #[must_use]
    pub fn new(id: impl Into<TargetId>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into().to_ascii_lowercase(),
            input_type: None,
            classes: Vec::new(),
            hidden: false,
        }
    }

    /// Creates an `<input type="text">` field.
    #[must_use]
    pub fn input(id: impl Into<TargetId>) -> Self {
        Self::new(id, "input").with_type("text")
    }

    /// Sets the input type.
    #[must_use]
    pub fn with_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = Some(input_type.into().to_ascii_lowercase());
        self
    }

    /// Appends a class name.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Parses a whitespace-separated `class` attribute and appends each name.
    #[must_use]
    pub fn with_class_attr(mut self, attr: &str) -> Self {
        self.classes.extend(attr.split_whitespace().map(String::from));
        self
    }

    /// Marks the field hidden or visible.
    #[must_use]
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Returns true if the field carries the class name.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Returns true if the input type equals `ty`.
    #[must_use]
    pub fn is_type(&self, ty: &str) -> bool {
        self.input_type.as_deref() == Some(ty)
    }

    /// Returns true for the tags that count as form inputs.
    #[must_use]
    pub fn is_form_input(&self) -> bool {
        matches!(
            self.tag.as_str(),
            "input" | "select" | "textarea" | "button"
        )
    }

    /// Wraps the element in a [`FieldRef`].
    #[must_use]
    pub fn into_ref(self) -> FieldRef {
        Arc::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_attr_parsing() {
        let field = FieldElement::input("email").with_class_attr("  mandatory\temail  wide ");
        assert_eq!(field.classes, vec!["mandatory", "email", "wide"]);
        assert!(field.has_class("email"));
        assert!(!field.has_class("numeric"));
    }

    #[test]
    fn test_tag_and_type_are_lowercased() {
        let field = FieldElement::new("r", "INPUT").with_type("Radio");
        assert_eq!(field.tag, "input");
        assert!(field.is_type("radio"));
        assert!(field.is_form_input());
    }

    #[test]
    fn test_target_id_serde_is_transparent() {
        let id = TargetId::new("zip");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"zip\"");
        assert_eq!(id.to_string(), "zip");
    }
}
