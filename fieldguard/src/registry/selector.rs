//! Minimal selector matching for registry overrides.
//!
//! Supported: an optional tag (or `*`), `.class` parts, the pseudo-classes
//! `:input`, `:radio`, `:checkbox`, `:submit`, `:text`, `:hidden`,
//! `:visible`, `:not(<compound>)`, and comma-separated alternatives.
//! Combinators are not supported.

use crate::core::FieldElement;
use crate::errors::InvalidSelectorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pseudo {
    Input,
    Radio,
    Checkbox,
    Submit,
    Text,
    Hidden,
    Visible,
    Not(Box<Compound>),
}

impl Pseudo {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "input" => Some(Self::Input),
            "radio" => Some(Self::Radio),
            "checkbox" => Some(Self::Checkbox),
            "submit" => Some(Self::Submit),
            "text" => Some(Self::Text),
            "hidden" => Some(Self::Hidden),
            "visible" => Some(Self::Visible),
            _ => None,
        }
    }

    fn matches(&self, field: &FieldElement) -> bool {
        match self {
            Self::Input => field.is_form_input(),
            Self::Radio => field.tag == "input" && field.is_type("radio"),
            Self::Checkbox => field.tag == "input" && field.is_type("checkbox"),
            Self::Submit => {
                matches!(field.tag.as_str(), "input" | "button") && field.is_type("submit")
            }
            Self::Text => field.tag == "input" && field.is_type("text"),
            Self::Hidden => field.hidden,
            Self::Visible => !field.hidden,
            Self::Not(inner) => !inner.matches(field),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    pseudos: Vec<Pseudo>,
}

impl Compound {
    fn matches(&self, field: &FieldElement) -> bool {
        self.tag.as_deref().map_or(true, |tag| field.tag == tag)
            && self.classes.iter().all(|c| field.has_class(c))
            && self.pseudos.iter().all(|p| p.matches(field))
    }
}

/// A parsed selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Selector {
    source: String,
    alternatives: Vec<Compound>,
}

impl Selector {
    /// Parses a selector string.
    pub fn parse(source: &str) -> Result<Self, InvalidSelectorError> {
        let alternatives = split_top_level(source)
            .into_iter()
            .map(|part| parse_compound(part, source))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            source: source.trim().to_string(),
            alternatives,
        })
    }

    /// Returns true if any alternative matches the field.
    #[must_use]
    pub fn matches(&self, field: &FieldElement) -> bool {
        self.alternatives.iter().any(|c| c.matches(field))
    }

    /// The selector as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for Selector {
    type Err = InvalidSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Selector {
    type Error = InvalidSelectorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.source
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn split_top_level(source: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in source.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&source[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&source[start..]);
    parts
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

fn ident_end(s: &str, start: usize) -> usize {
    s.as_bytes()[start..]
        .iter()
        .position(|b| !is_ident_byte(*b))
        .map_or(s.len(), |offset| start + offset)
}

fn closing_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in s.bytes().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_compound(part: &str, whole: &str) -> Result<Compound, InvalidSelectorError> {
    let err = |reason: String| InvalidSelectorError::new(whole, reason);
    let s = part.trim();
    if s.is_empty() {
        return Err(err("empty selector".into()));
    }

    let bytes = s.as_bytes();
    let mut compound = Compound::default();
    let mut i = 0;
    if bytes[0] == b'*' {
        i = 1;
    } else {
        let end = ident_end(s, 0);
        if end > 0 {
            compound.tag = Some(s[..end].to_ascii_lowercase());
            i = end;
        }
    }

    while i < bytes.len() {
        match bytes[i] {
            b'.' => {
                let end = ident_end(s, i + 1);
                if end == i + 1 {
                    return Err(err("empty class name".into()));
                }
                compound.classes.push(s[i + 1..end].to_string());
                i = end;
            }
            b':' => {
                let end = ident_end(s, i + 1);
                let name = &s[i + 1..end];
                if name == "not" {
                    if bytes.get(end) != Some(&b'(') {
                        return Err(err("expected '(' after :not".into()));
                    }
                    let close = closing_paren(s, end).ok_or_else(|| err("unclosed :not(".into()))?;
                    let inner = parse_compound(&s[end + 1..close], whole)?;
                    compound.pseudos.push(Pseudo::Not(Box::new(inner)));
                    i = close + 1;
                } else {
                    let pseudo = Pseudo::from_name(name)
                        .ok_or_else(|| err(format!("unknown pseudo-class ':{name}'")))?;
                    compound.pseudos.push(pseudo);
                    i = end;
                }
            }
            b if b.is_ascii_whitespace() => {
                return Err(err("combinators are not supported".into()));
            }
            _ => {
                let c = s[i..].chars().next().unwrap_or_default();
                return Err(err(format!("unexpected character '{c}'")));
            }
        }
    }
    Ok(compound)
}
