//! Stock validators: `mandatory`, `numeric` and `email`.
//!
//! `numeric` and `email` accept the empty string so they can be combined
//! with `mandatory` without double-reporting an empty field.

use super::{Check, Validator};
use crate::messages;
use regex::Regex;
use std::sync::OnceLock;

/// Id of the non-empty validator.
pub const MANDATORY: &str = "mandatory";
/// Id of the digits-only validator.
pub const NUMERIC: &str = "numeric";
/// Id of the e-mail address validator.
pub const EMAIL: &str = "email";

const NUMERIC_PATTERN: &str = r"^\d+$";

// Dot-atom or quoted local part, dot-separated domain labels, alphabetic
// TLD. Quoted parts allow spaces, tabs and backslash escapes but no CRLF
// folding.
const EMAIL_PATTERN: &str = concat!(
    r"(?i)^(?:[\p{L}\d!#$%&'*+/=?^_`{|}~-]+(?:\.[\p{L}\d!#$%&'*+/=?^_`{|}~-]+)*",
    r#"|"(?:[ \t\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|[^\x00-\x7f]"#,
    r#"|\\[\x01-\x09\x0b\x0c\x0d-\x7f]|\\[^\x00-\x7f])*")"#,
    r"@(?:[\p{L}\d](?:[\p{L}\d._~-]*[\p{L}\d])?\.)+",
    r"\p{L}(?:[\p{L}\d._~-]*\p{L})?\.?$",
);

fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn matches_or_empty(value: &str, regex: Option<&Regex>, name: &str) -> Check {
    if value.is_empty() {
        return true.into();
    }
    match regex {
        Some(re) => re.is_match(value).into(),
        None => Check::Ready(Err(anyhow::anyhow!("{name} pattern failed to compile"))),
    }
}

/// Passes when the value is not empty.
#[must_use]
pub fn mandatory() -> Validator {
    Validator::simple(MANDATORY, |value: &str| !value.is_empty())
        .with_message(messages::default_message(MANDATORY))
}

/// Passes when the value is empty or made of ASCII digits only.
#[must_use]
pub fn numeric() -> Validator {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    Validator::simple(NUMERIC, |value: &str| {
        let ascii_only = value.is_ascii();
        match matches_or_empty(value, compiled(&RE, NUMERIC_PATTERN), NUMERIC) {
            Check::Ready(Ok(ok)) => Check::from(ok && ascii_only),
            other => other,
        }
    })
    .with_message(messages::default_message(NUMERIC))
}

/// Passes when the value is empty or looks like an e-mail address.
#[must_use]
pub fn email() -> Validator {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    Validator::simple(EMAIL, |value: &str| {
        matches_or_empty(value, compiled(&RE, EMAIL_PATTERN), EMAIL)
    })
    .with_message(messages::default_message(EMAIL))
}

/// All stock validators, in registration order.
#[must_use]
pub fn all() -> Vec<Validator> {
    vec![mandatory(), numeric(), email()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FieldElement;

    fn run(v: &Validator, value: &str) -> bool {
        let field = FieldElement::input("f").into_ref();
        match v.check(&field, value) {
            Check::Ready(Ok(ok)) => ok,
            other => panic!("unexpected answer {other:?}"),
        }
    }

    #[test]
    fn test_mandatory() {
        let v = mandatory();
        assert!(run(&v, "a"));
        assert!(!run(&v, ""));
        assert_eq!(v.message(), Some("Please, specify"));
    }

    #[test]
    fn test_numeric() {
        let v = numeric();
        assert!(run(&v, ""));
        assert!(run(&v, "0123"));
        assert!(!run(&v, "12a"));
        assert!(!run(&v, "-1"));
        assert!(!run(&v, "١٢"));
    }

    #[test]
    fn test_email() {
        let v = email();
        for ok in ["", "fred@example.com", "a.b+tag@sub.example.org", "Ünï@exämple.de"] {
            assert!(run(&v, ok), "expected '{ok}' to pass");
        }
        let bad = [
            "fred",
            "fred@",
            "@example.com",
            "fred@example",
            "a..b@example.com",
            "fred@-x.com",
        ];
        for bad in bad {
            assert!(!run(&v, bad), "expected '{bad}' to fail");
        }
    }

    #[test]
    fn test_email_quoted_local_part() {
        let v = email();
        for ok in [r#""fred bloggs"@example.com"#, r#""a\"b"@example.com"#, r#""""@example.com"#] {
            assert!(run(&v, ok), "expected '{ok}' to pass");
        }
        for bad in [r#""fred@example.com"#, r#""a"b"@example.com"#, r#""a"."b"@example.com"#] {
            assert!(!run(&v, bad), "expected '{bad}' to fail");
        }
    }

    #[test]
    fn test_all_ids() {
        let ids: Vec<_> = all().iter().map(|v| v.id().to_string()).collect();
        assert_eq!(ids, vec![MANDATORY, NUMERIC, EMAIL]);
    }
}
