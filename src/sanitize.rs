//! Per-field input sanitizers, applied before a value is persisted.
//!
//! Sanitizers are declared per descriptor as a tagged variant; a descriptor
//! without one stores raw input unmodified. Every sanitizer is idempotent:
//! re-sanitizing already-clean input is a no-op.

use crate::registry::coerce_integer;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanitizer {
    /// Plain-text normalization: strips markup tags, drops control
    /// characters, collapses whitespace runs and trims the ends.
    Text,
    /// Integer coercion followed by absolute value.
    NonNegativeInt,
}

impl Sanitizer {
    pub fn apply(self, raw: &Value) -> Value {
        match self {
            Self::Text => {
                let text = match raw {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                Value::String(sanitize_text(&text))
            }
            Self::NonNegativeInt => json!(coerce_integer(raw).saturating_abs()),
        }
    }
}

/// Strip `<...>` tag spans and control characters, then collapse whitespace.
///
/// A lone `<` with no closing `>` swallows the rest of the string; a lone
/// `>` is kept verbatim.
fn sanitize_text(input: &str) -> String {
    let mut stripped = String::with_capacity(input.len());
    let mut in_tag = false;

    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            c if c.is_control() && !c.is_whitespace() => {}
            c => stripped.push(c),
        }
    }

    let mut out = String::with_capacity(stripped.len());
    let mut last_was_space = false;
    for c in stripped.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(c);
            last_was_space = false;
        }
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_strips_tags() {
        let out = Sanitizer::Text.apply(&json!("Hello <script>alert(1)</script>World"));
        assert_eq!(out, json!("Hello alert(1)World"));
    }

    #[test]
    fn text_collapses_whitespace() {
        let out = Sanitizer::Text.apply(&json!("  My\t\tSite \n Title  "));
        assert_eq!(out, json!("My Site Title"));
    }

    #[test]
    fn text_accepts_non_string_input() {
        assert_eq!(Sanitizer::Text.apply(&json!(42)), json!("42"));
        assert_eq!(Sanitizer::Text.apply(&Value::Null), json!(""));
    }

    #[test]
    fn non_negative_int_parses_and_abs() {
        assert_eq!(Sanitizer::NonNegativeInt.apply(&json!("-3")), json!(3));
        assert_eq!(Sanitizer::NonNegativeInt.apply(&json!("5 days")), json!(5));
        assert_eq!(Sanitizer::NonNegativeInt.apply(&json!("monday")), json!(0));
        assert_eq!(Sanitizer::NonNegativeInt.apply(&json!(-7)), json!(7));
    }
}
