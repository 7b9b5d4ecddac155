//! Normalization of inbound control frames.
//!
//! The control-channel backend serializes missing floating point readings as
//! a bare `NaN`, which is not valid JSON. Every word-bounded `NaN` outside a
//! string literal is rewritten to `null` before parsing.

use std::borrow::Cow;

const NAN: &str = "NaN";
const NULL: &str = "null";

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Replaces bare `NaN` tokens with `null`. Borrows the input when there is
/// nothing to rewrite.
pub fn sanitize_frame(raw: &str) -> Cow<'_, str> {
    if !raw.contains(NAN) {
        return Cow::Borrowed(raw);
    }

    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    let mut copied_up_to = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        if byte == b'"' {
            in_string = true;
            i += 1;
            continue;
        }

        if bytes[i..].starts_with(NAN.as_bytes()) {
            let before_ok = i == 0 || !is_word_byte(bytes[i - 1]);
            let end = i + NAN.len();
            let after_ok = end == bytes.len() || !is_word_byte(bytes[end]);
            if before_ok && after_ok {
                out.push_str(&raw[copied_up_to..i]);
                out.push_str(NULL);
                copied_up_to = end;
                i = end;
                continue;
            }
        }
        i += 1;
    }

    if copied_up_to == 0 {
        return Cow::Borrowed(raw);
    }
    out.push_str(&raw[copied_up_to..]);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    #[test]
    fn rewrites_nan_in_value_position() {
        let cleaned = sanitize_frame(r#"{"event":"x","params":{"v":NaN}}"#);
        let parsed: Value = serde_json::from_str(&cleaned).expect("valid json");
        assert_eq!(parsed, json!({"event": "x", "params": {"v": null}}));
    }

    #[test]
    fn rewrites_every_occurrence_in_arrays() {
        let cleaned = sanitize_frame("[NaN,1.5,NaN]");
        assert_eq!(cleaned, "[null,1.5,null]");
    }

    #[test]
    fn keeps_nan_inside_string_literals() {
        let raw = r#"{"event":"NaN","params":{"note":"value is NaN \"NaN\""}}"#;
        assert_eq!(sanitize_frame(raw), raw);
    }

    #[test]
    fn ignores_nan_embedded_in_words() {
        assert_eq!(sanitize_frame("NaNa xNaN NaN_1"), "NaNa xNaN NaN_1");
    }

    #[test]
    fn borrows_when_nothing_changes() {
        assert!(matches!(sanitize_frame(r#"{"a":1}"#), Cow::Borrowed(_)));
        assert!(matches!(sanitize_frame(r#"{"a":"NaN"}"#), Cow::Borrowed(_)));
    }
}
