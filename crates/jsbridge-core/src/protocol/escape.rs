//! Escape codec for embedding JSON inside a single-quoted script literal.
//!
//! The host delivers each result by evaluating, inside the script context,
//!
//! ```text
//! JavaScriptBridge.handleNativeMessage('<json>')
//! ```
//!
//! The JSON is embedded as a single-quoted string literal, so four characters
//! must never appear raw inside it: a backslash or single quote would
//! terminate or alter the literal, and a bare CR or LF is not legal inside a
//! script string at all.  This module is the one place where that rewriting
//! happens; call sites never escape by hand.
//!
//! [`unescape_script_literal`] is the exact inverse — the work a script
//! engine's literal parser performs — and is used by the in-process script
//! context and the tests to prove the round trip.

/// Escape table applied by [`escape_script_literal`].
///
/// The rewrite is a single pass over the input characters, so the escapes
/// introduced for one entry are never re-escaped by another.
const ESCAPE_TABLE: [(char, &str); 4] = [
    ('\\', "\\\\"),
    ('\'', "\\'"),
    ('\n', "\\n"),
    ('\r', "\\r"),
];

/// Rewrites `input` so it is safe inside a single-quoted script literal.
///
/// # Examples
///
/// ```rust
/// use jsbridge_core::escape_script_literal;
///
/// assert_eq!(escape_script_literal(r#"it's"#), r#"it\'s"#);
/// assert_eq!(escape_script_literal("a\nb"), r#"a\nb"#);
/// ```
pub fn escape_script_literal(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match ESCAPE_TABLE.iter().find(|(raw, _)| *raw == c) {
            Some((_, escaped)) => out.push_str(escaped),
            None => out.push(c),
        }
    }
    out
}

/// Reverses [`escape_script_literal`]: the work a script engine performs when
/// parsing the single-quoted literal.
///
/// Unknown escape sequences keep the escaped character verbatim (`\x` → `x`),
/// matching how script literal parsing treats them.  A trailing lone
/// backslash is dropped.
pub fn unescape_script_literal(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through_unchanged() {
        assert_eq!(escape_script_literal("hello world"), "hello world");
    }

    #[test]
    fn test_single_quote_is_escaped() {
        assert_eq!(escape_script_literal("it's"), "it\\'s");
    }

    #[test]
    fn test_backslash_is_escaped() {
        assert_eq!(escape_script_literal("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_newline_and_carriage_return_are_escaped() {
        assert_eq!(escape_script_literal("a\nb\rc"), "a\\nb\\rc");
    }

    #[test]
    fn test_double_quote_is_not_touched() {
        // The literal is single-quoted; JSON's own double quotes are fine.
        assert_eq!(escape_script_literal(r#"{"x":1}"#), r#"{"x":1}"#);
    }

    #[test]
    fn test_escaped_output_contains_no_raw_specials() {
        let escaped = escape_script_literal("line1\r\nline2 with 'quotes' and \\slashes\\");

        assert!(!escaped.contains('\n'));
        assert!(!escaped.contains('\r'));
        // Every remaining single quote must be preceded by a backslash.
        let bytes = escaped.as_bytes();
        for (i, b) in bytes.iter().enumerate() {
            if *b == b'\'' {
                assert_eq!(bytes[i - 1], b'\\', "unescaped quote at byte {i}");
            }
        }
    }

    #[test]
    fn test_round_trip_for_every_table_entry() {
        for (raw, _) in ESCAPE_TABLE {
            let input = format!("a{raw}b");
            assert_eq!(
                unescape_script_literal(&escape_script_literal(&input)),
                input,
                "round trip failed for {raw:?}"
            );
        }
    }

    #[test]
    fn test_round_trip_of_json_result() {
        // A realistic payload: an error message containing every character
        // the table covers.
        let json = "{\"callbackId\":\"cb_1_7\",\"errorData\":{\"message\":\"path C:\\\\tmp isn't\\r\\nwritable\"}}";

        let round_tripped = unescape_script_literal(&escape_script_literal(json));

        assert_eq!(round_tripped, json);
    }

    #[test]
    fn test_unescape_tolerates_unknown_sequences() {
        assert_eq!(unescape_script_literal("a\\xb"), "axb");
    }

    #[test]
    fn test_unescape_drops_trailing_lone_backslash() {
        assert_eq!(unescape_script_literal("ab\\"), "ab");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(escape_script_literal(""), "");
        assert_eq!(unescape_script_literal(""), "");
    }
}
