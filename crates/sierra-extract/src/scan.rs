//! Low-level scanning primitives shared by the state and event-layer
//! extractors.
//!
//! Locating an embedded payload and decoding it are deliberately separate
//! steps: a regex finds where the assignment starts, the balanced-brace
//! scanner finds how far the object extends, and only then does JSON
//! decoding happen, each step testable on its own.

/// Try to extract a balanced JSON object from the start of `s`.
///
/// Scans `s` character-by-character tracking brace depth, respecting
/// string literals and escape sequences. Returns the shortest prefix of
/// `s` that forms a complete `{…}` object, or `None` if the object is
/// unterminated. Only `}` (not `]`) at depth 0 triggers a return, so
/// malformed input like `{42]` is never accepted.
pub fn extract_balanced_object(s: &str) -> Option<&str> {
    if !s.starts_with('{') {
        return None;
    }
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escape = false;
    for (i, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if in_string {
            match c {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            ']' => depth -= 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Decode the four basic HTML entities: `&quot;`, `&lt;`, `&gt;`, `&amp;`.
///
/// `&amp;` is decoded last so that `&amp;quot;` comes out as `&quot;`
/// rather than being decoded twice.
#[must_use]
pub fn decode_basic_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Parse `raw` as JSON; on failure, run one entity-decode pass and parse
/// again. Returns the recovery attempt's error when both fail, or the
/// original error when decoding changed nothing.
///
/// # Errors
///
/// The `serde_json` error from the last parse attempt.
pub fn parse_with_entity_recovery(raw: &str) -> Result<serde_json::Value, serde_json::Error> {
    match serde_json::from_str(raw) {
        Ok(value) => Ok(value),
        Err(first) => {
            let decoded = decode_basic_entities(raw);
            if decoded == raw {
                return Err(first);
            }
            serde_json::from_str(&decoded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_object_simple() {
        assert_eq!(extract_balanced_object(r#"{"a":1} trailing"#), Some(r#"{"a":1}"#));
    }

    #[test]
    fn balanced_object_nested_braces_and_arrays() {
        let s = r#"{"a":{"b":[1,{"c":2}]},"d":3});"#;
        assert_eq!(
            extract_balanced_object(s),
            Some(r#"{"a":{"b":[1,{"c":2}]},"d":3}"#)
        );
    }

    #[test]
    fn balanced_object_braces_inside_strings_are_ignored() {
        let s = r#"{"a":"}{","b":"\"}"} rest"#;
        assert_eq!(extract_balanced_object(s), Some(r#"{"a":"}{","b":"\"}"}"#));
    }

    #[test]
    fn balanced_object_rejects_non_object_start() {
        assert_eq!(extract_balanced_object("[1,2,3]"), None);
        assert_eq!(extract_balanced_object("  {\"a\":1}"), None);
    }

    #[test]
    fn balanced_object_unterminated_is_none() {
        assert_eq!(extract_balanced_object(r#"{"a":{"b":1}"#), None);
    }

    #[test]
    fn balanced_object_mismatched_close_is_not_accepted() {
        assert_eq!(extract_balanced_object("{42]"), None);
    }

    #[test]
    fn decode_entities_amp_last() {
        assert_eq!(decode_basic_entities("&amp;quot;"), "&quot;");
        assert_eq!(decode_basic_entities("a &lt;b&gt; &quot;c&quot;"), "a <b> \"c\"");
    }

    #[test]
    fn recovery_parses_entity_encoded_json() {
        let raw = "{&quot;price&quot;: 49.99}";
        let value = parse_with_entity_recovery(raw).expect("recovery parse");
        assert_eq!(value["price"].as_f64(), Some(49.99));
    }

    #[test]
    fn recovery_returns_error_when_both_attempts_fail() {
        assert!(parse_with_entity_recovery("{&quot;price&quot;: }").is_err());
        assert!(parse_with_entity_recovery("{nope}").is_err());
    }
}
