//! Extractor for the `window.__STATE__` hydration blob.

use regex::Regex;
use serde_json::Value;

use crate::error::ExtractError;
use crate::scan;

/// Extract and parse the first `window.__STATE__ = {…};` assignment.
///
/// The payload extent is found with the balanced-brace scanner. When the
/// raw text does not contain a complete object (truncated or mangled
/// markup), the capture falls back to everything up to the closing
/// `</script>` if one follows, else up to the next `;`. That slice then
/// goes through the same parse-with-recovery path and reports a parse
/// failure rather than absence.
///
/// # Errors
///
/// - [`ExtractError::StateNotFound`]: no assignment anywhere.
/// - [`ExtractError::StateParseFailure`]: payload present but not valid
///   JSON, even after one HTML-entity decode pass.
pub fn extract_state(html: &str) -> Result<Value, ExtractError> {
    let assign_re = Regex::new(r"window\.__STATE__\s*=\s*").expect("valid regex");
    let m = assign_re.find(html).ok_or(ExtractError::StateNotFound)?;
    let rest = &html[m.end()..];

    let raw = scan::extract_balanced_object(rest).unwrap_or_else(|| slice_to_terminator(rest));

    scan::parse_with_entity_recovery(raw)
        .map_err(|source| ExtractError::StateParseFailure { source })
}

/// Fallback capture bound: prefer a slice ending directly before a
/// script-close tag, else the nearest subsequent semicolon.
fn slice_to_terminator(rest: &str) -> &str {
    let end = rest
        .find("</script>")
        .or_else(|| rest.find(';'))
        .unwrap_or(rest.len());
    rest[..end].trim().trim_end_matches(';')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_embedded_object() {
        let original = serde_json::json!({
            "product": {"id": "7kuga", "prices": [49.99, 80.0]},
            "session": {"locale": "en-US"}
        });
        let html = format!(
            "<html><head><script>window.__STATE__ = {original};</script></head><body>x</body></html>"
        );
        let extracted = extract_state(&html).expect("state should extract");
        assert_eq!(extracted, original);
    }

    #[test]
    fn prefers_first_assignment() {
        let html = r#"<script>window.__STATE__ = {"n":1};</script>
                      <script>window.__STATE__ = {"n":2};</script>"#;
        let extracted = extract_state(html).unwrap();
        assert_eq!(extracted["n"].as_i64(), Some(1));
    }

    #[test]
    fn recovers_entity_encoded_payload() {
        let html = r#"<script>window.__STATE__ = {&quot;id&quot;:&quot;7kuga&quot;};</script>"#;
        let extracted = extract_state(html).unwrap();
        assert_eq!(extracted["id"].as_str(), Some("7kuga"));
    }

    #[test]
    fn missing_assignment_is_not_found() {
        let result = extract_state("<html><body>no state here</body></html>");
        assert!(matches!(result, Err(ExtractError::StateNotFound)));
    }

    #[test]
    fn malformed_payload_is_parse_failure() {
        let html = "<script>window.__STATE__ = {broken;</script>";
        let result = extract_state(html);
        assert!(
            matches!(result, Err(ExtractError::StateParseFailure { .. })),
            "expected StateParseFailure, got: {result:?}"
        );
    }

    #[test]
    fn unterminated_object_without_script_close_slices_at_semicolon() {
        // The balanced scanner cannot close this object; the terminator
        // fallback captures up to the `;` and the parse fails loudly.
        let html = "window.__STATE__ = {\"a\": 1; more text";
        assert!(matches!(
            extract_state(html),
            Err(ExtractError::StateParseFailure { .. })
        ));
    }
}
