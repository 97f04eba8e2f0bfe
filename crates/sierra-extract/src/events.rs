//! Extractor for `dataLayer.push({...})` analytics events.

use regex::Regex;
use serde_json::Value;

use crate::scan;

/// Extract every non-overlapping `dataLayer.push({…})` object, in
/// document order.
///
/// This is a best-effort signal source: occurrences whose payload fails
/// to parse (even after the entity-decode recovery pass) are skipped with
/// a warning, never fatal. Zero occurrences yields an empty vec.
#[must_use]
pub fn extract_data_layer(html: &str) -> Vec<Value> {
    let push_re = Regex::new(r"dataLayer\.push\s*\(\s*").expect("valid regex");

    let mut objects = Vec::new();
    let mut at = 0usize;
    while let Some(m) = push_re.find_at(html, at) {
        let rest = &html[m.end()..];
        match scan::extract_balanced_object(rest) {
            Some(raw) => {
                match scan::parse_with_entity_recovery(raw) {
                    Ok(value) => objects.push(value),
                    Err(error) => {
                        tracing::warn!(
                            offset = m.start(),
                            %error,
                            "skipping unparseable dataLayer.push payload"
                        );
                    }
                }
                // Advance past the whole object so occurrences never overlap.
                at = m.end() + raw.len();
            }
            None => {
                tracing::warn!(offset = m.start(), "dataLayer.push with unterminated object");
                at = m.end();
            }
        }
    }
    objects
}
