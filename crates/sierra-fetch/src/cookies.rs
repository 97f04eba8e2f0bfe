//! Minimal cookie jar for the direct-fetch strategy.
//!
//! The origin hands out session cookies across redirect hops and expects
//! them back on its JSON API. Attributes (Path, Expires, etc.) are
//! ignored; only name=value pairs matter for this exchange.

/// Name → value mapping, unique names, last-write-wins, insertion order
/// preserved for the outgoing header.
#[derive(Debug, Default, Clone)]
pub struct CookieJar {
    entries: Vec<(String, String)>,
}

impl CookieJar {
    /// Merge one `Set-Cookie` header value: take the leading `name=value`
    /// pair, drop the attributes. Empty names or values are ignored.
    pub fn merge_set_cookie(&mut self, header_value: &str) {
        let Some(pair) = header_value.split(';').next() else {
            return;
        };
        let Some(eq) = pair.find('=') else {
            return;
        };
        let name = pair[..eq].trim();
        let value = pair[eq + 1..].trim();
        if name.is_empty() || value.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.entries.push((name.to_string(), value.to_string())),
        }
    }

    /// `Cookie` header value (`a=1; b=2`), or `None` when the jar is empty.
    #[must_use]
    pub fn header_value(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        Some(
            self.entries
                .iter()
                .map(|(n, v)| format!("{n}={v}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_are_dropped() {
        let mut jar = CookieJar::default();
        jar.merge_set_cookie("session=abc123; Path=/; HttpOnly; Secure");
        assert_eq!(jar.get("session"), Some("abc123"));
        assert_eq!(jar.header_value().as_deref(), Some("session=abc123"));
    }

    #[test]
    fn last_write_wins_keeps_position() {
        let mut jar = CookieJar::default();
        jar.merge_set_cookie("a=1");
        jar.merge_set_cookie("b=2");
        jar.merge_set_cookie("a=3");
        assert_eq!(jar.header_value().as_deref(), Some("a=3; b=2"));
    }

    #[test]
    fn values_containing_equals_are_kept_whole() {
        let mut jar = CookieJar::default();
        jar.merge_set_cookie("token=x=y=z; Path=/");
        assert_eq!(jar.get("token"), Some("x=y=z"));
    }

    #[test]
    fn malformed_headers_are_ignored() {
        let mut jar = CookieJar::default();
        jar.merge_set_cookie("no-equals-sign");
        jar.merge_set_cookie("=value-without-name");
        jar.merge_set_cookie("name=");
        assert!(jar.is_empty());
        assert!(jar.header_value().is_none());
    }
}
