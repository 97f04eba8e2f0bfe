//! Meta-tag and inline-text fallback extraction.
//!
//! Used when no structured source yields a field. Each of the four
//! fields is attempted independently; any subset may be present. The
//! patterns are intentionally literal; which upstream page layout
//! exercises this path is undocumented, so precision beyond the observed
//! patterns buys nothing.

use regex::Regex;

/// Fields recoverable from `<meta>` tags and loose inline text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaFallback {
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub availability: Option<String>,
    pub title: Option<String>,
}

/// Scan the document for fallback product fields.
#[must_use]
pub fn extract_meta_fallback(html: &str) -> MetaFallback {
    MetaFallback {
        price: extract_price(html),
        currency: extract_currency(html),
        availability: meta_content(html, "og:availability"),
        title: extract_title(html),
    }
}

/// Price cascade, first match wins:
/// `product:price:amount` meta → `"price": <n>` text → `$<n>` text.
fn extract_price(html: &str) -> Option<f64> {
    if let Some(amount) = meta_content(html, "product:price:amount") {
        if let Ok(value) = amount.trim().parse::<f64>() {
            return Some(value);
        }
    }

    let json_price_re = Regex::new(r#""price"\s*:\s*(\d+(?:\.\d+)?)"#).expect("valid regex");
    if let Some(cap) = json_price_re.captures(html) {
        if let Ok(value) = cap[1].parse::<f64>() {
            return Some(value);
        }
    }

    let dollar_re = Regex::new(r"\$\s?(\d+(?:\.\d+)?)").expect("valid regex");
    dollar_re
        .captures(html)
        .and_then(|cap| cap[1].parse::<f64>().ok())
}

/// `product:price:currency` meta, accepted only as a 3-letter code.
fn extract_currency(html: &str) -> Option<String> {
    let raw = meta_content(html, "product:price:currency")?;
    let code = raw.trim();
    (code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()))
        .then(|| code.to_uppercase())
}

fn extract_title(html: &str) -> Option<String> {
    let title_re = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex");
    title_re
        .captures(html)
        .map(|cap| cap[1].trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Content of the first `<meta>` tag whose `property` (or `name`) equals
/// `property`. Handles both attribute orders.
fn meta_content(html: &str, property: &str) -> Option<String> {
    let escaped = regex::escape(property);
    let fwd = Regex::new(&format!(
        r#"(?is)<meta\b[^>]*(?:property|name)\s*=\s*["']{escaped}["'][^>]*content\s*=\s*["']([^"']*)["']"#
    ))
    .expect("valid regex");
    let rev = Regex::new(&format!(
        r#"(?is)<meta\b[^>]*content\s*=\s*["']([^"']*)["'][^>]*(?:property|name)\s*=\s*["']{escaped}["']"#
    ))
    .expect("valid regex");

    fwd.captures(html)
        .or_else(|| rev.captures(html))
        .map(|cap| cap[1].trim().to_string())
        .filter(|c| !c.is_empty())
}
