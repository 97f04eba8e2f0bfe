//! Case-insensitive marketing-signal scans over the full document text.

use regex::Regex;
use sierra_core::ProductFlags;

/// Scan for clearance and low-stock wording. Pure function of the text;
/// the three tests are independent.
#[must_use]
pub fn scan_flags(html: &str) -> ProductFlags {
    let lower = html.to_lowercase();
    let almost_gone_re = Regex::new(r"almost\s+gone").expect("valid regex");
    let only_one_re =
        Regex::new(r"only\s+(?:one|1)\s+(?:left|in\s+stock)").expect("valid regex");

    ProductFlags {
        clearance: lower.contains("clearance"),
        almost_gone: almost_gone_re.is_match(&lower),
        only_one_left: only_one_re.is_match(&lower),
    }
}
