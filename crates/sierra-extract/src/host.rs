//! Permitted-domain gate for candidate PDP URLs.

/// Whether `url`'s hostname ends with the permitted root-domain suffix.
///
/// Comparison is case-insensitive on both sides. Any parse failure
/// (malformed URL, missing host) rejects; this function never fails.
#[must_use]
pub fn host_allowed(url: &str, allowed_suffix: &str) -> bool {
    let suffix = allowed_suffix.to_lowercase();
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .is_some_and(|host| host.ends_with(&suffix))
}
