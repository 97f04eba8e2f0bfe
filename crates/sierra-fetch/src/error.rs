use thiserror::Error;

/// Errors from the outbound fetch layer.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A URL could not be parsed or extended.
    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The redirect chain exceeded the hop limit.
    #[error("too many redirects fetching {url} (limit {max_hops})")]
    TooManyRedirects { url: String, max_hops: usize },

    /// Non-success status from upstream, with a body snippet for the
    /// error surface. Emitted only after the single warm-and-retry cycle
    /// where one applies.
    #[error("upstream {status} from {url}: {snippet}")]
    UpstreamStatus {
        status: u16,
        url: String,
        snippet: String,
    },
}
