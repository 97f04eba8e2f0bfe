use thiserror::Error;

/// Errors raised by the extraction pipeline.
///
/// `StateNotFound` and `EventLayerNotFound` mean the expected data is
/// absent from the document (a normal condition for some page layouts);
/// `StateParseFailure` means the data is present but malformed, which is
/// worth logging distinctly. None of these are worth retrying; the HTML
/// has already been fetched and will not change.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No `window.__STATE__ = {...}` assignment anywhere in the document.
    #[error("no window.__STATE__ assignment found in document")]
    StateNotFound,

    /// The state payload would not parse as JSON, even after the single
    /// HTML-entity recovery pass.
    #[error("window.__STATE__ payload is not valid JSON: {source}")]
    StateParseFailure {
        #[source]
        source: serde_json::Error,
    },

    /// The document carries no product signal at all: no event-layer
    /// detail entry and a fallback scan that produced neither a price nor
    /// a title.
    #[error("document carries no product data (no detail event, no usable fallback fields)")]
    EventLayerNotFound,

    /// The inventory item collection is missing or empty. An empty-but-
    /// present product page is not a valid result.
    #[error("inventory response contains no items")]
    NoItems,
}
