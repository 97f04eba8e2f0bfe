//! Outbound HTTP for the extraction service: direct origin fetch with
//! cookie capture, the rendering-proxy client, and the inventory API
//! flow. The extraction core never touches the network; it consumes
//! whatever document these fetchers produce.

pub mod cookies;
pub mod direct;
pub mod error;
pub mod render;

pub use cookies::CookieJar;
pub use direct::DirectFetcher;
pub use error::FetchError;
pub use render::RenderFetcher;

/// The configured way of turning a PDP URL into raw HTML.
pub enum PageFetcher {
    Direct(DirectFetcher),
    Render(RenderFetcher),
}

impl PageFetcher {
    /// Fetch the document for `url` using the configured strategy.
    ///
    /// # Errors
    ///
    /// Propagates the underlying fetcher's [`FetchError`].
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        match self {
            PageFetcher::Direct(fetcher) => fetcher.fetch_page(url).await,
            PageFetcher::Render(fetcher) => fetcher.fetch_page(url).await,
        }
    }
}
