//! Client for the third-party rendering proxy.
//!
//! The proxy executes the page's JavaScript and returns the hydrated
//! HTML, so all of the extraction pipeline's embedded sources are
//! present even when the origin serves a near-empty shell to plain
//! clients.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::FetchError;

pub struct RenderFetcher {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl RenderFetcher {
    /// Creates a client for the rendering proxy at `base_url`. The API
    /// key is mandatory for this strategy; config enforces its presence
    /// before this constructor runs.
    ///
    /// # Errors
    ///
    /// [`FetchError::Http`] if the client cannot be constructed,
    /// [`FetchError::InvalidUrl`] if `base_url` does not parse.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
        api_key: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let base_url = Url::parse(base_url).map_err(|e| FetchError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    /// Fetches `url` through the proxy and returns the rendered HTML.
    ///
    /// # Errors
    ///
    /// [`FetchError::UpstreamStatus`] on a non-2xx proxy response (the
    /// proxy passes origin failures through as its own status);
    /// [`FetchError::Http`] on transport failure.
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let mut request_url = self.base_url.clone();
        request_url
            .query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("url", url);

        let response = self.client.get(request_url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                target = url,
                "rendering proxy returned an error"
            );
            return Err(FetchError::UpstreamStatus {
                status: status.as_u16(),
                url: url.to_string(),
                snippet: body.chars().take(200).collect(),
            });
        }
        Ok(body)
    }
}
