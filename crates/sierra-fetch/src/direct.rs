//! Direct origin fetch: manual redirect following with cookie capture,
//! and the SKU inventory API flow with its single warm-and-retry cycle.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::cookies::CookieJar;
use crate::error::FetchError;

/// Maximum redirect hops before giving up.
const MAX_HOPS: usize = 5;

/// Bytes of upstream body carried into an error message.
const SNIPPET_LEN: usize = 200;

/// Fetches origin pages directly, following redirects by hand so that
/// `Set-Cookie` headers from every hop land in the jar. The origin's
/// inventory API rejects requests without the session cookies its PDP
/// redirect chain hands out.
#[derive(Clone)]
pub struct DirectFetcher {
    client: Client,
    inventory_base: Url,
}

impl DirectFetcher {
    /// Creates a fetcher with configured timeout and browser `User-Agent`.
    ///
    /// `inventory_base_url` is the origin for `api/product/inventory/…`
    /// requests; point it at a mock server in tests.
    ///
    /// # Errors
    ///
    /// [`FetchError::Http`] if the client cannot be constructed,
    /// [`FetchError::InvalidUrl`] if the base URL does not parse.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        inventory_base_url: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let inventory_base =
            Url::parse(inventory_base_url).map_err(|e| FetchError::InvalidUrl {
                url: inventory_base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            inventory_base,
        })
    }

    /// Fetches a PDP and returns its HTML.
    ///
    /// # Errors
    ///
    /// - [`FetchError::UpstreamStatus`]: final hop was not 2xx.
    /// - [`FetchError::TooManyRedirects`]: more than 5 hops.
    /// - [`FetchError::Http`]: transport failure.
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let mut jar = CookieJar::default();
        let response = self.fetch_with_redirects(url, &mut jar).await?;
        let status = response.status();
        let final_url = response.url().to_string();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(FetchError::UpstreamStatus {
                status: status.as_u16(),
                url: final_url,
                snippet: snippet(&body),
            });
        }
        Ok(body)
    }

    /// Inventory API flow: warm the PDP for session cookies, call the
    /// API, and on a non-200 run exactly one warm-and-retry cycle. No
    /// further retries, no backoff.
    ///
    /// Returns the raw JSON body for the caller to deserialize.
    ///
    /// # Errors
    ///
    /// [`FetchError::UpstreamStatus`] with the upstream status and a body
    /// snippet when the retry also fails; [`FetchError::Http`] on
    /// transport failure; [`FetchError::InvalidUrl`] if `item_code`
    /// cannot form a URL path segment.
    pub async fn fetch_inventory(
        &self,
        item_code: &str,
        page_url: &str,
    ) -> Result<String, FetchError> {
        let api_url = self.inventory_url(item_code)?;

        let mut jar = CookieJar::default();
        self.warm(page_url, &mut jar).await?;

        let mut response = self.inventory_request(&api_url, page_url, &jar).await?;
        if response.status() != StatusCode::OK {
            tracing::info!(
                status = response.status().as_u16(),
                item_code,
                "inventory request rejected, warming cookies and retrying once"
            );
            self.warm(page_url, &mut jar).await?;
            response = self.inventory_request(&api_url, page_url, &jar).await?;
        }

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(FetchError::UpstreamStatus {
                status: status.as_u16(),
                url: api_url.to_string(),
                snippet: snippet(&body),
            });
        }
        Ok(body)
    }

    /// One GET against the inventory API with browser headers, Referer,
    /// and whatever cookies the jar holds.
    async fn inventory_request(
        &self,
        api_url: &Url,
        page_url: &str,
        jar: &CookieJar,
    ) -> Result<reqwest::Response, FetchError> {
        let mut request = self
            .client
            .get(api_url.clone())
            .header(reqwest::header::ACCEPT, "application/json, text/plain, */*")
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(reqwest::header::REFERER, page_url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache");
        if let Some(cookies) = jar.header_value() {
            request = request.header(reqwest::header::COOKIE, cookies);
        }
        Ok(request.send().await?)
    }

    /// Loads the PDP purely for its cookies; the final status does not
    /// matter here, only the `Set-Cookie` headers along the chain.
    async fn warm(&self, page_url: &str, jar: &mut CookieJar) -> Result<(), FetchError> {
        let response = self.fetch_with_redirects(page_url, jar).await?;
        tracing::debug!(
            status = response.status().as_u16(),
            cookies = jar.len(),
            "warmed origin session"
        );
        Ok(())
    }

    /// GET with manual redirect following (limit 5 hops), merging every
    /// hop's `Set-Cookie` headers into `jar`. Returns the first
    /// non-redirect response, or the last response if it has no
    /// `Location` header.
    async fn fetch_with_redirects(
        &self,
        url: &str,
        jar: &mut CookieJar,
    ) -> Result<reqwest::Response, FetchError> {
        let mut current = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        for _ in 0..MAX_HOPS {
            let mut request = self
                .client
                .get(current.clone())
                .header(
                    reqwest::header::ACCEPT,
                    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
                )
                .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                .header(reqwest::header::CACHE_CONTROL, "no-cache")
                .header(reqwest::header::PRAGMA, "no-cache");
            if let Some(cookies) = jar.header_value() {
                request = request.header(reqwest::header::COOKIE, cookies);
            }
            let response = request.send().await?;

            for value in response.headers().get_all(reqwest::header::SET_COOKIE) {
                if let Ok(raw) = value.to_str() {
                    jar.merge_set_cookie(raw);
                }
            }

            if !is_redirect(response.status()) {
                return Ok(response);
            }
            let Some(location) = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
            else {
                return Ok(response);
            };
            current = current.join(location).map_err(|e| FetchError::InvalidUrl {
                url: location.to_string(),
                reason: e.to_string(),
            })?;
        }

        Err(FetchError::TooManyRedirects {
            url: url.to_string(),
            max_hops: MAX_HOPS,
        })
    }

    /// `{base}/api/product/inventory/{itemCode}`, with the item code
    /// percent-encoded as a path segment.
    fn inventory_url(&self, item_code: &str) -> Result<Url, FetchError> {
        let mut url = self.inventory_base.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidUrl {
                url: self.inventory_base.to_string(),
                reason: "cannot-be-a-base URL".to_string(),
            })?
            .pop_if_empty()
            .extend(["api", "product", "inventory", item_code]);
        Ok(url)
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

fn snippet(body: &str) -> String {
    if body.len() <= SNIPPET_LEN {
        return body.trim().to_string();
    }
    let mut end = SNIPPET_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_url_encodes_item_code() {
        let fetcher = DirectFetcher::new(30, "test", "https://www.sierra.com").unwrap();
        let url = fetcher.inventory_url("AB 12/3").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.sierra.com/api/product/inventory/AB%2012%2F3"
        );
    }

    #[test]
    fn inventory_url_plain_code() {
        let fetcher = DirectFetcher::new(30, "test", "https://www.sierra.com").unwrap();
        let url = fetcher.inventory_url("7KUGA").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.sierra.com/api/product/inventory/7KUGA"
        );
    }

    #[test]
    fn redirect_statuses_are_the_explicit_set() {
        for code in [301u16, 302, 303, 307, 308] {
            assert!(is_redirect(StatusCode::from_u16(code).unwrap()), "{code}");
        }
        for code in [200u16, 204, 300, 304, 404] {
            assert!(!is_redirect(StatusCode::from_u16(code).unwrap()), "{code}");
        }
    }

    #[test]
    fn snippet_truncates_long_bodies() {
        let long = "x".repeat(1000);
        assert_eq!(snippet(&long).len(), SNIPPET_LEN);
        assert_eq!(snippet("short"), "short");
    }
}
