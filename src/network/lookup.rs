//! HTTP lookup of the public address.

use std::time::Duration;

use http::HeaderValue;
use http::header::ACCEPT;

use super::{AddressFetcher, AddressValue, FetchError};
use crate::transport::{HttpClient, HttpRequest};

#[cfg(test)]
#[path = "lookup_tests.rs"]
mod tests;

/// Fetches the public address from a plain-text lookup service.
///
/// Issues a single `GET` per call, bounded by the configured timeout, and
/// uses the trimmed response body as the address.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use wan_watch::network::HttpAddressFetcher;
/// use wan_watch::transport::ReqwestClient;
/// use url::Url;
///
/// let fetcher = HttpAddressFetcher::new(
///     ReqwestClient::new(),
///     Url::parse("https://api.ipify.org?format=text").unwrap(),
/// )
/// .with_timeout(Duration::from_secs(5));
/// assert_eq!(fetcher.timeout(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct HttpAddressFetcher<H> {
    client: H,
    url: url::Url,
    timeout: Duration,
}

impl<H> HttpAddressFetcher<H> {
    /// Default bound on a single lookup.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a fetcher for `url` with the default timeout.
    #[must_use]
    pub const fn new(client: H, url: url::Url) -> Self {
        Self {
            client,
            url,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the bound on a single lookup.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the lookup URL.
    #[must_use]
    pub const fn url(&self) -> &url::Url {
        &self.url
    }

    /// Returns the lookup timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<H: HttpClient> AddressFetcher for HttpAddressFetcher<H> {
    async fn fetch(&self) -> Result<AddressValue, FetchError> {
        let request = HttpRequest::get(self.url.clone())
            .with_header(ACCEPT, HeaderValue::from_static("text/plain"));

        let response = match tokio::time::timeout(self.timeout, self.client.request(request)).await
        {
            Ok(result) => result?,
            Err(_) => return Err(FetchError::Timeout(self.timeout)),
        };

        if !response.is_success() {
            return Err(FetchError::Status {
                status: response.status,
            });
        }

        let text = response.body_text().ok_or(FetchError::InvalidBody)?;
        AddressValue::parse(text).ok_or(FetchError::EmptyBody)
    }
}
