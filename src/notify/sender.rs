//! Notifier trait and Discord channel implementation.

use std::time::Duration;

use http::HeaderValue;
use http::header::AUTHORIZATION;
use serde::Serialize;

use super::{ChannelId, NotifyError};
use crate::transport::{HttpClient, HttpError, HttpRequest};

#[cfg(test)]
#[path = "sender_tests.rs"]
mod tests;

/// Default base URL of the Discord REST API.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Default bound on a single send.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for delivering a notification message to the configured destination.
///
/// This abstraction keeps the poller independent of the chat platform and
/// enables testing with mocks.
pub trait Notifier: Send + Sync {
    /// Sends `message` to the destination.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::DestinationUnresolvable`] if the destination
    /// cannot be found, and other variants for transport or API failures.
    fn send(
        &self,
        message: &str,
    ) -> impl std::future::Future<Output = Result<(), NotifyError>> + Send;
}

/// Posts messages to a single Discord channel over the REST API.
///
/// Each send is one `POST {api_base}/channels/{id}/messages` with a
/// `{"content": ...}` JSON body and `Authorization: Bot <token>`.
/// No retries: a failed send is reported and the next change gets a
/// fresh attempt. A send that takes longer than the configured timeout
/// (default [`DEFAULT_SEND_TIMEOUT`]) fails with [`HttpError::Timeout`].
///
/// # Example
///
/// ```
/// use wan_watch::notify::{ChannelId, ChannelNotifier, DEFAULT_API_BASE};
/// use wan_watch::transport::ReqwestClient;
/// use url::Url;
///
/// let notifier = ChannelNotifier::new(
///     ReqwestClient::new(),
///     &Url::parse(DEFAULT_API_BASE).unwrap(),
///     ChannelId::new(123_456_789).unwrap(),
///     "bot-token",
/// )
/// .unwrap();
/// assert_eq!(
///     notifier.endpoint().as_str(),
///     "https://discord.com/api/v10/channels/123456789/messages"
/// );
/// ```
pub struct ChannelNotifier<H> {
    client: H,
    channel_id: ChannelId,
    endpoint: url::Url,
    authorization: HeaderValue,
    timeout: Duration,
}

impl<H> std::fmt::Debug for ChannelNotifier<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelNotifier")
            .field("channel_id", &self.channel_id)
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct MessagePayload<'a> {
    content: &'a str,
}

impl<H> ChannelNotifier<H> {
    /// Creates a notifier for `channel_id`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::InvalidEndpoint`] if `api_base` cannot carry a
    /// path, and [`NotifyError::InvalidToken`] if `token` is not a valid
    /// header value.
    pub fn new(
        client: H,
        api_base: &url::Url,
        channel_id: ChannelId,
        token: &str,
    ) -> Result<Self, NotifyError> {
        let endpoint = channel_endpoint(api_base, channel_id)?;

        let mut authorization =
            HeaderValue::from_str(&format!("Bot {token}")).map_err(|_| NotifyError::InvalidToken)?;
        authorization.set_sensitive(true);

        Ok(Self {
            client,
            channel_id,
            endpoint,
            authorization,
            timeout: DEFAULT_SEND_TIMEOUT,
        })
    }

    /// Sets the bound on a single send.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the bound on a single send.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the configured destination.
    #[must_use]
    pub const fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    /// Returns the URL messages are posted to.
    #[must_use]
    pub const fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }
}

fn channel_endpoint(api_base: &url::Url, channel_id: ChannelId) -> Result<url::Url, NotifyError> {
    let mut endpoint = api_base.clone();
    let id = channel_id.to_string();
    endpoint
        .path_segments_mut()
        .map_err(|()| NotifyError::InvalidEndpoint(api_base.to_string()))?
        .pop_if_empty()
        .extend(["channels", id.as_str(), "messages"]);
    Ok(endpoint)
}

impl<H: HttpClient> Notifier for ChannelNotifier<H> {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let request = HttpRequest::post(self.endpoint.clone())
            .with_header(AUTHORIZATION, self.authorization.clone())
            .with_json(&MessagePayload { content: message })?;

        let response = tokio::time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| HttpError::Timeout)??;

        if response.is_success() {
            return Ok(());
        }

        match response.status {
            http::StatusCode::NOT_FOUND | http::StatusCode::FORBIDDEN => {
                Err(NotifyError::DestinationUnresolvable {
                    channel_id: self.channel_id,
                    status: response.status,
                })
            }
            status => Err(NotifyError::Rejected {
                status,
                body: response.body_text().map(ToString::to_string),
            }),
        }
    }
}
