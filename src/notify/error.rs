//! Error types for notification delivery.

use thiserror::Error;

use super::ChannelId;
use crate::transport::HttpError;

/// Error type for notification delivery.
///
/// The poller treats every variant the same way (log and move on), but
/// an unreachable destination is reported separately from transport
/// problems so the two can be told apart in logs.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The channel does not exist or the bot cannot see it.
    #[error("Destination channel {channel_id} cannot be resolved (status {status})")]
    DestinationUnresolvable {
        /// The configured channel.
        channel_id: ChannelId,
        /// Status returned by the chat API (403 or 404).
        status: http::StatusCode,
    },

    /// The HTTP request failed before a response arrived.
    #[error("Failed to reach chat API: {0}")]
    Transport(#[from] HttpError),

    /// The chat API refused the message for another reason.
    #[error("Chat API rejected message with status {status}{}", body_suffix(.body.as_deref()))]
    Rejected {
        /// The HTTP status returned.
        status: http::StatusCode,
        /// Response body, if it was valid UTF-8.
        body: Option<String>,
    },

    /// The message payload could not be encoded.
    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    /// The notifier was built with an unusable API base URL.
    #[error("Invalid chat API base URL '{0}'")]
    InvalidEndpoint(String),

    /// The token contains characters not allowed in an HTTP header.
    #[error("Bot token contains characters not allowed in an HTTP header")]
    InvalidToken,
}

impl NotifyError {
    /// Returns true if the destination channel could not be resolved.
    #[must_use]
    pub const fn is_unresolvable(&self) -> bool {
        matches!(self, Self::DestinationUnresolvable { .. })
    }
}

fn body_suffix(body: Option<&str>) -> String {
    body.filter(|b| !b.is_empty())
        .map(|b| format!(": {b}"))
        .unwrap_or_default()
}
