//! Address fetching trait and error types.

use std::time::Duration;

use thiserror::Error;

use super::AddressValue;
use crate::transport::HttpError;

/// Error type for address fetching operations.
///
/// Every variant is recoverable: the poller logs it and waits for the
/// next tick.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP exchange itself failed.
    #[error("Lookup request failed: {0}")]
    Http(#[from] HttpError),

    /// No response arrived within the configured bound.
    #[error("Lookup timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The lookup service answered with a non-2xx status.
    #[error("Lookup service returned status {status}")]
    Status {
        /// The HTTP status received.
        status: http::StatusCode,
    },

    /// The response body was not valid UTF-8.
    #[error("Lookup response body is not valid UTF-8")]
    InvalidBody,

    /// The response body was empty after trimming whitespace.
    #[error("Lookup response body is empty")]
    EmptyBody,
}

/// Trait for discovering the host's current public address.
///
/// # Design
///
/// - Implementations perform a single attempt; retrying is left to the
///   caller's next scheduled tick
/// - Enables dependency injection for testing with mock implementations
///
/// # Example
///
/// ```ignore
/// use wan_watch::network::{AddressFetcher, AddressValue, FetchError};
///
/// struct FixedFetcher(AddressValue);
///
/// impl AddressFetcher for FixedFetcher {
///     async fn fetch(&self) -> Result<AddressValue, FetchError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
pub trait AddressFetcher: Send + Sync {
    /// Fetches the current public address.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on network failure, timeout, non-success
    /// status or an unusable body.
    fn fetch(&self) -> impl std::future::Future<Output = Result<AddressValue, FetchError>> + Send;
}
