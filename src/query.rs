//! On-demand "what is my IP" query.
//!
//! Answers with a freshly fetched address when the lookup works and falls
//! back to the last saved one otherwise. Never writes state.

use std::fmt;

use thiserror::Error;

use crate::network::{AddressFetcher, AddressValue, FetchError};
use crate::state::StateStore;

/// Where a reported address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSource {
    /// Fetched just now.
    Fresh,
    /// Read from the state file because the lookup failed.
    LastKnown,
}

/// Answer to an address query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressReport {
    /// The reported address.
    pub address: AddressValue,
    /// Where it came from.
    pub source: AddressSource,
}

impl fmt::Display for AddressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            AddressSource::Fresh => write!(f, "{}", self.address),
            AddressSource::LastKnown => write!(f, "{} (last known)", self.address),
        }
    }
}

/// Error returned when no address can be reported.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The lookup failed and no address was saved.
    #[error("Public IP unavailable: {0}")]
    Unavailable(#[source] FetchError),
}

/// Reports the current public address.
///
/// # Errors
///
/// Returns [`QueryError::Unavailable`] if the lookup fails and the store
/// holds no address.
pub async fn query_address<F, S>(fetcher: &F, store: &S) -> Result<AddressReport, QueryError>
where
    F: AddressFetcher,
    S: StateStore,
{
    match fetcher.fetch().await {
        Ok(address) => Ok(AddressReport {
            address,
            source: AddressSource::Fresh,
        }),
        Err(e) => {
            tracing::warn!("Failed to fetch public IP, using last known value: {e}");
            store
                .load()
                .into_address()
                .map(|address| AddressReport {
                    address,
                    source: AddressSource::LastKnown,
                })
                .ok_or(QueryError::Unavailable(e))
        }
    }
}
