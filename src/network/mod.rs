//! Network layer for discovering the host's public address.
//!
//! This module provides:
//! - The address value type ([`AddressValue`])
//! - The fetch abstraction ([`AddressFetcher`], [`FetchError`])
//! - The HTTP lookup implementation ([`HttpAddressFetcher`])

mod address;
mod fetcher;
mod lookup;

pub use address::AddressValue;
pub use fetcher::{AddressFetcher, FetchError};
pub use lookup::HttpAddressFetcher;
