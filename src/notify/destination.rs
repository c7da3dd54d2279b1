//! Destination channel identifier.

use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use thiserror::Error;

/// Numeric identifier of the channel that receives notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(NonZeroU64);

/// Error returned when a channel ID string is not a positive integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid channel ID: expected a positive integer")]
pub struct ParseChannelIdError {
    /// The rejected input.
    pub value: String,
}

impl ChannelId {
    /// Creates a channel ID; returns `None` for zero.
    #[must_use]
    pub const fn new(id: u64) -> Option<Self> {
        match NonZeroU64::new(id) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    /// Returns the raw numeric ID.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl FromStr for ChannelId {
    type Err = ParseChannelIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<NonZeroU64>()
            .map(Self)
            .map_err(|_| ParseChannelIdError {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
