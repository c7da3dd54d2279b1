//! The public address value.

use std::fmt;

use serde::Serialize;

/// A public network address as reported by the lookup service.
///
/// The value is opaque text: it is compared by string equality and never
/// parsed as an IP address. Surrounding whitespace is stripped on
/// construction and a value is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AddressValue(String);

impl AddressValue {
    /// Builds a value from raw text, trimming surrounding whitespace.
    ///
    /// Returns `None` if nothing is left after trimming.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the address text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AddressValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AddressValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
