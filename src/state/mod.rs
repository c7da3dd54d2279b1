//! Last-known address persistence across restarts.
//!
//! This module provides the [`StateStore`] abstraction and its file-backed
//! implementation [`FileStateStore`].

mod file;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use file::FileStateStore;

use std::io;

use thiserror::Error;

use crate::network::AddressValue;

/// Result of loading state from persistent storage.
///
/// Explicitly models all valid states to avoid ambiguity:
/// - A previously saved address
/// - No previous address (first run, or an empty file)
/// - A file that exists but does not hold text
/// - A file that exists but could not be read at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult {
    /// Successfully loaded the previously saved address.
    Loaded(AddressValue),

    /// No state file exists, or it holds only whitespace.
    NotFound,

    /// State file exists but its content is not valid UTF-8.
    /// Callers treat this as no prior state; the next save overwrites it.
    Corrupted {
        /// Reason for corruption (for logging).
        reason: String,
    },

    /// State file exists but reading it failed (permissions, I/O error).
    /// Callers cannot tell whether a prior address exists.
    Unreadable {
        /// Underlying error description (for logging).
        reason: String,
    },
}

impl LoadResult {
    /// Returns the loaded address, if any.
    #[must_use]
    pub fn into_address(self) -> Option<AddressValue> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::NotFound | Self::Corrupted { .. } | Self::Unreadable { .. } => None,
        }
    }

    /// Returns `true` if an address was successfully loaded.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Errors that can occur while saving state.
///
/// Only covers write-side errors; read-side issues are modeled
/// as [`LoadResult`] variants.
#[derive(Debug, Error)]
pub enum StateError {
    /// Failed to write or rename the state file.
    #[error("Failed to write state file: {0}")]
    Write(#[source] io::Error),

    /// The blocking write task did not complete.
    #[error("State write task failed: {0}")]
    Task(#[source] tokio::task::JoinError),
}

/// Abstraction for persisting the last-known address between runs.
///
/// Implementations should:
/// - Use atomic writes so no reader ever observes a truncated value
/// - Handle missing files gracefully (return `LoadResult::NotFound`)
/// - Report read failures as [`LoadResult::Unreadable`] rather than absence
///
/// # Testing
///
/// Use [`mock::MockStateStore`] in tests to avoid filesystem dependencies.
pub trait StateStore: Send + Sync {
    /// Loads the previously saved address.
    fn load(&self) -> LoadResult;

    /// Replaces the saved address with `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be written.
    fn save(
        &self,
        value: &AddressValue,
    ) -> impl std::future::Future<Output = Result<(), StateError>> + Send;
}
