//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

use crate::monitor::TemplateError;

/// Error type for configuration operations.
///
/// Every variant is fatal: the process reports it and exits before any
/// polling starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Missing required field that must be provided by CLI, environment or config file.
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired {
        /// Name of the missing field
        field: &'static str,
        /// Hint for how to provide the value
        hint: &'static str,
    },

    /// Invalid URL provided.
    #[error("Invalid URL for {field} '{url}': {reason}")]
    InvalidUrl {
        /// Name of the field
        field: &'static str,
        /// The invalid URL string
        url: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid duration value (zero).
    #[error("Invalid duration for {field}: {reason}")]
    InvalidDuration {
        /// Name of the field
        field: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Channel ID is not a positive integer.
    #[error("Invalid channel ID '{value}': expected a positive integer")]
    InvalidChannelId {
        /// The rejected value
        value: String,
    },

    /// Token is empty or cannot be sent in an HTTP header.
    #[error("Invalid token: {reason}")]
    InvalidToken {
        /// Reason for invalidity
        reason: &'static str,
    },

    /// A message template does not compile.
    #[error(transparent)]
    InvalidTemplate(#[from] TemplateError),
}

/// Well-known field names for `MissingRequired` errors.
///
/// Use these constants for compile-time safety when matching field names.
pub mod field {
    /// The bot token field.
    pub const TOKEN: &str = "token";
    /// The destination channel field.
    pub const CHANNEL_ID: &str = "channel_id";
}

impl ConfigError {
    /// Creates a `MissingRequired` error for a required field.
    #[must_use]
    pub const fn missing(field: &'static str, hint: &'static str) -> Self {
        Self::MissingRequired { field, hint }
    }
}
