//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments and the environment.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Chat destination configuration section
    #[serde(default)]
    pub discord: DiscordSection,

    /// Monitoring configuration
    #[serde(default)]
    pub monitor: MonitorSection,

    /// Message template configuration
    #[serde(default)]
    pub message: MessageSection,
}

/// Chat destination configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscordSection {
    /// Bot token
    pub token: Option<String>,

    /// Destination channel ID, as a TOML integer or string
    pub channel_id: Option<ChannelIdValue>,

    /// REST API base URL
    pub api_base: Option<String>,
}

/// A channel ID written either as a number or as a string.
///
/// Strings are accepted because some editors and tools mangle
/// 18-digit integers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ChannelIdValue {
    /// `channel_id = 123`
    Number(i64),
    /// `channel_id = "123"`
    Text(String),
}

impl ChannelIdValue {
    /// Returns the value as text for uniform parsing.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Monitoring configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorSection {
    /// Polling interval in seconds
    pub poll_interval: Option<u64>,

    /// Public IP lookup URL
    pub ip_service: Option<String>,

    /// Lookup timeout in seconds
    pub fetch_timeout: Option<u64>,

    /// Path to the state file
    pub state_file: Option<String>,
}

/// Message template section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageSection {
    /// Handlebars template for the first notification after startup
    pub startup: Option<String>,

    /// Handlebars template for change notifications
    pub change: Option<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# WAN-Watch Configuration File
#
# Values can also come from the environment (or a .env file):
#   DISCORD_TOKEN, NOTIFY_CHANNEL_ID, CHECK_INTERVAL
# Priority: CLI flag > environment > this file > built-in default.

[discord]
# Bot token (required)
# token = "your-bot-token"

# Channel that receives notifications (required)
# channel_id = 123456789012345678

# REST API base URL
# api_base = "https://discord.com/api/v10"

[monitor]
# Polling interval in seconds (default: 300)
poll_interval = 300

# Plain-text public IP lookup service
# ip_service = "https://api.ipify.org?format=text"

# Lookup timeout in seconds (default: 10)
# fetch_timeout = 10

# File holding the last known IP (default: last_ip.txt)
# state_file = "last_ip.txt"

[message]
# Handlebars templates overriding the built-in messages.
# Available variables: {{current}}, {{previous}}, {{first_run}}, {{timestamp}}
# startup = "Watching public IP {{current}}"
# change = "Public IP changed from {{previous}} to {{current}}"
"#
    .to_string()
}
