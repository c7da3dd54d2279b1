//! Validated configuration after merging CLI, environment and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use http::HeaderValue;
use url::Url;

use crate::monitor::MessageFormat;
use crate::notify::ChannelId;

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Settings needed to look up the address and read the saved one.
///
/// Used on its own by the `myip` query, which needs neither a token nor
/// a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    /// Public IP lookup URL
    pub ip_service: Url,

    /// Bound on a single lookup
    pub fetch_timeout: Duration,

    /// Path to the state file
    pub state_file: PathBuf,
}

impl fmt::Display for LookupConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ip_service: {}, fetch_timeout: {}s, state_file: {}",
            self.ip_service,
            self.fetch_timeout.as_secs(),
            self.state_file.display(),
        )
    }
}

impl LookupConfig {
    /// Creates the lookup settings from CLI arguments and optional TOML config.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup URL is invalid or the timeout is zero.
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let monitor = toml.map(|t| &t.monitor);

        let ip_service = cli
            .ip_service
            .as_deref()
            .or_else(|| monitor.and_then(|m| m.ip_service.as_deref()))
            .unwrap_or(defaults::IP_SERVICE_URL);
        let ip_service = parse_http_url("ip_service", ip_service)?;

        let timeout_secs = cli
            .fetch_timeout
            .or_else(|| monitor.and_then(|m| m.fetch_timeout))
            .unwrap_or(defaults::FETCH_TIMEOUT_SECS);
        let fetch_timeout = non_zero_secs("fetch_timeout", timeout_secs)?;

        let state_file = cli.state_file.clone().unwrap_or_else(|| {
            PathBuf::from(
                monitor
                    .and_then(|m| m.state_file.as_deref())
                    .unwrap_or(defaults::STATE_FILE),
            )
        });

        Ok(Self {
            ip_service,
            fetch_timeout,
            state_file,
        })
    }

    /// Loads lookup settings from CLI and the optional config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed,
    /// or the merged settings are invalid.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = load_toml(cli)?;
        Self::from_raw(cli, toml.as_ref())
    }
}

/// Fully validated configuration for the watch loop.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args (which already
/// include environment values) and an optional TOML config.
pub struct ValidatedConfig {
    /// Bot token (required)
    pub token: String,

    /// Destination channel (required)
    pub channel_id: ChannelId,

    /// Chat REST API base URL
    pub api_base: Url,

    /// Polling interval
    pub poll_interval: Duration,

    /// Lookup and state settings
    pub lookup: LookupConfig,

    /// Notification text rendering
    pub message_format: MessageFormat,

    /// Dry-run mode (record changes without posting messages)
    pub dry_run: bool,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Debug for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedConfig")
            .field("token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("api_base", &self.api_base)
            .field("poll_interval", &self.poll_interval)
            .field("lookup", &self.lookup)
            .field("message_format", &self.message_format)
            .field("dry_run", &self.dry_run)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ channel_id: {}, api_base: {}, poll_interval: {}s, {}, \
             custom_messages: {}, dry_run: {} }}",
            self.channel_id,
            self.api_base,
            self.poll_interval.as_secs(),
            self.lookup,
            self.message_format.is_custom(),
            self.dry_run,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments (and the environment variables backing them) take
    /// precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required fields are missing (`token`, `channel_id`)
    /// - The channel ID is not a positive integer
    /// - The token is blank or not header-safe
    /// - A URL is invalid
    /// - A duration is zero
    /// - A message template does not compile
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let token = Self::resolve_token(cli, toml)?;
        let channel_id = Self::resolve_channel_id(cli, toml)?;
        let api_base = Self::resolve_api_base(toml)?;
        let poll_interval = Self::resolve_poll_interval(cli, toml)?;
        let lookup = LookupConfig::from_raw(cli, toml)?;
        let message_format = Self::build_message_format(toml)?;

        Ok(Self {
            token,
            channel_id,
            api_base,
            poll_interval,
            lookup,
            message_format,
            dry_run: cli.dry_run,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = load_toml(cli)?;
        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_token(cli: &Cli, toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        let token = cli
            .token
            .as_deref()
            .or_else(|| toml.and_then(|t| t.discord.token.as_deref()))
            .ok_or_else(|| {
                ConfigError::missing(
                    field::TOKEN,
                    "Use --token, set DISCORD_TOKEN, or set discord.token in config file",
                )
            })?
            .trim();

        if token.is_empty() {
            return Err(ConfigError::InvalidToken {
                reason: "must not be empty",
            });
        }

        if HeaderValue::from_str(token).is_err() {
            return Err(ConfigError::InvalidToken {
                reason: "contains characters not allowed in an HTTP header",
            });
        }

        Ok(token.to_string())
    }

    fn resolve_channel_id(cli: &Cli, toml: Option<&TomlConfig>) -> Result<ChannelId, ConfigError> {
        let raw = cli
            .channel_id
            .clone()
            .or_else(|| {
                toml.and_then(|t| t.discord.channel_id.as_ref())
                    .map(super::toml::ChannelIdValue::to_text)
            })
            .ok_or_else(|| {
                ConfigError::missing(
                    field::CHANNEL_ID,
                    "Use --channel-id, set NOTIFY_CHANNEL_ID, or set discord.channel_id in config file",
                )
            })?;

        raw.parse::<ChannelId>()
            .map_err(|e| ConfigError::InvalidChannelId { value: e.value })
    }

    fn resolve_api_base(toml: Option<&TomlConfig>) -> Result<Url, ConfigError> {
        let base = toml
            .and_then(|t| t.discord.api_base.as_deref())
            .unwrap_or(defaults::API_BASE);
        parse_http_url("api_base", base)
    }

    fn resolve_poll_interval(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Duration, ConfigError> {
        // Priority: CLI explicit (or env) > TOML > default
        let seconds = cli
            .poll_interval
            .or_else(|| toml.and_then(|t| t.monitor.poll_interval))
            .unwrap_or(defaults::POLL_INTERVAL_SECS);

        non_zero_secs("poll_interval", seconds)
    }

    fn build_message_format(toml: Option<&TomlConfig>) -> Result<MessageFormat, ConfigError> {
        let message = toml.map(|t| &t.message);
        let startup = message.and_then(|m| m.startup.as_deref());
        let change = message.and_then(|m| m.change.as_deref());

        Ok(MessageFormat::new(startup, change)?)
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

fn load_toml(cli: &Cli) -> Result<Option<TomlConfig>, ConfigError> {
    cli.config
        .as_deref()
        .map(TomlConfig::load)
        .transpose()
}

fn parse_http_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        field,
        url: value.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            field,
            url: value.to_string(),
            reason: "scheme must be http or https".to_string(),
        });
    }

    Ok(url)
}

fn non_zero_secs(field: &'static str, seconds: u64) -> Result<Duration, ConfigError> {
    if seconds == 0 {
        return Err(ConfigError::InvalidDuration {
            field,
            reason: "must be greater than 0".to_string(),
        });
    }

    Ok(Duration::from_secs(seconds))
}
