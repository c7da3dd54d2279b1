//! Configuration layer for WAN-Watch.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`], [`LookupConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments**
//! 2. **Environment variables** - `DISCORD_TOKEN`, `NOTIFY_CHANNEL_ID`, `CHECK_INTERVAL`;
//!    a `.env` file in the working directory is loaded first
//! 3. **TOML config file**
//! 4. **Built-in defaults**
//!
//! The token and channel ID have no defaults and are only required when
//! running the watch loop; the `myip` query works without them.
//!
//! # TOML-Only Options
//!
//! `discord.api_base`, `message.startup` and `message.change` can only be
//! set in a config file.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;


pub use cli::{Cli, Command};
pub use error::{ConfigError, field};
pub use toml::{ChannelIdValue, TomlConfig, default_config_template};
pub use validated::{LookupConfig, ValidatedConfig, write_default_config};
