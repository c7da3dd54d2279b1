//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.
//! The token, channel and interval can also come from environment variables
//! (including a `.env` file loaded at startup).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// WAN-Watch: public IP change notifier
///
/// Polls the host's public IP address and posts a message to a Discord
/// channel whenever it changes.
#[derive(Debug, Parser)]
#[command(name = "wan-watch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run (default: watch and notify)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Discord bot token (required for run mode)
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// ID of the channel that receives notifications (required for run mode)
    #[arg(long = "channel-id", env = "NOTIFY_CHANNEL_ID", value_name = "ID")]
    pub channel_id: Option<String>,

    /// Polling interval in seconds
    #[arg(long = "poll-interval", env = "CHECK_INTERVAL", value_name = "SECS")]
    pub poll_interval: Option<u64>,

    /// URL of the plain-text public IP lookup service
    #[arg(long = "ip-service", value_name = "URL", global = true)]
    pub ip_service: Option<String>,

    /// Timeout for a single lookup in seconds
    #[arg(long = "fetch-timeout", value_name = "SECS", global = true)]
    pub fetch_timeout: Option<u64>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the file holding the last known IP
    #[arg(long = "state-file", global = true)]
    pub state_file: Option<PathBuf>,

    /// Test mode - record and log changes without posting messages
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for wan-watch
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the current public IP (falls back to the last known one)
    Myip,

    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "wan-watch.toml")]
        output: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    ///
    /// # Errors
    ///
    /// Returns the clap error for malformed arguments, and also for
    /// `--help`/`--version`, which clap reports through the error path.
    pub fn try_parse_args() -> Result<Self, clap::Error> {
        Self::try_parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

}
