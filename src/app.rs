//! Process-level plumbing for the binary.
//!
//! Maps failures to exit codes, prints operator hints and installs the
//! tracing subscriber. Nothing here knows about polling.

use std::process::ExitCode;

use tracing::Level;
use tracing_subscriber::EnvFilter;
use wan_watch::config::{ConfigError, field};

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Success, including `--help`, `--version` and `init`.
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Bad arguments, environment values or config file.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// The notifier could not be built, or `myip` had no address to report.
    ///
    /// A function because `ExitCode::from()` is not `const fn`.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Prints a clap error (or help/version text) and picks the exit code.
///
/// Malformed arguments or environment values are configuration errors.
pub fn report_usage(error: &clap::Error) -> ExitCode {
    let _ = error.print();
    usage_exit_code(error)
}

fn usage_exit_code(error: &clap::Error) -> ExitCode {
    if error.use_stderr() {
        exit_code::CONFIG_ERROR
    } else {
        exit_code::SUCCESS
    }
}

/// Prints a configuration error with a hint where one helps.
pub fn report_config_error(error: &ConfigError) -> ExitCode {
    eprintln!("Configuration error: {error}");

    match error {
        ConfigError::MissingRequired { field: f, .. }
            if *f == field::TOKEN || *f == field::CHANNEL_ID =>
        {
            eprintln!("\nSet it in a .env file, or run 'wan-watch init' for a config template.");
        }
        ConfigError::FileRead { .. } => {
            eprintln!("\nRun 'wan-watch init' to generate a configuration template.");
        }
        _ => {}
    }

    exit_code::CONFIG_ERROR
}

/// Builds the multi-threaded runtime, reporting failure on stderr.
pub fn build_runtime() -> Option<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .inspect_err(|e| eprintln!("Failed to create Tokio runtime: {e}"))
        .ok()
}

/// Installs the global subscriber: INFO by default, DEBUG when verbose,
/// `RUST_LOG` on top of either.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
