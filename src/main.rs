//! WAN-Watch: public IP change notifier
//!
//! Entry point for the wan-watch application.

use std::process::ExitCode;

use wan_watch::config::{Cli, Command, LookupConfig, ValidatedConfig, write_default_config};

mod app;
mod run;

use app::{build_runtime, exit_code, report_config_error, report_usage, setup_tracing};

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    // A missing .env file is fine; real environment variables still apply
    let _ = dotenvy::dotenv();

    let cli = match Cli::try_parse_args() {
        Ok(cli) => cli,
        Err(e) => return report_usage(&e),
    };

    match &cli.command {
        Some(Command::Init { output }) => return handle_init(output),
        Some(Command::Myip) => return handle_myip(&cli),
        None => {}
    }

    let config = match ValidatedConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => return report_config_error(&e),
    };

    setup_tracing(config.verbose);
    tracing::info!("{config}");

    run_application(config)
}

/// Handles the `init` subcommand.
fn handle_init(output: &std::path::Path) -> ExitCode {
    match write_default_config(output) {
        Ok(()) => {
            println!("Configuration template written to: {}", output.display());
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::CONFIG_ERROR
        }
    }
}

/// Handles the `myip` subcommand.
///
/// Excluded from coverage - performs a real lookup.
#[cfg(not(tarpaulin_include))]
fn handle_myip(cli: &Cli) -> ExitCode {
    let lookup = match LookupConfig::load(cli) {
        Ok(lookup) => lookup,
        Err(e) => return report_config_error(&e),
    };

    setup_tracing(cli.verbose);

    let Some(runtime) = build_runtime() else {
        return exit_code::runtime_error();
    };

    match runtime.block_on(run::query(lookup)) {
        Ok(report) => {
            println!("{report}");
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::runtime_error()
        }
    }
}

/// Runs the watch loop with the given configuration.
///
/// Excluded from coverage - requires async runtime.
#[cfg(not(tarpaulin_include))]
fn run_application(config: ValidatedConfig) -> ExitCode {
    let Some(runtime) = build_runtime() else {
        return exit_code::runtime_error();
    };

    match runtime.block_on(run::execute(config)) {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            tracing::error!("Application error: {e}");
            exit_code::runtime_error()
        }
    }
}
