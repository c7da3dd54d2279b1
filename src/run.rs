//! Application execution logic.
//!
//! This module wires the configured components together and runs either
//! the watch loop or the one-shot address query.

use thiserror::Error;
use tokio::signal;

use wan_watch::config::{LookupConfig, ValidatedConfig};
use wan_watch::monitor::Poller;
use wan_watch::network::HttpAddressFetcher;
use wan_watch::notify::{ChannelNotifier, NotifyError};
use wan_watch::query::{AddressReport, QueryError, query_address};
use wan_watch::state::FileStateStore;
use wan_watch::transport::{HttpClient, ReqwestClient};

/// The poller as assembled from configuration.
type AppPoller<H> = Poller<HttpAddressFetcher<H>, FileStateStore, ChannelNotifier<H>>;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to set up the channel notifier.
    #[error("Failed to set up notifier: {0}")]
    NotifierSetup(#[source] NotifyError),

    /// The address query could not produce an answer.
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Executes the watch loop until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the notifier cannot be built from the configuration.
/// Failures inside the loop are logged and never end it.
///
/// # Coverage Note
///
/// This function is excluded from coverage because it requires
/// real network access and signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let poller = build_poller(config, ReqwestClient::new())?;

    tracing::info!(
        "Watching public IP every {}s",
        poller.interval().as_secs()
    );
    tracing::info!("State file: {}", poller.store().path().display());

    poller.run(shutdown_signal()).await;
    Ok(())
}

/// Answers the `myip` query once.
///
/// # Errors
///
/// Returns an error if the lookup fails and no address was saved.
#[cfg(not(tarpaulin_include))]
pub async fn query(lookup: LookupConfig) -> Result<AddressReport, RunError> {
    lookup_address(&lookup, ReqwestClient::new()).await
}

/// Assembles the poller from validated configuration.
fn build_poller<H>(config: ValidatedConfig, client: H) -> Result<AppPoller<H>, RunError>
where
    H: HttpClient + Clone,
{
    let notifier = ChannelNotifier::new(
        client.clone(),
        &config.api_base,
        config.channel_id,
        &config.token,
    )
    .map_err(RunError::NotifierSetup)?;

    if config.dry_run {
        tracing::info!("Dry-run mode enabled - messages will be logged but not sent");
    }

    Ok(Poller::new(
        create_fetcher(&config.lookup, client),
        FileStateStore::new(&config.lookup.state_file),
        notifier,
        config.poll_interval,
    )
    .with_message_format(config.message_format)
    .with_dry_run(config.dry_run))
}

/// Fetches the address with the configured lookup, falling back to the
/// saved one.
async fn lookup_address<H: HttpClient>(
    lookup: &LookupConfig,
    client: H,
) -> Result<AddressReport, RunError> {
    let fetcher = create_fetcher(lookup, client);
    let store = FileStateStore::new(&lookup.state_file);

    let report = query_address(&fetcher, &store).await?;
    Ok(report)
}

fn create_fetcher<H>(lookup: &LookupConfig, client: H) -> HttpAddressFetcher<H> {
    HttpAddressFetcher::new(client, lookup.ip_service.clone()).with_timeout(lookup.fetch_timeout)
}

/// Returns a future that completes when a shutdown signal is received.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
