//! Interval-driven address poller.
//!
//! [`Poller`] runs one fetch-compare-act sequence ("tick") per interval and
//! keeps going until its shutdown future resolves.

use std::future::Future;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;

use super::change::{ChangeEvent, Decision, decide};
use super::message::MessageFormat;
use crate::network::AddressFetcher;
use crate::notify::Notifier;
use crate::state::{LoadResult, StateStore};
use crate::time::{Clock, SystemClock};

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;

/// What a single tick ended with.
///
/// Every outcome returns the poller to idle; none of them stops the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The lookup failed; nothing was changed.
    FetchFailed,
    /// The saved address could not be read; nothing was changed.
    StateUnreadable,
    /// The address matches the saved one.
    Unchanged,
    /// The new address could not be saved; no notification was sent.
    SaveFailed,
    /// The new address was saved and the notification delivered.
    Notified,
    /// The new address was saved but the notification failed.
    NotifyFailed,
    /// The new address was saved and the message only logged.
    DryRun,
}

/// Polls the public address and notifies on change.
///
/// # Type Parameters
///
/// * `F` - The [`AddressFetcher`] used for lookups
/// * `S` - The [`StateStore`] holding the last-known address
/// * `N` - The [`Notifier`] receiving change messages
/// * `C` - The [`Clock`] stamping change events (defaults to [`SystemClock`])
///
/// # Guarantees
///
/// - A failed lookup never touches the saved address
/// - A notification is only sent after the new address was saved
/// - A failed notification does not roll the save back, so each change
///   produces at most one notification
///
/// # Example
///
/// ```ignore
/// let poller = Poller::new(fetcher, store, notifier, Duration::from_secs(300));
/// poller.run(shutdown_signal()).await;
/// ```
#[derive(Debug)]
pub struct Poller<F, S, N, C = SystemClock> {
    fetcher: F,
    store: S,
    notifier: N,
    clock: C,
    format: MessageFormat,
    interval: Duration,
    dry_run: bool,
}

impl<F, S, N> Poller<F, S, N, SystemClock>
where
    F: AddressFetcher,
    S: StateStore,
    N: Notifier,
{
    /// Creates a poller using the system clock and built-in messages.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    #[must_use]
    pub fn new(fetcher: F, store: S, notifier: N, interval: Duration) -> Self {
        Self::with_clock(fetcher, store, notifier, SystemClock, interval)
    }
}

impl<F, S, N, C> Poller<F, S, N, C>
where
    F: AddressFetcher,
    S: StateStore,
    N: Notifier,
    C: Clock,
{
    /// Creates a poller with a custom clock.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    #[must_use]
    pub fn with_clock(fetcher: F, store: S, notifier: N, clock: C, interval: Duration) -> Self {
        assert!(!interval.is_zero(), "poll interval must be non-zero");
        Self {
            fetcher,
            store,
            notifier,
            clock,
            format: MessageFormat::default(),
            interval,
            dry_run: false,
        }
    }

    /// Sets the message format.
    #[must_use]
    pub fn with_message_format(mut self, format: MessageFormat) -> Self {
        self.format = format;
        self
    }

    /// Enables dry-run mode: changes are saved and logged, never sent.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Returns the configured polling interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the state store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Runs ticks at the configured interval until `shutdown` resolves.
    ///
    /// The first tick fires immediately. Ticks that fall behind are delayed
    /// rather than bunched up. A tick already in progress when shutdown is
    /// requested runs to completion.
    pub async fn run<D>(&self, shutdown: D)
    where
        D: Future<Output = ()>,
    {
        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = IntervalStream::new(timer);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown => {
                    tracing::info!("Shutdown signal received, stopping...");
                    return;
                }

                Some(_) = ticks.next() => {
                    let outcome = self.tick().await;
                    tracing::debug!("Check finished: {outcome:?}");
                }
            }
        }
    }

    /// Performs a single fetch-compare-act sequence.
    ///
    /// Never fails: every error is logged and reported as the outcome.
    pub async fn tick(&self) -> TickOutcome {
        let current = match self.fetcher.fetch().await {
            Ok(address) => address,
            Err(e) => {
                tracing::warn!("Failed to fetch public IP: {e}");
                return TickOutcome::FetchFailed;
            }
        };

        let previous = match self.store.load() {
            LoadResult::Loaded(address) => Some(address),
            LoadResult::NotFound => None,
            LoadResult::Corrupted { reason } => {
                tracing::warn!("State file corrupted ({reason}), will overwrite on next save");
                None
            }
            LoadResult::Unreadable { reason } => {
                tracing::error!("Cannot read saved IP ({reason}), skipping this check");
                return TickOutcome::StateUnreadable;
            }
        };

        let event = match decide(previous.as_ref(), &current, self.clock.now()) {
            Decision::NoAction => {
                tracing::debug!("IP unchanged ({current})");
                return TickOutcome::Unchanged;
            }
            Decision::Notify(event) => event,
        };

        if let Err(e) = self.store.save(&event.current).await {
            tracing::error!("Failed to save state, skipping notification for {current}: {e}");
            return TickOutcome::SaveFailed;
        }

        self.deliver(&event).await
    }

    async fn deliver(&self, event: &ChangeEvent) -> TickOutcome {
        let message = self.format.render(event).unwrap_or_else(|e| {
            tracing::warn!("{e}; falling back to the built-in message");
            event.default_message()
        });

        if self.dry_run {
            tracing::info!("Dry-run: not sending: {message}");
            return TickOutcome::DryRun;
        }

        match self.notifier.send(&message).await {
            Ok(()) => {
                tracing::info!("{message}");
                TickOutcome::Notified
            }
            Err(e) if e.is_unresolvable() => {
                tracing::error!("Could not deliver notification: {e}");
                TickOutcome::NotifyFailed
            }
            Err(e) => {
                tracing::error!("Notification failed: {e}");
                TickOutcome::NotifyFailed
            }
        }
    }
}
