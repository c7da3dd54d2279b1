//! Tests for the interval-driven poller.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use super::{MessageFormat, Poller, TickOutcome};
use crate::network::{AddressFetcher, AddressValue, FetchError};
use crate::notify::{ChannelId, ChannelNotifier, Notifier, NotifyError};
use crate::state::mock::MockStateStore;
use crate::state::{LoadResult, StateStore};
use crate::time::Clock;
use crate::transport::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Mock clock pinned to a fixed instant.
struct MockClock;

impl Clock for MockClock {
    fn now(&self) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }
}

/// Mock fetcher that returns predefined addresses, optionally after a delay.
struct MockFetcher {
    results: Mutex<VecDeque<Result<AddressValue, FetchError>>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockFetcher {
    fn new(results: Vec<Result<AddressValue, FetchError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    fn returning(addresses: &[&str]) -> Self {
        Self::new(addresses.iter().map(|a| Ok(address(a))).collect())
    }

    fn timing_out() -> Self {
        Self::new(vec![Err(FetchError::Timeout(Duration::from_secs(10)))])
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AddressFetcher for MockFetcher {
    async fn fetch(&self) -> Result<AddressValue, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(FetchError::EmptyBody))
    }
}

/// Mock notifier recording every attempted message.
#[derive(Default)]
struct MockNotifier {
    failures: Mutex<VecDeque<NotifyError>>,
    messages: Mutex<Vec<String>>,
}

impl MockNotifier {
    fn failing_with(error: NotifyError) -> Self {
        let notifier = Self::default();
        notifier.failures.lock().unwrap().push_back(error);
        notifier
    }

    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for MockNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(message.to_string());
        self.failures.lock().unwrap().pop_front().map_or(Ok(()), Err)
    }
}

impl Notifier for Arc<MockNotifier> {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        (**self).send(message).await
    }
}

/// Captures formatted log output for assertions.
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    (capture, tracing::subscriber::set_default(subscriber))
}

fn address(s: &str) -> AddressValue {
    AddressValue::parse(s).unwrap()
}

const INTERVAL: Duration = Duration::from_secs(300);

fn poller(
    fetcher: MockFetcher,
    store: MockStateStore,
    notifier: Arc<MockNotifier>,
) -> Poller<MockFetcher, MockStateStore, Arc<MockNotifier>, MockClock> {
    Poller::with_clock(fetcher, store, notifier, MockClock, INTERVAL)
}

mod scenarios {
    use super::*;

    #[tokio::test]
    async fn first_run_saves_and_sends_startup_message() {
        let notifier = Arc::new(MockNotifier::default());
        let poller = poller(
            MockFetcher::returning(&["1.2.3.4"]),
            MockStateStore::not_found(),
            Arc::clone(&notifier),
        );

        let outcome = poller.tick().await;

        assert_eq!(outcome, TickOutcome::Notified);
        assert_eq!(poller.store().load(), LoadResult::Loaded(address("1.2.3.4")));
        assert_eq!(
            notifier.messages(),
            vec!["🟢 Bot started – current public IP is **1.2.3.4**.".to_string()]
        );
    }

    #[tokio::test]
    async fn unchanged_address_does_nothing() {
        let notifier = Arc::new(MockNotifier::default());
        let poller = poller(
            MockFetcher::returning(&["1.2.3.4"]),
            MockStateStore::with_loaded("1.2.3.4"),
            Arc::clone(&notifier),
        );

        let outcome = poller.tick().await;

        assert_eq!(outcome, TickOutcome::Unchanged);
        assert!(poller.store().saved_values().is_empty());
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn changed_address_saves_and_sends_change_message() {
        let notifier = Arc::new(MockNotifier::default());
        let poller = poller(
            MockFetcher::returning(&["5.6.7.8"]),
            MockStateStore::with_loaded("1.2.3.4"),
            Arc::clone(&notifier),
        );

        let outcome = poller.tick().await;

        assert_eq!(outcome, TickOutcome::Notified);
        assert_eq!(poller.store().saved_values(), vec![address("5.6.7.8")]);
        let messages = notifier.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("1.2.3.4"));
        assert!(messages[0].contains("5.6.7.8"));
        assert!(messages[0].contains("changed"));
    }

    #[tokio::test]
    async fn fetch_failure_leaves_state_and_channel_untouched() {
        let notifier = Arc::new(MockNotifier::default());
        let poller = poller(
            MockFetcher::timing_out(),
            MockStateStore::with_loaded("1.2.3.4"),
            Arc::clone(&notifier),
        );

        let outcome = poller.tick().await;

        assert_eq!(outcome, TickOutcome::FetchFailed);
        assert_eq!(poller.store().load(), LoadResult::Loaded(address("1.2.3.4")));
        assert!(poller.store().saved_values().is_empty());
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn save_failure_skips_notification_and_logs_it() {
        let (logs, _guard) = capture_logs();
        let notifier = Arc::new(MockNotifier::default());
        let poller = poller(
            MockFetcher::returning(&["5.6.7.8"]),
            MockStateStore::with_loaded("1.2.3.4").failing_saves(),
            Arc::clone(&notifier),
        );

        let outcome = poller.tick().await;

        assert_eq!(outcome, TickOutcome::SaveFailed);
        assert!(notifier.messages().is_empty());
        assert_eq!(poller.store().load(), LoadResult::Loaded(address("1.2.3.4")));
        let output = logs.contents();
        assert!(output.contains("skipping notification"), "{output}");
        assert!(output.contains("5.6.7.8"), "{output}");
    }
}

mod failure_handling {
    use super::*;

    #[tokio::test]
    async fn notify_failure_keeps_saved_state() {
        let notifier = Arc::new(MockNotifier::failing_with(NotifyError::Transport(
            HttpError::Timeout,
        )));
        let poller = poller(
            MockFetcher::returning(&["5.6.7.8", "5.6.7.8"]),
            MockStateStore::with_loaded("1.2.3.4"),
            Arc::clone(&notifier),
        );

        assert_eq!(poller.tick().await, TickOutcome::NotifyFailed);
        assert_eq!(poller.store().load(), LoadResult::Loaded(address("5.6.7.8")));

        // The change is not announced a second time.
        assert_eq!(poller.tick().await, TickOutcome::Unchanged);
        assert_eq!(notifier.messages().len(), 1);
    }

    #[tokio::test]
    async fn unresolvable_destination_is_logged_distinctly() {
        let (logs, _guard) = capture_logs();
        let notifier = Arc::new(MockNotifier::failing_with(
            NotifyError::DestinationUnresolvable {
                channel_id: ChannelId::new(42).unwrap(),
                status: http::StatusCode::NOT_FOUND,
            },
        ));
        let poller = poller(
            MockFetcher::returning(&["1.2.3.4"]),
            MockStateStore::not_found(),
            Arc::clone(&notifier),
        );

        assert_eq!(poller.tick().await, TickOutcome::NotifyFailed);

        let output = logs.contents();
        assert!(output.contains("Could not deliver notification"), "{output}");
        assert!(output.contains("cannot be resolved"), "{output}");
    }

    #[tokio::test]
    async fn unreadable_state_skips_the_tick() {
        let notifier = Arc::new(MockNotifier::default());
        let poller = poller(
            MockFetcher::returning(&["1.2.3.4"]),
            MockStateStore::unreadable("permission denied"),
            Arc::clone(&notifier),
        );

        assert_eq!(poller.tick().await, TickOutcome::StateUnreadable);
        assert!(poller.store().saved_values().is_empty());
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn corrupted_state_is_treated_as_first_run() {
        let notifier = Arc::new(MockNotifier::default());
        let poller = poller(
            MockFetcher::returning(&["1.2.3.4"]),
            MockStateStore::corrupted("not UTF-8"),
            Arc::clone(&notifier),
        );

        assert_eq!(poller.tick().await, TickOutcome::Notified);
        assert!(notifier.messages()[0].contains("Bot started"));
        assert_eq!(poller.store().saved_values(), vec![address("1.2.3.4")]);
    }

    #[tokio::test]
    async fn recovers_after_failed_tick() {
        let notifier = Arc::new(MockNotifier::default());
        let poller = poller(
            MockFetcher::new(vec![
                Err(FetchError::Status {
                    status: http::StatusCode::SERVICE_UNAVAILABLE,
                }),
                Ok(address("5.6.7.8")),
            ]),
            MockStateStore::with_loaded("1.2.3.4"),
            Arc::clone(&notifier),
        );

        assert_eq!(poller.tick().await, TickOutcome::FetchFailed);
        assert_eq!(poller.tick().await, TickOutcome::Notified);
        assert_eq!(notifier.messages().len(), 1);
    }
}

mod idempotence {
    use super::*;

    #[tokio::test]
    async fn repeated_ticks_notify_once() {
        let notifier = Arc::new(MockNotifier::default());
        let poller = poller(
            MockFetcher::returning(&["1.2.3.4", "1.2.3.4"]),
            MockStateStore::not_found(),
            Arc::clone(&notifier),
        );

        assert_eq!(poller.tick().await, TickOutcome::Notified);
        assert_eq!(poller.tick().await, TickOutcome::Unchanged);
        assert_eq!(notifier.messages().len(), 1);
        assert_eq!(poller.store().saved_values().len(), 1);
    }
}

mod options {
    use super::*;

    #[tokio::test]
    async fn dry_run_saves_but_does_not_send() {
        let notifier = Arc::new(MockNotifier::default());
        let poller = poller(
            MockFetcher::returning(&["5.6.7.8"]),
            MockStateStore::with_loaded("1.2.3.4"),
            Arc::clone(&notifier),
        )
        .with_dry_run(true);

        assert_eq!(poller.tick().await, TickOutcome::DryRun);
        assert_eq!(poller.store().saved_values(), vec![address("5.6.7.8")]);
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn custom_format_is_used_for_messages() {
        let notifier = Arc::new(MockNotifier::default());
        let format = MessageFormat::new(None, Some("IP now {{current}} (was {{previous}})")).unwrap();
        let poller = poller(
            MockFetcher::returning(&["5.6.7.8"]),
            MockStateStore::with_loaded("1.2.3.4"),
            Arc::clone(&notifier),
        )
        .with_message_format(format);

        poller.tick().await;

        assert_eq!(
            notifier.messages(),
            vec!["IP now 5.6.7.8 (was 1.2.3.4)".to_string()]
        );
    }

    #[test]
    fn interval_is_exposed() {
        let poller = poller(
            MockFetcher::returning(&[]),
            MockStateStore::not_found(),
            Arc::new(MockNotifier::default()),
        );
        assert_eq!(poller.interval(), INTERVAL);
    }
}

mod run_loop {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_on_interval_until_shutdown() {
        let notifier = Arc::new(MockNotifier::default());
        let poller = poller(
            MockFetcher::returning(&["1.2.3.4", "1.2.3.4", "5.6.7.8", "9.9.9.9"]),
            MockStateStore::not_found(),
            Arc::clone(&notifier),
        );

        // Ticks at 0s, 300s and 600s; shutdown at 650s.
        poller
            .run(tokio::time::sleep(Duration::from_secs(650)))
            .await;

        let messages = notifier.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("Bot started"));
        assert!(messages[1].contains("5.6.7.8"));
        assert_eq!(poller.store().load(), LoadResult::Loaded(address("5.6.7.8")));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_ticks_do_not_stop_the_loop() {
        let notifier = Arc::new(MockNotifier::default());
        let fetcher = MockFetcher::new(vec![
            Err(FetchError::Timeout(Duration::from_secs(10))),
            Err(FetchError::EmptyBody),
            Ok(address("1.2.3.4")),
        ]);
        let poller = poller(fetcher, MockStateStore::not_found(), Arc::clone(&notifier));

        poller
            .run(tokio::time::sleep(Duration::from_secs(601)))
            .await;

        assert_eq!(notifier.messages().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn resolved_shutdown_prevents_any_tick() {
        let poller = poller(
            MockFetcher::returning(&["1.2.3.4"]),
            MockStateStore::not_found(),
            Arc::new(MockNotifier::default()),
        );

        poller.run(std::future::ready(())).await;

        assert_eq!(poller.fetcher.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_tick_finishes_after_shutdown_request() {
        let notifier = Arc::new(MockNotifier::default());
        let poller = poller(
            MockFetcher::returning(&["1.2.3.4"]).with_delay(Duration::from_secs(5)),
            MockStateStore::not_found(),
            Arc::clone(&notifier),
        );

        poller
            .run(tokio::time::sleep(Duration::from_secs(1)))
            .await;

        assert_eq!(poller.fetcher.calls(), 1);
        assert_eq!(notifier.messages().len(), 1);
        assert_eq!(poller.store().load(), LoadResult::Loaded(address("1.2.3.4")));
    }

    /// HTTP client whose requests never answer within a day.
    #[derive(Default)]
    struct HangingClient {
        requests: AtomicUsize,
    }

    impl HttpClient for Arc<HangingClient> {
        async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
            Err(HttpError::Timeout)
        }
    }

    fn hanging_notifier(client: &Arc<HangingClient>) -> ChannelNotifier<Arc<HangingClient>> {
        let api_base = url::Url::parse(crate::notify::DEFAULT_API_BASE).unwrap();
        ChannelNotifier::new(
            Arc::clone(client),
            &api_base,
            ChannelId::new(1).unwrap(),
            "token",
        )
        .unwrap()
        .with_timeout(Duration::from_secs(30))
    }

    #[tokio::test(start_paused = true)]
    async fn hung_send_does_not_block_shutdown() {
        let client = Arc::new(HangingClient::default());
        let poller = Poller::with_clock(
            MockFetcher::returning(&["1.2.3.4"]),
            MockStateStore::not_found(),
            hanging_notifier(&client),
            MockClock,
            INTERVAL,
        );
        let started = tokio::time::Instant::now();

        poller
            .run(tokio::time::sleep(Duration::from_secs(10)))
            .await;

        assert!(started.elapsed() < Duration::from_secs(60));
        assert_eq!(client.requests.load(Ordering::SeqCst), 1);
        assert_eq!(poller.store().load(), LoadResult::Loaded(address("1.2.3.4")));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_sends_do_not_stop_later_ticks() {
        let client = Arc::new(HangingClient::default());
        let poller = Poller::with_clock(
            MockFetcher::returning(&["1.2.3.4", "5.6.7.8", "9.9.9.9"]),
            MockStateStore::not_found(),
            hanging_notifier(&client),
            MockClock,
            INTERVAL,
        );

        poller
            .run(tokio::time::sleep(Duration::from_secs(650)))
            .await;

        assert_eq!(client.requests.load(Ordering::SeqCst), 3);
        assert_eq!(poller.store().load(), LoadResult::Loaded(address("9.9.9.9")));
    }

    #[test]
    #[should_panic(expected = "poll interval must be non-zero")]
    fn zero_interval_is_rejected() {
        let _ = Poller::with_clock(
            MockFetcher::returning(&[]),
            MockStateStore::not_found(),
            Arc::new(MockNotifier::default()),
            MockClock,
            Duration::ZERO,
        );
    }
}
