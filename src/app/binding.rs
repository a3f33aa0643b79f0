use std::sync::Arc;
use std::time::Duration;

use futures::future::{AbortHandle, Abortable};
use log::debug;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::FetchError;
use crate::fetch::{DailyBar, DailySource, FetchResult};

use super::state::FetchState;

struct Completion {
    seq: u64,
    result: FetchResult<Vec<DailyBar>>,
}

/// Keeps a [`FetchState`] in step with the most recently requested symbol.
///
/// Every request gets a sequence number; only the completion carrying the
/// latest number is applied. Superseded requests are aborted and every request
/// runs under a deadline, so a hung call can't pin the state in `loading`.
pub struct SeriesBinding<S: DailySource> {
    source: Arc<S>,
    deadline: Duration,
    state: FetchState,
    seq: u64,
    in_flight: Option<AbortHandle>,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
}

impl<S: DailySource> SeriesBinding<S> {
    pub fn new(source: S, deadline: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            source: Arc::new(source),
            deadline,
            state: FetchState::default(),
            seq: 0,
            in_flight: None,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// Start fetching `symbol` unless it is already the requested symbol.
    ///
    /// Must be called from within a tokio runtime. Returns whether a fetch was
    /// started.
    pub fn request(&mut self, symbol: &str) -> bool {
        if self.state.symbol() == Some(symbol) {
            return false;
        }
        self.start(symbol);
        true
    }

    /// Fetch the current symbol again. Returns `false` when nothing was ever requested.
    pub fn reload(&mut self) -> bool {
        let Some(symbol) = self.state.symbol().map(str::to_string) else {
            return false;
        };
        self.start(&symbol);
        true
    }

    /// Apply any finished request without blocking. Returns whether the state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(completion) = self.rx.try_recv() {
            changed |= self.apply(completion);
        }
        changed
    }

    /// Wait until the pending request resolves and apply it.
    ///
    /// Returns `false` immediately if no request is pending.
    pub async fn settle(&mut self) -> bool {
        while self.state.is_loading() {
            match self.rx.recv().await {
                Some(completion) => {
                    if self.apply(completion) {
                        return true;
                    }
                }
                None => return false,
            }
        }
        false
    }

    fn start(&mut self, symbol: &str) {
        self.cancel_in_flight();
        self.seq += 1;
        self.state.begin(symbol);

        let seq = self.seq;
        let deadline = self.deadline;
        let fetch = self.source.fetch(symbol);
        let tx = self.tx.clone();
        let label = symbol.to_string();
        let (handle, registration) = AbortHandle::new_pair();

        debug!("request #{} for {}", seq, label);

        let guarded = async move {
            match tokio::time::timeout(deadline, fetch).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::network(format!(
                    "request timed out after {:?}",
                    deadline
                ))),
            }
        };

        tokio::spawn(async move {
            match Abortable::new(guarded, registration).await {
                Ok(result) => {
                    let _ = tx.send(Completion { seq, result });
                }
                Err(_) => debug!("request #{} for {} aborted", seq, label),
            }
        });

        self.in_flight = Some(handle);
    }

    fn apply(&mut self, completion: Completion) -> bool {
        if completion.seq != self.seq {
            debug!(
                "discarding stale result #{} (latest is #{})",
                completion.seq, self.seq
            );
            return false;
        }
        self.in_flight = None;
        self.state.resolve(completion.result);
        true
    }

    fn cancel_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

impl<S: DailySource> Drop for SeriesBinding<S> {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;
    use futures::future::{BoxFuture, FutureExt};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Canned per-symbol responses with an optional delay.
    #[derive(Default)]
    pub(crate) struct ScriptedSource {
        responses: Mutex<HashMap<String, (Duration, FetchResult<Vec<DailyBar>>)>>,
        pub(crate) calls: Arc<AtomicUsize>,
        pub(crate) finished: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        pub(crate) fn respond(
            self,
            symbol: &str,
            delay: Duration,
            result: FetchResult<Vec<DailyBar>>,
        ) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(symbol.to_string(), (delay, result));
            self
        }
    }

    impl DailySource for ScriptedSource {
        fn fetch(&self, symbol: &str) -> BoxFuture<'static, FetchResult<Vec<DailyBar>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (delay, result) = self
                .responses
                .lock()
                .unwrap()
                .get(symbol)
                .cloned()
                .unwrap_or((
                    Duration::ZERO,
                    Err(FetchError::NoData {
                        symbol: symbol.to_string(),
                    }),
                ));
            let finished = Arc::clone(&self.finished);
            async move {
                tokio::time::sleep(delay).await;
                finished.fetch_add(1, Ordering::SeqCst);
                result
            }
            .boxed()
        }
    }

    pub(crate) fn bars(days: &[u32]) -> Vec<DailyBar> {
        days.iter()
            .map(|day| DailyBar {
                date: NaiveDate::from_ymd_opt(2024, 1, *day).unwrap(),
                open: 10.0,
                high: 12.0,
                low: 9.0,
                close: 11.0 + *day as f64,
                volume: 1_000,
            })
            .collect()
    }

    #[tokio::test]
    async fn request_resets_state_synchronously() {
        let source = ScriptedSource::default()
            .respond("IBM", Duration::ZERO, Ok(bars(&[5, 6])))
            .respond("ZZZZ", Duration::from_millis(50), Ok(bars(&[7])));
        let mut binding = SeriesBinding::new(source, Duration::from_secs(5));

        assert!(binding.request("IBM"));
        assert!(binding.settle().await);
        assert_eq!(binding.state().records().len(), 2);

        assert!(binding.request("ZZZZ"));
        assert!(binding.state().is_loading());
        assert!(binding.state().records().is_empty());
        assert!(binding.state().error().is_none());
    }

    #[tokio::test]
    async fn applies_failure_message() {
        let source = ScriptedSource::default().respond(
            "ZZZZ",
            Duration::ZERO,
            Err(FetchError::InvalidSymbol {
                symbol: "ZZZZ".to_string(),
            }),
        );
        let mut binding = SeriesBinding::new(source, Duration::from_secs(5));

        binding.request("ZZZZ");
        binding.settle().await;

        assert!(!binding.state().is_loading());
        assert_eq!(binding.state().error(), Some("Invalid stock symbol: ZZZZ"));
        assert!(binding.state().records().is_empty());
    }

    #[tokio::test]
    async fn same_symbol_is_fetched_once_until_reload() {
        let source = ScriptedSource::default().respond("IBM", Duration::ZERO, Ok(bars(&[5])));
        let calls = Arc::clone(&source.calls);
        let mut binding = SeriesBinding::new(source, Duration::from_secs(5));

        assert!(binding.request("IBM"));
        binding.settle().await;
        assert!(!binding.request("IBM"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(binding.reload());
        assert!(binding.state().is_loading());
        binding.settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(binding.state().has_records());
    }

    #[tokio::test]
    async fn reload_without_request_is_a_no_op() {
        let mut binding = SeriesBinding::new(ScriptedSource::default(), Duration::from_secs(5));
        assert!(!binding.reload());
        assert!(!binding.settle().await);
    }

    #[tokio::test]
    async fn superseded_request_never_lands() {
        let source = ScriptedSource::default()
            .respond("AAPL", Duration::from_millis(80), Ok(bars(&[1, 2, 3])))
            .respond("MSFT", Duration::from_millis(5), Ok(bars(&[9])));
        let mut binding = SeriesBinding::new(source, Duration::from_secs(5));

        binding.request("AAPL");
        binding.request("MSFT");
        binding.settle().await;
        assert_eq!(binding.state().symbol(), Some("MSFT"));
        assert_eq!(binding.state().records().len(), 1);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!binding.poll());
        assert_eq!(binding.state().records().len(), 1);
    }

    #[tokio::test]
    async fn stale_completion_is_discarded() {
        let source = ScriptedSource::default().respond("MSFT", Duration::from_millis(20), Ok(bars(&[9])));
        let mut binding = SeriesBinding::new(source, Duration::from_secs(5));

        binding.request("MSFT");
        binding
            .tx
            .send(Completion {
                seq: 0,
                result: Ok(bars(&[1, 2, 3])),
            })
            .unwrap();

        assert!(!binding.poll());
        assert!(binding.state().is_loading());

        binding.settle().await;
        assert_eq!(binding.state().records().len(), 1);
    }

    #[tokio::test]
    async fn deadline_turns_into_network_error() {
        let source =
            ScriptedSource::default().respond("SLOW", Duration::from_secs(30), Ok(bars(&[1])));
        let mut binding = SeriesBinding::new(source, Duration::from_millis(20));

        binding.request("SLOW");
        binding.settle().await;

        let message = binding.state().error().expect("error");
        assert!(
            message.starts_with("Network error") && message.contains("timed out"),
            "unexpected message: {message}"
        );
        assert!(!binding.state().is_loading());
    }

    #[tokio::test]
    async fn dropping_binding_aborts_pending_request() {
        let source =
            ScriptedSource::default().respond("SLOW", Duration::from_millis(40), Ok(bars(&[1])));
        let calls = Arc::clone(&source.calls);
        let finished = Arc::clone(&source.finished);
        let mut binding = SeriesBinding::new(source, Duration::from_secs(5));

        binding.request("SLOW");
        tokio::time::sleep(Duration::from_millis(5)).await;
        drop(binding);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }
}
