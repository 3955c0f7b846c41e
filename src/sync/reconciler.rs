//! Polling loop owning one collection's cache.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::snapshot::{RefreshFailure, Snapshot};
use crate::observability::SyncMetrics;
use crate::{Error, Result};

/// Shortest accepted poll interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

type Ack = oneshot::Sender<()>;

/// Fetches the authoritative value of one collection.
#[async_trait]
pub trait Source: Send + Sync + 'static {
    type Output: Send + Sync + 'static;

    /// Collection name used in logs and errors.
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Self::Output>;
}

/// Sole writer of a collection's snapshot. Closing it makes every later
/// write a no-op.
struct Publisher<T> {
    sender: Mutex<Option<watch::Sender<Snapshot<T>>>>,
}

impl<T> Publisher<T> {
    fn new(sender: watch::Sender<Snapshot<T>>) -> Self {
        Self {
            sender: Mutex::new(Some(sender)),
        }
    }

    /// `None` once closed.
    fn publish(&self, f: impl FnOnce(&mut Snapshot<T>) -> bool) -> Option<bool> {
        let guard = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let sender = guard.as_ref()?;
        let mut changed = false;
        sender.send_modify(|snapshot| changed = f(snapshot));
        Some(changed)
    }

    /// Clear any in-flight marker in a final write, then close. Returns
    /// `true` on the first call only.
    fn close(&self) -> bool {
        let mut guard = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.take() {
            Some(sender) => {
                sender.send_if_modified(Snapshot::abandon_fetch);
                true
            }
            None => false,
        }
    }
}

/// Handle to a running reconciliation loop.
///
/// The loop fetches once on start and then on every interval tick. At most
/// one fetch is in flight; ticks that fire meanwhile are dropped and
/// refresh requests are coalesced into a single follow-up fetch. A failed
/// fetch keeps the cached data and records the error.
///
/// Must be started inside a tokio runtime. Dropping the handle stops the
/// loop.
pub struct Reconciler<T> {
    collection: String,
    interval: Duration,
    publisher: Arc<Publisher<T>>,
    state: watch::Receiver<Snapshot<T>>,
    requests: mpsc::UnboundedSender<Ack>,
    cancel: CancellationToken,
    metrics: Arc<SyncMetrics>,
    task: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + Sync + 'static> Reconciler<T> {
    pub fn start<S>(source: S, interval: Duration) -> Self
    where
        S: Source<Output = T>,
    {
        let collection = source.name().to_string();
        let interval = if interval < MIN_POLL_INTERVAL {
            tracing::warn!(
                collection = %collection,
                requested_ms = interval.as_millis() as u64,
                min_ms = MIN_POLL_INTERVAL.as_millis() as u64,
                "Poll interval below minimum, clamping"
            );
            MIN_POLL_INTERVAL
        } else {
            interval
        };

        let (sender, state) = watch::channel(Snapshot::default());
        let publisher = Arc::new(Publisher::new(sender));
        let (requests, request_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let metrics = Arc::new(SyncMetrics::new());

        let worker = Worker {
            source,
            interval,
            publisher: Arc::clone(&publisher),
            requests: request_rx,
            cancel: cancel.clone(),
            metrics: Arc::clone(&metrics),
        };
        let task = tokio::spawn(worker.run());

        tracing::info!(
            collection = %collection,
            interval_ms = interval.as_millis() as u64,
            "Reconciler started"
        );

        Self {
            collection,
            interval,
            publisher,
            state,
            requests,
            cancel,
            metrics,
            task: tokio::sync::Mutex::new(Some(task)),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Current cached view.
    pub fn snapshot(&self) -> Snapshot<T> {
        self.state.borrow().clone()
    }

    /// Receiver notified on every snapshot change. After teardown the
    /// receiver keeps the last value and `changed()` returns an error.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.state.clone()
    }

    pub fn metrics(&self) -> &SyncMetrics {
        &self.metrics
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fetch now and wait until a fetch that started after this call has
    /// been applied. A failed fetch still resolves; inspect
    /// [`Snapshot::error`] on the returned snapshot.
    pub async fn refresh(&self) -> Result<Snapshot<T>> {
        let (ack, done) = oneshot::channel();
        self.enqueue(ack)?;
        done.await.map_err(|_| self.stopped())?;
        Ok(self.snapshot())
    }

    /// Schedule an out-of-band fetch without waiting for it.
    pub fn request_refresh(&self) -> Result<()> {
        let (ack, _) = oneshot::channel();
        self.enqueue(ack)
    }

    /// Stop polling. Idempotent. An in-flight fetch is abandoned and its
    /// in-flight flag cleared; no snapshot write happens after this returns.
    pub fn stop(&self) {
        let first = self.publisher.close();
        self.cancel.cancel();
        if first {
            tracing::info!(collection = %self.collection, "Reconciler stopped");
        }
    }

    /// [`stop`](Self::stop) and wait for the loop task to exit.
    pub async fn shutdown(&self) {
        self.stop();
        let task = self.task.lock().await.take();
        if let Some(task) = task
            && let Err(e) = task.await
        {
            tracing::warn!(collection = %self.collection, error = %e, "Reconciler task failed");
        }
    }

    fn enqueue(&self, ack: Ack) -> Result<()> {
        if self.is_stopped() {
            return Err(self.stopped());
        }
        self.requests.send(ack).map_err(|_| self.stopped())
    }

    fn stopped(&self) -> Error {
        Error::Stopped {
            collection: self.collection.clone(),
        }
    }
}

impl<T> Drop for Reconciler<T> {
    fn drop(&mut self) {
        self.publisher.close();
        self.cancel.cancel();
    }
}

impl<T> std::fmt::Debug for Reconciler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("collection", &self.collection)
            .field("interval", &self.interval)
            .field("stopped", &self.cancel.is_cancelled())
            .finish()
    }
}

struct Worker<S: Source> {
    source: S,
    interval: Duration,
    publisher: Arc<Publisher<S::Output>>,
    requests: mpsc::UnboundedReceiver<Ack>,
    cancel: CancellationToken,
    metrics: Arc<SyncMetrics>,
}

impl<S: Source> Worker<S> {
    async fn run(mut self) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut pending: Vec<Ack> = Vec::new();
        let mut generation: u64 = 0;

        loop {
            let out_of_band = if !pending.is_empty() {
                true
            } else {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => break,
                    request = self.requests.recv() => match request {
                        Some(ack) => {
                            pending.push(ack);
                            while let Ok(ack) = self.requests.try_recv() {
                                pending.push(ack);
                            }
                            true
                        }
                        None => break,
                    },
                    _ = ticker.tick() => false,
                }
            };

            let serving = std::mem::take(&mut pending);
            generation += 1;
            if self
                .publisher
                .publish(|snapshot| {
                    snapshot.begin_fetch();
                    true
                })
                .is_none()
            {
                break;
            }
            self.metrics.record_fetch_start(out_of_band);

            let fetch = self.source.fetch();
            tokio::pin!(fetch);
            let outcome = loop {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        self.metrics.record_fetch_abandoned();
                        tracing::debug!(
                            collection = self.source.name(),
                            generation,
                            "In-flight fetch abandoned"
                        );
                        return;
                    }
                    result = &mut fetch => break result,
                    _ = ticker.tick() => {
                        self.metrics.ticks_dropped.inc();
                        tracing::trace!(
                            collection = self.source.name(),
                            generation,
                            "Tick dropped, fetch in flight"
                        );
                    }
                    Some(ack) = self.requests.recv() => pending.push(ack),
                }
            };

            let succeeded = outcome.is_ok();
            self.metrics.record_fetch_end(succeeded);
            let collection = self.source.name();
            let outcome = outcome.map_err(|error| {
                tracing::warn!(
                    collection,
                    generation,
                    status = error.status_code(),
                    category = ?error.category(),
                    error = %error,
                    "Refresh failed, keeping cached data"
                );
                RefreshFailure::from_error(&error)
            });

            match self
                .publisher
                .publish(|snapshot| snapshot.apply(generation, outcome))
            {
                None => return,
                Some(false) => {
                    self.metrics.stale_results_discarded.inc();
                    tracing::debug!(collection, generation, "Stale result discarded");
                }
                Some(true) if succeeded => {
                    tracing::debug!(collection, generation, out_of_band, "Refresh applied");
                }
                Some(true) => {}
            }

            for ack in serving {
                let _ = ack.send(());
            }
        }

        tracing::debug!(collection = self.source.name(), "Reconciler loop exited");
    }
}
