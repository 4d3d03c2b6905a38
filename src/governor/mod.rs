//! Rate-limited FIFO for outbound calls.
//!
//! All calls to the spreadsheet service funnel through one [`CallGovernor`].
//! A single consumer task pops queued calls in enqueue order, runs each to
//! completion, and waits at least `1 / max_rate` seconds after a call settles
//! before starting the next. At most one call is ever in flight.
//!
//! A call that fails or panics settles only its own caller; the queue keeps
//! draining. There is no cancellation: a queued call still runs if its caller
//! stops waiting, and its result is discarded.

mod error;

pub use error::GovernorError;

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::config::GovernorConfig;

type QueuedCall = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

#[derive(Clone)]
pub struct CallGovernor {
    sender: mpsc::UnboundedSender<QueuedCall>,
    pending: Arc<AtomicUsize>,
    interval: Duration,
}

impl CallGovernor {
    /// Spawns the consumer task on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime or when `max_rate` is not a
    /// positive finite number; configuration validation rules out the latter.
    pub fn new(max_rate: f64) -> Self {
        assert!(
            max_rate.is_finite() && max_rate > 0.0,
            "max_rate must be positive, got {max_rate}"
        );
        let interval = Duration::from_secs_f64(1.0 / max_rate);
        let (sender, receiver) = mpsc::unbounded_channel();

        tokio::spawn(run_queue(receiver, interval));
        tracing::debug!(max_rate, ?interval, "Call governor started");

        Self {
            sender,
            pending: Arc::new(AtomicUsize::new(0)),
            interval,
        }
    }

    pub fn from_config(config: &GovernorConfig) -> Self {
        Self::new(config.max_rate)
    }

    /// Minimum gap between one call settling and the next starting.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Calls queued or running.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Queues `operation` and resolves with its output once it has run.
    pub async fn enqueue<F, Fut, T>(&self, operation: F) -> Result<T, GovernorError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (settle, settled) = oneshot::channel();
        let pending = Arc::clone(&self.pending);

        let call: QueuedCall = Box::new(move || {
            async move {
                let outcome = AssertUnwindSafe(async move { operation().await })
                    .catch_unwind()
                    .await
                    .map_err(|_| GovernorError::Panicked);
                pending.fetch_sub(1, Ordering::AcqRel);
                // The caller may have stopped waiting
                let _ = settle.send(outcome);
            }
            .boxed()
        });

        let depth = self.pending.fetch_add(1, Ordering::AcqRel) + 1;
        if self.sender.send(call).is_err() {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            return Err(GovernorError::Closed);
        }
        tracing::trace!(depth, "Call queued");

        settled.await.map_err(|_| GovernorError::Closed)?
    }
}

async fn run_queue(mut receiver: mpsc::UnboundedReceiver<QueuedCall>, interval: Duration) {
    let mut last_settled: Option<Instant> = None;

    while let Some(call) = receiver.recv().await {
        if let Some(settled_at) = last_settled {
            tokio::time::sleep_until(settled_at + interval).await;
        }
        call().await;
        last_settled = Some(Instant::now());
    }

    tracing::debug!("Call governor stopped");
}
