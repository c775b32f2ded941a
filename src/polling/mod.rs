//! Long-running job polling.
//!
//! Imports and document translations finish asynchronously on the service.
//! [`Poller::wait_for`] fetches the job repeatedly, reporting every snapshot
//! to an optional callback, and sleeps between fetches with an interval that
//! doubles up to a cap.

use crate::error::LaraError;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

/// Progress callback invoked with every fetched snapshot.
pub type UpdateCallback<'a, T> = &'a mut (dyn FnMut(&T) + Send);

/// Polling configuration.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Interval before the second fetch.
    pub initial_interval: Duration,
    /// Upper bound for the interval.
    pub max_interval: Duration,
    /// Backoff multiplier applied after each sleep.
    pub multiplier: f64,
    /// Maximum total wait; `Duration::ZERO` waits indefinitely.
    pub max_wait: Duration,
    /// Flag that stops polling at the next iteration boundary when set.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(2),
            multiplier: 2.0,
            max_wait: Duration::ZERO,
            cancel: None,
        }
    }
}

impl PollConfig {
    /// Set the initial interval.
    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self
    }

    /// Set the maximum interval.
    pub fn with_max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval;
        self
    }

    /// Set the maximum total wait. `Duration::ZERO` waits indefinitely.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Attach a cancellation flag.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Loop state advanced once per iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollState {
    /// Sleep before the next fetch.
    pub interval: Duration,
    /// Time since the first fetch started.
    pub elapsed: Duration,
    /// Maximum total wait, `None` when unbounded.
    pub deadline: Option<Duration>,
}

impl PollState {
    /// Initial state for `config`.
    pub fn new(config: &PollConfig) -> Self {
        Self {
            interval: config.initial_interval.min(config.max_interval),
            elapsed: Duration::ZERO,
            deadline: if config.max_wait.is_zero() {
                None
            } else {
                Some(config.max_wait)
            },
        }
    }

    /// Whether the elapsed time has exceeded the deadline.
    pub fn is_expired(&self) -> bool {
        matches!(self.deadline, Some(deadline) if self.elapsed > deadline)
    }

    /// Grow the interval for the next iteration.
    pub fn advance(&mut self, config: &PollConfig) {
        let next = self.interval.as_millis() as f64 * config.multiplier;
        let capped = next.min(config.max_interval.as_millis() as f64);
        self.interval = Duration::from_millis(capped as u64);
    }
}

/// Generic wait-until-complete loop.
#[derive(Debug, Clone, Default)]
pub struct Poller {
    config: PollConfig,
}

impl Poller {
    /// Create a poller.
    pub fn new(config: PollConfig) -> Self {
        Self { config }
    }

    /// Poller configuration.
    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Fetch until `is_done` holds.
    ///
    /// The callback sees every snapshot, the first one included. The deadline
    /// is checked after the callback and before sleeping, so the fetch that
    /// crosses it is still reported. Fetch errors propagate unchanged.
    pub async fn wait_for<T, F, Fut, D>(
        &self,
        mut fetch: F,
        is_done: D,
        mut on_update: Option<UpdateCallback<'_, T>>,
    ) -> Result<T, LaraError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LaraError>>,
        D: Fn(&T) -> bool,
    {
        let start = Instant::now();
        let mut state = PollState::new(&self.config);

        loop {
            let snapshot = fetch().await?;

            if let Some(callback) = on_update.as_mut() {
                callback(&snapshot);
            }

            if is_done(&snapshot) {
                return Ok(snapshot);
            }

            state.elapsed = start.elapsed();

            if state.is_expired() {
                return Err(LaraError::Timeout {
                    waited: state.elapsed,
                });
            }

            if self.is_cancelled() {
                return Err(LaraError::Cancelled);
            }

            trace!(
                elapsed_ms = state.elapsed.as_millis() as u64,
                next_interval_ms = state.interval.as_millis() as u64,
                "Job not complete, sleeping"
            );

            tokio::time::sleep(state.interval).await;
            state.advance(&self.config);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.config
            .cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(false)
    }
}
