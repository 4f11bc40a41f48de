use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tracing::Instrument;

use crate::config::PollConfig;
use crate::cursor::WorkerRing;
use crate::guard::SharedCursor;
use crate::telemetry;
use crate::worker::WorkerDescriptor;

/// Bounded retry settings for waiting on a ready worker.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of guarded steps.
    pub max_attempts: u32,
    /// Pause between unsuccessful steps, taken outside the lock.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Policy with the given attempt budget and no backoff.
    pub fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Duration::ZERO,
        }
    }

    /// Set the backoff between attempts.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

impl From<&PollConfig> for RetryPolicy {
    fn from(config: &PollConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&PollConfig::default())
    }
}

/// How a polling run ended.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PollOutcome {
    /// A worker was dispatched to on attempt `attempts`.
    Dispatched {
        /// Snapshot of the dispatched worker.
        worker: WorkerDescriptor,
        /// Steps taken, including the successful one.
        attempts: u32,
    },
    /// Every attempt stopped on a busy or broken worker.
    Exhausted {
        /// Steps taken.
        attempts: u32,
    },
    /// Shutdown was signalled before a worker was found.
    Cancelled {
        /// Steps taken before cancellation.
        attempts: u32,
    },
}

impl PollOutcome {
    /// The dispatched worker, if any.
    pub fn worker(&self) -> Option<&WorkerDescriptor> {
        match self {
            PollOutcome::Dispatched { worker, .. } => Some(worker),
            _ => None,
        }
    }

    /// Number of steps taken.
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Dispatched { attempts, .. }
            | PollOutcome::Exhausted { attempts }
            | PollOutcome::Cancelled { attempts } => *attempts,
        }
    }
}

/// Token for signaling shutdown to async pollers.
#[derive(Clone, Debug)]
pub struct ShutdownToken {
    inner: Arc<ShutdownTokenInner>,
}

#[derive(Debug)]
struct ShutdownTokenInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl ShutdownToken {
    /// Create a new shutdown token.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ShutdownTokenInner {
                cancelled: AtomicBool::new(false),
                notify: Notify::new(),
            }),
        }
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Check if cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Wait until cancelled.
    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

impl Default for ShutdownToken {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: WorkerRing> SharedCursor<R> {
    /// Step until a worker is dispatched or `policy.max_attempts` steps have
    /// stopped. Blocks the calling thread during backoff.
    pub fn poll(&self, policy: &RetryPolicy) -> PollOutcome {
        let _span = telemetry::poll_span(policy.max_attempts).entered();

        for attempt in 1..=policy.max_attempts {
            if let Some(worker) = self.dispatch_next() {
                return PollOutcome::Dispatched {
                    worker,
                    attempts: attempt,
                };
            }
            if attempt < policy.max_attempts && !policy.backoff.is_zero() {
                std::thread::sleep(policy.backoff);
            }
        }

        tracing::debug!(attempts = policy.max_attempts, "poll exhausted");
        PollOutcome::Exhausted {
            attempts: policy.max_attempts,
        }
    }

    /// Async variant of [`poll`](Self::poll) that sleeps on the tokio timer
    /// and stops early when `shutdown` is cancelled.
    pub async fn poll_async(&self, policy: &RetryPolicy, shutdown: &ShutdownToken) -> PollOutcome {
        let span = telemetry::poll_span(policy.max_attempts);
        async move {
            for attempt in 1..=policy.max_attempts {
                if shutdown.is_cancelled() {
                    return PollOutcome::Cancelled {
                        attempts: attempt - 1,
                    };
                }
                if let Some(worker) = self.dispatch_next() {
                    return PollOutcome::Dispatched {
                        worker,
                        attempts: attempt,
                    };
                }
                if attempt < policy.max_attempts {
                    tokio::select! {
                        _ = shutdown.cancelled() => {
                            tracing::debug!(attempts = attempt, "poll cancelled");
                            return PollOutcome::Cancelled { attempts: attempt };
                        }
                        _ = tokio::time::sleep(policy.backoff) => {}
                    }
                }
            }

            tracing::debug!(attempts = policy.max_attempts, "poll exhausted");
            PollOutcome::Exhausted {
                attempts: policy.max_attempts,
            }
        }
        .instrument(span)
        .await
    }
}
