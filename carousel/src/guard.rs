use std::any::type_name;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};

use crate::config::CursorConfig;
use crate::cursor::{RingCursor, StepOutcome, WorkerRing};
use crate::error::{CursorError, escalate};
use crate::probe::StatusProbe;
use crate::worker::{WorkerDescriptor, WorkerStatus};

/// A worker ring shared between threads behind a single lock.
///
/// `allocate` and `destroy` take the lock themselves. Stepping requires an
/// explicit [`CursorGuard`] from [`acquire`](Self::acquire): the guard is the
/// only way to reach the ring mutably, so a step and the read of
/// `last_dispatched` that follows it can be done as one atomic unit and can
/// never race with another step. The lock is released when the guard drops,
/// on every exit path.
///
/// Every entry point blocks until the lock is free. Only
/// [`try_acquire`](Self::try_acquire) gives up, after `lock_timeout_ms` or
/// immediately when no timeout is configured, and reports
/// [`CursorError::LockFailure`] to the caller.
pub struct SharedCursor<R: WorkerRing = RingCursor> {
    ring: Mutex<R>,
    lock_timeout: Option<Duration>,
}

impl<R: WorkerRing> fmt::Debug for SharedCursor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCursor")
            .field("ring_type", &type_name::<R>())
            .field("lock_timeout", &self.lock_timeout)
            .field("locked", &self.ring.is_locked())
            .finish()
    }
}

impl SharedCursor<RingCursor> {
    /// Wrap a fresh, empty [`RingCursor`].
    pub fn with_config(config: &CursorConfig) -> Self {
        Self::new(RingCursor::new(), config)
    }
}

impl<R: WorkerRing> SharedCursor<R> {
    /// Wrap `ring` with the lock settings from `config`.
    pub fn new(ring: R, config: &CursorConfig) -> Self {
        Self {
            ring: Mutex::new(ring),
            lock_timeout: config.lock_timeout(),
        }
    }

    /// Acquire the lock without waiting indefinitely.
    ///
    /// Fails with [`CursorError::LockFailure`] when the lock is still held
    /// after the configured timeout, or at once if none is set.
    pub fn try_acquire(&self) -> Result<CursorGuard<'_, R>, CursorError> {
        let ring = match self.lock_timeout {
            Some(timeout) => self.ring.try_lock_for(timeout),
            None => self.ring.try_lock(),
        };
        let Some(ring) = ring else {
            let reason = match self.lock_timeout {
                Some(timeout) => format!("not acquired within {timeout:?}"),
                None => "lock is held".into(),
            };
            return Err(CursorError::LockFailure {
                operation: "try_acquire",
                reason,
            });
        };
        Ok(CursorGuard { ring })
    }

    /// Acquire the lock, blocking until it is available.
    pub fn acquire(&self) -> CursorGuard<'_, R> {
        CursorGuard {
            ring: self.ring.lock(),
        }
    }

    /// Install the worker pool under the lock.
    ///
    /// Invalid input is returned as [`CursorError::InvalidArgument`] with the
    /// ring untouched. An allocation failure is fatal.
    pub fn allocate(
        &self,
        entries: Vec<WorkerDescriptor>,
        length: usize,
    ) -> Result<(), CursorError> {
        let mut guard = self.acquire();
        match guard.allocate(entries, length) {
            Err(err) if err.is_fatal() => {
                drop(guard);
                escalate(err)
            }
            result => result,
        }
    }

    /// Release the worker pool under the lock.
    pub fn destroy(&self) {
        self.acquire().destroy();
    }

    /// Step once and, on dispatch, read the dispatched worker, all under one
    /// lock acquisition.
    pub fn dispatch_next(&self) -> Option<WorkerDescriptor> {
        let mut guard = self.acquire();
        match guard.step() {
            StepOutcome::Continue => guard.last_dispatched().cloned(),
            StepOutcome::Stop => None,
        }
    }

    /// Apply externally observed statuses to every worker.
    ///
    /// Returns the number of workers whose status changed.
    pub fn apply_probe(&self, probe: &dyn StatusProbe) -> usize {
        let mut guard = self.acquire();
        let updates: Vec<(usize, WorkerStatus)> = guard
            .entries()
            .iter()
            .enumerate()
            .filter_map(|(index, worker)| {
                probe
                    .probe(worker)
                    .filter(|observed| *observed != worker.status)
                    .map(|observed| (index, observed))
            })
            .collect();

        let mut changed = 0;
        for (index, observed) in updates {
            let result = guard.set_status(index, observed);
            debug_assert!(result.is_ok(), "index {index} in range while applying verdicts");
            match result {
                Ok(previous) => {
                    tracing::debug!(
                        address = %guard.entries()[index].address(),
                        from = %previous,
                        to = %observed,
                        "worker status changed by probe"
                    );
                    changed += 1;
                }
                Err(err) => {
                    tracing::warn!(index, error = %err, "status update not applied");
                }
            }
        }
        changed
    }

    /// Copy of the current pool in ring order.
    pub fn snapshot(&self) -> Vec<WorkerDescriptor> {
        self.acquire().entries().to_vec()
    }
}

/// Exclusive access to a [`SharedCursor`]'s ring.
///
/// Dereferences to the ring, so [`WorkerRing`] methods (including `step`)
/// are called directly on the guard. Dropping it releases the lock.
pub struct CursorGuard<'a, R: WorkerRing> {
    ring: MutexGuard<'a, R>,
}

impl<R: WorkerRing> fmt::Debug for CursorGuard<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorGuard")
            .field("ring_type", &type_name::<R>())
            .field("len", &self.ring.len())
            .field("position", &self.ring.position())
            .finish()
    }
}

impl<R: WorkerRing> Deref for CursorGuard<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.ring
    }
}

impl<R: WorkerRing> DerefMut for CursorGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        &mut self.ring
    }
}
