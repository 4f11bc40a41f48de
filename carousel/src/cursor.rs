use std::fmt;
use std::sync::Arc;

use crate::error::CursorError;
use crate::events::{NoopObserver, ScanObserver};
use crate::telemetry;
use crate::worker::{WorkerDescriptor, WorkerStatus};

/// Result of a single scan step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StepOutcome {
    /// A ready worker was dispatched to; read it through `last_dispatched`.
    Continue,
    /// The probed worker was busy or broken, or the ring is empty.
    Stop,
}

/// Capability surface of a worker ring.
///
/// [`RingCursor`] is the production implementation; tests substitute mocks.
/// Mutating methods take `&mut self`, so a shared ring is only reachable
/// through [`CursorGuard`](crate::CursorGuard).
pub trait WorkerRing: Send {
    /// Install the worker pool. `length` must equal `entries.len()`.
    fn allocate(
        &mut self,
        entries: Vec<WorkerDescriptor>,
        length: usize,
    ) -> Result<(), CursorError>;

    /// Probe the worker under the cursor, dispatch to it if ready, and advance.
    fn step(&mut self) -> StepOutcome;

    /// Release the pool and return to the empty state.
    fn destroy(&mut self);

    /// Current scan position.
    fn position(&self) -> usize;

    /// Number of workers in the ring.
    fn len(&self) -> usize;

    /// Whether the ring holds no workers.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The worker most recently dispatched to.
    fn last_dispatched(&self) -> Option<&WorkerDescriptor>;

    /// All workers in ring order.
    fn entries(&self) -> &[WorkerDescriptor];

    /// Overwrite a worker's status, returning the previous one.
    fn set_status(
        &mut self,
        index: usize,
        status: WorkerStatus,
    ) -> Result<WorkerStatus, CursorError>;
}

/// Fixed-capacity round-robin cursor over a pool of workers.
///
/// The pool lives in a single boxed slice installed once by
/// [`allocate`](WorkerRing::allocate). `position` is always a valid index
/// into it while the ring is allocated.
pub struct RingCursor {
    entries: Box<[WorkerDescriptor]>,
    position: usize,
    last_dispatched: Option<usize>,
    observer: Arc<dyn ScanObserver>,
}

impl fmt::Debug for RingCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingCursor")
            .field("len", &self.entries.len())
            .field("position", &self.position)
            .field("last_dispatched", &self.last_dispatched)
            .finish()
    }
}

impl Default for RingCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl RingCursor {
    /// Create an empty cursor with no observer.
    pub fn new() -> Self {
        Self::with_observer(Arc::new(NoopObserver))
    }

    /// Create an empty cursor reporting scan events to `observer`.
    pub fn with_observer(observer: Arc<dyn ScanObserver>) -> Self {
        Self {
            entries: Box::default(),
            position: 0,
            last_dispatched: None,
            observer,
        }
    }

    /// The worker under the cursor.
    pub fn cursor(&self) -> Option<&WorkerDescriptor> {
        self.entries.get(self.position)
    }

    fn advance(&mut self) {
        self.position = (self.position + 1) % self.entries.len();
    }
}

impl WorkerRing for RingCursor {
    fn allocate(
        &mut self,
        entries: Vec<WorkerDescriptor>,
        length: usize,
    ) -> Result<(), CursorError> {
        const OP: &str = "allocate";

        if entries.is_empty() || length == 0 {
            return Err(CursorError::invalid(OP, "worker list is empty"));
        }
        if entries.len() != length {
            return Err(CursorError::invalid(
                OP,
                format!("length {length} does not match {} workers", entries.len()),
            ));
        }
        if !self.entries.is_empty() {
            return Err(CursorError::invalid(
                OP,
                "cursor already allocated; destroy it first",
            ));
        }

        let _span = telemetry::allocate_span(length).entered();

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(length)
            .map_err(|source| CursorError::AllocationFailure {
                operation: OP,
                source,
            })?;
        buffer.extend(entries);

        self.entries = buffer.into_boxed_slice();
        self.position = 0;
        self.last_dispatched = Some(length - 1);

        telemetry::set_pool_size(length);
        Ok(())
    }

    fn step(&mut self) -> StepOutcome {
        let position = self.position;
        let Some(worker) = self.entries.get_mut(position) else {
            tracing::debug!("step on an empty ring");
            return StepOutcome::Stop;
        };
        let _span = telemetry::step_span(position, worker.address()).entered();

        let outcome = match worker.status {
            WorkerStatus::Busy => {
                telemetry::record_skipped_busy(worker.address(), position);
                self.observer.on_skipped_busy(worker, position);
                StepOutcome::Stop
            }
            WorkerStatus::Broken => {
                telemetry::record_broken(worker.address(), position);
                self.observer.on_broken(worker, position);
                StepOutcome::Stop
            }
            WorkerStatus::Ready => {
                worker.status = WorkerStatus::Busy;
                telemetry::record_dispatched(worker.address(), position);
                self.observer.on_dispatched(worker, position);
                self.last_dispatched = Some(position);
                StepOutcome::Continue
            }
        };

        self.advance();
        outcome
    }

    fn destroy(&mut self) {
        let released = std::mem::take(&mut self.entries);
        self.position = 0;
        self.last_dispatched = None;

        tracing::info!(released = released.len(), "worker ring destroyed");
        telemetry::set_pool_size(0);
    }

    fn position(&self) -> usize {
        self.position
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn last_dispatched(&self) -> Option<&WorkerDescriptor> {
        self.last_dispatched.and_then(|index| self.entries.get(index))
    }

    fn entries(&self) -> &[WorkerDescriptor] {
        &self.entries
    }

    fn set_status(
        &mut self,
        index: usize,
        status: WorkerStatus,
    ) -> Result<WorkerStatus, CursorError> {
        let len = self.entries.len();
        let worker = self.entries.get_mut(index).ok_or_else(|| {
            CursorError::invalid(
                "set_status",
                format!("index {index} out of range for {len} workers"),
            )
        })?;
        Ok(std::mem::replace(&mut worker.status, status))
    }
}
