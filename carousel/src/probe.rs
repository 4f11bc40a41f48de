use crate::worker::{WorkerDescriptor, WorkerStatus};

/// Source of externally observed worker health.
///
/// Implementations decide how a worker's status is determined (network
/// probes, heartbeats, operator input). The cursor only consumes the verdict:
/// returning `None` leaves the worker as it is.
pub trait StatusProbe: Send + Sync {
    /// Observed status for `worker`, if known.
    fn probe(&self, worker: &WorkerDescriptor) -> Option<WorkerStatus>;
}

impl<F> StatusProbe for F
where
    F: Fn(&WorkerDescriptor) -> Option<WorkerStatus> + Send + Sync,
{
    fn probe(&self, worker: &WorkerDescriptor) -> Option<WorkerStatus> {
        self(worker)
    }
}
