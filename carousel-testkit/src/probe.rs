use carousel::{ScanObserver, StatusProbe, WorkerAddress, WorkerDescriptor, WorkerStatus};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Probe that reports statuses set by the test.
#[derive(Clone, Debug, Default)]
pub struct ScriptedProbe {
    verdicts: Arc<Mutex<HashMap<WorkerAddress, WorkerStatus>>>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `status` for `address` on every probe until changed.
    pub fn set(&self, address: impl Into<WorkerAddress>, status: WorkerStatus) {
        self.verdicts.lock().insert(address.into(), status);
    }

    /// Stop reporting anything for `address`.
    pub fn forget(&self, address: &WorkerAddress) {
        self.verdicts.lock().remove(address);
    }
}

impl StatusProbe for ScriptedProbe {
    fn probe(&self, worker: &WorkerDescriptor) -> Option<WorkerStatus> {
        let verdict = self.verdicts.lock().get(worker.address()).copied();
        if let Some(status) = verdict {
            tracing::trace!(address = %worker.address(), %status, "scripted probe verdict");
        }
        verdict
    }
}

/// What a [`RecordingObserver`] saw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Observed {
    Dispatched { address: String, position: usize },
    SkippedBusy { address: String, position: usize },
    Broken { address: String, position: usize },
}

/// Scan observer that keeps every hook invocation in order.
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver {
    seen: Arc<Mutex<Vec<Observed>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self) -> Vec<Observed> {
        self.seen.lock().clone()
    }

    pub fn dispatched_addresses(&self) -> Vec<String> {
        self.seen
            .lock()
            .iter()
            .filter_map(|seen| match seen {
                Observed::Dispatched { address, .. } => Some(address.clone()),
                _ => None,
            })
            .collect()
    }
}

impl ScanObserver for RecordingObserver {
    fn on_dispatched(&self, worker: &WorkerDescriptor, position: usize) {
        self.seen.lock().push(Observed::Dispatched {
            address: worker.address().to_string(),
            position,
        });
    }

    fn on_skipped_busy(&self, worker: &WorkerDescriptor, position: usize) {
        self.seen.lock().push(Observed::SkippedBusy {
            address: worker.address().to_string(),
            position,
        });
    }

    fn on_broken(&self, worker: &WorkerDescriptor, position: usize) {
        self.seen.lock().push(Observed::Broken {
            address: worker.address().to_string(),
            position,
        });
    }
}
