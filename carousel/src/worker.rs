use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Health of a remote worker as last observed by the probing side.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    /// Idle and eligible for dispatch.
    #[default]
    Ready,
    /// Dispatched to and not yet released by the probe.
    Busy,
    /// Unreachable or failing; skipped until the probe marks it ready again.
    Broken,
}

impl WorkerStatus {
    /// Stable lowercase label used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerStatus::Ready => "ready",
            WorkerStatus::Busy => "busy",
            WorkerStatus::Broken => "broken",
        }
    }
}

impl Display for WorkerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network identity of a worker, e.g. `"node0.example.org"`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerAddress(String);

impl WorkerAddress {
    /// Wrap an address string.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Borrow the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for WorkerAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WorkerAddress {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for WorkerAddress {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for WorkerAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One slot of the ring: an immutable address plus a mutable status.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct WorkerDescriptor {
    address: WorkerAddress,
    /// Current health of the worker.
    pub status: WorkerStatus,
}

impl WorkerDescriptor {
    /// Create a descriptor with an explicit status.
    pub fn new(address: impl Into<WorkerAddress>, status: WorkerStatus) -> Self {
        Self {
            address: address.into(),
            status,
        }
    }

    /// Create a descriptor that is ready for dispatch.
    pub fn ready(address: impl Into<WorkerAddress>) -> Self {
        Self::new(address, WorkerStatus::Ready)
    }

    /// The worker's address.
    pub fn address(&self) -> &WorkerAddress {
        &self.address
    }

    /// Whether the worker can be dispatched to right now.
    pub fn is_ready(&self) -> bool {
        self.status == WorkerStatus::Ready
    }
}
