use carousel::{CursorError, StepOutcome, WorkerDescriptor, WorkerRing, WorkerStatus};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Call observed by a [`MockRing`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RingCall {
    Allocate { length: usize },
    Step,
    Destroy,
    SetStatus { index: usize, status: WorkerStatus },
}

/// Ring double that records calls and replays scripted step outcomes.
///
/// Steps not covered by the script return `Stop`. A scripted `Continue`
/// reports the worker at the current position as last dispatched without
/// changing its status.
#[derive(Clone, Debug, Default)]
pub struct MockRing {
    calls: Arc<Mutex<Vec<RingCall>>>,
    script: Arc<Mutex<VecDeque<StepOutcome>>>,
    entries: Vec<WorkerDescriptor>,
    position: usize,
    last_dispatched: Option<usize>,
}

impl MockRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes for upcoming steps.
    pub fn with_script(outcomes: impl IntoIterator<Item = StepOutcome>) -> Self {
        let ring = Self::new();
        ring.script.lock().extend(outcomes);
        ring
    }

    pub fn calls(&self) -> Vec<RingCall> {
        self.calls.lock().clone()
    }

    pub fn assert_step_count_eq(&self, expected: usize) {
        let steps = self
            .calls
            .lock()
            .iter()
            .filter(|call| **call == RingCall::Step)
            .count();
        assert_eq!(steps, expected, "Expected {expected} steps, got {steps}");
    }

    fn record(&self, call: RingCall) {
        self.calls.lock().push(call);
    }
}

impl WorkerRing for MockRing {
    fn allocate(
        &mut self,
        entries: Vec<WorkerDescriptor>,
        length: usize,
    ) -> Result<(), CursorError> {
        self.record(RingCall::Allocate { length });
        let reason = if entries.is_empty() || length == 0 {
            Some("worker list is empty".to_string())
        } else if entries.len() != length {
            Some(format!("length {length} does not match {} workers", entries.len()))
        } else if !self.entries.is_empty() {
            Some("cursor already allocated; destroy it first".to_string())
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(CursorError::InvalidArgument {
                operation: "allocate",
                reason,
            });
        }
        self.entries = entries;
        self.position = 0;
        self.last_dispatched = Some(length - 1);
        Ok(())
    }

    fn step(&mut self) -> StepOutcome {
        self.record(RingCall::Step);
        let outcome = self.script.lock().pop_front().unwrap_or(StepOutcome::Stop);
        if self.entries.is_empty() {
            return outcome;
        }
        if outcome == StepOutcome::Continue {
            self.last_dispatched = Some(self.position);
        }
        self.position = (self.position + 1) % self.entries.len();
        outcome
    }

    fn destroy(&mut self) {
        self.record(RingCall::Destroy);
        self.entries.clear();
        self.position = 0;
        self.last_dispatched = None;
    }

    fn position(&self) -> usize {
        self.position
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn last_dispatched(&self) -> Option<&WorkerDescriptor> {
        self.last_dispatched.and_then(|i| self.entries.get(i))
    }

    fn entries(&self) -> &[WorkerDescriptor] {
        &self.entries
    }

    fn set_status(
        &mut self,
        index: usize,
        status: WorkerStatus,
    ) -> Result<WorkerStatus, CursorError> {
        self.record(RingCall::SetStatus { index, status });
        match self.entries.get_mut(index) {
            Some(worker) => Ok(std::mem::replace(&mut worker.status, status)),
            None => Err(CursorError::InvalidArgument {
                operation: "set_status",
                reason: format!("index {index} out of range"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ready_pool;

    #[test]
    fn test_allocate_rejects_what_the_ring_rejects() {
        let mut ring = MockRing::new();
        assert!(ring.allocate(Vec::new(), 0).is_err());
        assert!(ring.allocate(ready_pool(2), 5).is_err());
        assert!(ring.is_empty());
        assert!(ring.last_dispatched().is_none());

        ring.allocate(ready_pool(2), 2).unwrap();
        let err = ring.allocate(ready_pool(3), 3).unwrap_err();
        assert_eq!(err.as_label(), "invalid_argument");
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.last_dispatched(), Some(&ring.entries()[1]));
    }

    #[test]
    fn test_unscripted_steps_stop() {
        let mut ring = MockRing::with_script([StepOutcome::Continue]);
        ring.allocate(ready_pool(2), 2).unwrap();
        assert_eq!(ring.step(), StepOutcome::Continue);
        assert_eq!(ring.step(), StepOutcome::Stop);
        ring.assert_step_count_eq(2);
        assert_eq!(ring.position(), 0);
    }
}
