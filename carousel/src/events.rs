use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::worker::{WorkerAddress, WorkerDescriptor};

/// Hooks invoked by the cursor while it scans.
///
/// Every hook runs inside the cursor's critical section, so implementations
/// must return quickly and must never block or re-enter the cursor.
pub trait ScanObserver: Send + Sync {
    /// A ready worker was marked busy and recorded as last dispatched.
    fn on_dispatched(&self, _worker: &WorkerDescriptor, _position: usize) {}

    /// A busy worker was passed over.
    fn on_skipped_busy(&self, _worker: &WorkerDescriptor, _position: usize) {}

    /// A broken worker was passed over. This is the alerting hook.
    fn on_broken(&self, _worker: &WorkerDescriptor, _position: usize) {}
}

/// Observer that ignores every scan event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {}

/// Metadata envelope attached to every cursor event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventMeta {
    /// Envelope schema version.
    pub version: u16,
    /// Unique, time-ordered event id.
    pub event_id: Uuid,
    /// Wall-clock time the event was emitted.
    pub timestamp: DateTime<Utc>,
}

impl EventMeta {
    /// Stamp a fresh envelope.
    pub fn new() -> Self {
        Self {
            version: 1,
            event_id: Uuid::now_v7(),
            timestamp: Utc::now(),
        }
    }
}

impl Default for EventMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// Event emitted for each observable scan step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CursorEvent {
    /// Envelope.
    pub meta: EventMeta,
    /// What happened.
    pub payload: CursorEventPayload,
}

impl CursorEvent {
    fn new(payload: CursorEventPayload) -> Self {
        Self {
            meta: EventMeta::new(),
            payload,
        }
    }
}

/// Scan step payloads.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CursorEventPayload {
    /// Worker at `position` was dispatched to.
    Dispatched {
        /// Address of the dispatched worker.
        address: WorkerAddress,
        /// Ring index of the worker.
        position: usize,
    },
    /// Worker at `position` was busy.
    SkippedBusy {
        /// Address of the skipped worker.
        address: WorkerAddress,
        /// Ring index of the worker.
        position: usize,
    },
    /// Worker at `position` was broken.
    BrokenScanned {
        /// Address of the broken worker.
        address: WorkerAddress,
        /// Ring index of the worker.
        position: usize,
    },
}

/// In-process event bus using tokio broadcast channels.
///
/// Publishing never waits on subscribers, which keeps it safe to call from
/// inside the cursor lock. Slow subscribers observe `RecvError::Lagged`
/// instead of holding up the scan; events published with no subscriber are
/// dropped.
pub struct InProcEventBus {
    sender: broadcast::Sender<CursorEvent>,
    capacity: usize,
}

impl std::fmt::Debug for InProcEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcEventBus")
            .field("capacity", &self.capacity)
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

impl InProcEventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender, capacity }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: CursorEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<CursorEvent> {
        self.sender.subscribe()
    }
}

impl ScanObserver for InProcEventBus {
    fn on_dispatched(&self, worker: &WorkerDescriptor, position: usize) {
        self.publish(CursorEvent::new(CursorEventPayload::Dispatched {
            address: worker.address().clone(),
            position,
        }));
    }

    fn on_skipped_busy(&self, worker: &WorkerDescriptor, position: usize) {
        self.publish(CursorEvent::new(CursorEventPayload::SkippedBusy {
            address: worker.address().clone(),
            position,
        }));
    }

    fn on_broken(&self, worker: &WorkerDescriptor, position: usize) {
        self.publish(CursorEvent::new(CursorEventPayload::BrokenScanned {
            address: worker.address().clone(),
            position,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    use crate::worker::WorkerStatus;

    #[tokio::test]
    async fn test_event_bus_broadcast_to_multiple_subscribers() {
        let bus = InProcEventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let worker = WorkerDescriptor::ready("node0.example.org");
        bus.on_dispatched(&worker, 0);
        bus.on_broken(&worker, 0);

        for rx in [&mut rx1, &mut rx2] {
            let first = timeout(Duration::from_millis(100), rx.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(
                first.payload,
                CursorEventPayload::Dispatched {
                    address: "node0.example.org".into(),
                    position: 0,
                }
            );
            let second = timeout(Duration::from_millis(100), rx.recv())
                .await
                .unwrap()
                .unwrap();
            assert!(matches!(
                second.payload,
                CursorEventPayload::BrokenScanned { position: 0, .. }
            ));
        }
    }

    #[tokio::test]
    async fn test_lagged_subscriber_doesnt_block_publisher() {
        let bus = InProcEventBus::new(2);
        let mut rx = bus.subscribe();
        let worker = WorkerDescriptor::new("node0.example.org", WorkerStatus::Busy);

        for position in 0..5 {
            bus.on_skipped_busy(&worker, position);
        }

        let result = timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(matches!(
            result,
            Ok(Err(broadcast::error::RecvError::Lagged(_)))
        ));
    }

    #[test]
    fn test_publish_without_subscribers_is_dropped() {
        let bus = InProcEventBus::new(4);
        bus.on_dispatched(&WorkerDescriptor::ready("node0.example.org"), 0);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.capacity(), 4);
    }

    #[test]
    fn test_event_meta_ids_are_unique() {
        let a = EventMeta::new();
        let b = EventMeta::new();
        assert_eq!(a.version, 1);
        assert_ne!(a.event_id, b.event_id);
        assert!(a.timestamp <= Utc::now());
    }
}
