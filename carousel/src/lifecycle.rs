use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;

use crate::config::CursorConfig;
use crate::cursor::RingCursor;
use crate::events::{InProcEventBus, NoopObserver, ScanObserver};
use crate::guard::SharedCursor;

/// Owner of the one shared cursor handed to every caller in a context.
///
/// The cursor is created lazily on the first [`get_instance`](Self::get_instance)
/// and the same instance is returned until [`destroy`](Self::destroy), after
/// which the next access creates a fresh, empty cursor. Construct one
/// lifecycle per independent pool and pass it by reference; [`global`] exists
/// for programs that want a single process-wide instance.
pub struct InstanceLifecycle {
    slot: Mutex<Option<Arc<SharedCursor>>>,
    config: CursorConfig,
    observer: Arc<dyn ScanObserver>,
    event_bus: Option<Arc<InProcEventBus>>,
}

impl fmt::Debug for InstanceLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceLifecycle")
            .field("config", &self.config)
            .field("initialized", &self.is_initialized())
            .field("event_bus", &self.event_bus)
            .finish()
    }
}

impl Default for InstanceLifecycle {
    fn default() -> Self {
        Self::new(CursorConfig::default())
    }
}

impl InstanceLifecycle {
    /// Create a lifecycle whose cursors use `config`.
    pub fn new(config: CursorConfig) -> Self {
        Self {
            slot: Mutex::new(None),
            config,
            observer: Arc::new(NoopObserver),
            event_bus: None,
        }
    }

    /// Report scan events of every cursor created from now on to `observer`.
    ///
    /// Replaces an event bus installed by [`with_event_bus`](Self::with_event_bus).
    pub fn with_observer(mut self, observer: Arc<dyn ScanObserver>) -> Self {
        self.observer = observer;
        self.event_bus = None;
        self
    }

    /// Publish scan events of created cursors on an [`InProcEventBus`] sized
    /// by `event_capacity`.
    pub fn with_event_bus(mut self) -> Self {
        let bus = Arc::new(InProcEventBus::new(self.config.event_capacity));
        self.observer = bus.clone();
        self.event_bus = Some(bus);
        self
    }

    /// The event bus installed by [`with_event_bus`](Self::with_event_bus).
    pub fn event_bus(&self) -> Option<&Arc<InProcEventBus>> {
        self.event_bus.as_ref()
    }

    /// Configuration applied to created cursors.
    pub fn config(&self) -> &CursorConfig {
        &self.config
    }

    /// The shared cursor, created on first use.
    pub fn get_instance(&self) -> Arc<SharedCursor> {
        let mut slot = self.slot.lock();
        let cursor = slot.get_or_insert_with(|| {
            tracing::debug!("creating shared cursor");
            Arc::new(SharedCursor::new(
                RingCursor::with_observer(Arc::clone(&self.observer)),
                &self.config,
            ))
        });
        Arc::clone(cursor)
    }

    /// Release the current cursor's workers and forget the instance.
    ///
    /// Holders of the old handle keep an empty cursor; the next
    /// [`get_instance`](Self::get_instance) creates a new one.
    pub fn destroy(&self) {
        let taken = self.slot.lock().take();
        if let Some(cursor) = taken {
            cursor.destroy();
            tracing::debug!("shared cursor invalidated");
        }
    }

    /// Whether a cursor currently exists.
    pub fn is_initialized(&self) -> bool {
        self.slot.lock().is_some()
    }
}

static GLOBAL: LazyLock<InstanceLifecycle> = LazyLock::new(InstanceLifecycle::default);

/// Process-wide lifecycle with default configuration.
pub fn global() -> &'static InstanceLifecycle {
    &GLOBAL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::WorkerRing;
    use crate::events::CursorEventPayload;
    use crate::worker::WorkerDescriptor;

    #[test]
    fn test_get_instance_is_lazy_and_shared() {
        let lifecycle = InstanceLifecycle::default();
        assert!(!lifecycle.is_initialized());

        let a = lifecycle.get_instance();
        let b = lifecycle.get_instance();
        assert!(lifecycle.is_initialized());
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_destroy_recreates_fresh_cursor() {
        let lifecycle = InstanceLifecycle::default();
        let first = lifecycle.get_instance();
        first
            .allocate(vec![WorkerDescriptor::ready("node0.example.org")], 1)
            .unwrap();

        lifecycle.destroy();
        assert!(!lifecycle.is_initialized());
        assert!(first.acquire().is_empty());

        let second = lifecycle.get_instance();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second.acquire().is_empty());
    }

    #[test]
    fn test_destroy_without_instance_is_noop() {
        let lifecycle = InstanceLifecycle::default();
        lifecycle.destroy();
        assert!(!lifecycle.is_initialized());
    }

    #[test]
    fn test_event_bus_sized_from_config() {
        let config = CursorConfig::default().with_event_capacity(16);
        let lifecycle = InstanceLifecycle::new(config).with_event_bus();
        let bus = lifecycle.event_bus().expect("bus installed");
        assert_eq!(bus.capacity(), 16);

        let mut events = bus.subscribe();
        let cursor = lifecycle.get_instance();
        cursor
            .allocate(vec![WorkerDescriptor::ready("node0.example.org")], 1)
            .unwrap();
        assert!(cursor.dispatch_next().is_some());

        let event = events.try_recv().unwrap();
        assert!(matches!(
            event.payload,
            CursorEventPayload::Dispatched { position: 0, .. }
        ));
    }

    #[test]
    fn test_observer_replaces_event_bus() {
        let lifecycle = InstanceLifecycle::default()
            .with_event_bus()
            .with_observer(Arc::new(NoopObserver));
        assert!(lifecycle.event_bus().is_none());
    }

    #[test]
    fn test_global_returns_same_lifecycle() {
        assert!(std::ptr::eq(global(), global()));
        assert!(Arc::ptr_eq(&global().get_instance(), &global().get_instance()));
    }
}
