//! Carousel - a guarded round-robin cursor over a fixed pool of workers.
//!
//! The cursor walks a ring of worker descriptors one slot per step. A ready
//! worker under the cursor is marked busy and becomes the last dispatched
//! worker; busy and broken workers are passed over. The ring never resizes
//! and never recovers a broken worker on its own: statuses other than the
//! ready to busy transition are set by an external probe.
//!
//! # Core Concepts
//!
//! - **Worker**: [`WorkerDescriptor`] pairs a [`WorkerAddress`] with a
//!   [`WorkerStatus`].
//!
//! - **Ring**: [`RingCursor`] implements the [`WorkerRing`] capability:
//!   `allocate` once, `step` repeatedly, `destroy` once.
//!
//! - **Guard**: [`SharedCursor`] puts a ring behind one lock. Stepping needs a
//!   [`CursorGuard`], so a step and the read of the dispatched worker always
//!   happen under the same acquisition.
//!
//! - **Lifecycle**: [`InstanceLifecycle`] lazily creates the shared cursor and
//!   hands out the same instance until it is destroyed.
//!
//! - **Polling**: [`SharedCursor::poll`] and [`SharedCursor::poll_async`]
//!   retry a bounded number of steps and report a [`PollOutcome`].
//!
//! # Feature Flags
//!
//! - `metrics` - Prometheus counters for dispatches and skips
//!
//! # Example
//!
//! ```
//! use carousel::{CursorConfig, InstanceLifecycle, WorkerDescriptor, WorkerRing, StepOutcome};
//!
//! let lifecycle = InstanceLifecycle::new(CursorConfig::default());
//! let cursor = lifecycle.get_instance();
//! cursor
//!     .allocate(
//!         vec![
//!             WorkerDescriptor::ready("node0.example.org"),
//!             WorkerDescriptor::ready("node1.example.org"),
//!         ],
//!         2,
//!     )
//!     .unwrap();
//!
//! let mut guard = cursor.acquire();
//! assert_eq!(guard.step(), StepOutcome::Continue);
//! assert_eq!(
//!     guard.last_dispatched().unwrap().address().as_str(),
//!     "node0.example.org"
//! );
//! ```

/// Configuration for the shared cursor and caller-side polling.
///
/// Defines [`CursorConfig`] and [`PollConfig`].
pub mod config;

/// The ring state machine.
///
/// The `cursor` module provides the [`WorkerRing`] trait, its
/// [`RingCursor`] implementation and the [`StepOutcome`] of a step.
pub mod cursor;

/// Error kinds and fatal escalation.
pub mod error;

/// Scan observation and the in-process event bus.
///
/// - [`ScanObserver`] - hooks invoked on dispatch, busy skip and broken worker
/// - [`InProcEventBus`] - broadcasts [`CursorEvent`]s to subscribers
pub mod events;

/// Mutual exclusion around a ring.
///
/// Provides [`SharedCursor`] and the scoped [`CursorGuard`].
pub mod guard;

/// Lazy creation and invalidation of the shared cursor.
pub mod lifecycle;

#[cfg(feature = "metrics")]
/// Prometheus metrics, available with the `metrics` feature.
pub mod metrics;

/// Bounded retry over guarded steps.
///
/// Provides [`RetryPolicy`], [`PollOutcome`] and [`ShutdownToken`].
pub mod poll;

/// Seam for externally observed worker health.
pub mod probe;

/// Tracing span helpers.
pub mod telemetry;

/// Worker descriptors.
pub mod worker;

pub use config::*;
pub use cursor::*;
pub use error::CursorError;
pub use events::*;
pub use guard::*;
pub use lifecycle::InstanceLifecycle;
pub use poll::*;
pub use probe::*;
pub use worker::*;
