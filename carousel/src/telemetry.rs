//! Tracing instrumentation for the cursor.
//!
//! Span constructors and `record_*` helpers used by the cursor and its guard.
//! Each helper logs through `tracing` and, with the `metrics` feature
//! enabled, updates the matching Prometheus series.

use tracing::{Span, info_span};

/// Create a tracing span for ring allocation.
#[must_use]
pub fn allocate_span(length: usize) -> Span {
    info_span!("carousel.allocate", length = length)
}

/// Create a tracing span for a single scan step.
///
/// # Arguments
/// * `position` - Ring index probed by the step
/// * `address` - Address of the worker at that index
#[must_use]
pub fn step_span(position: usize, address: impl AsRef<str>) -> Span {
    tracing::trace_span!(
        "carousel.step",
        position = position,
        address = %address.as_ref(),
    )
}

/// Create a tracing span for a bounded polling run.
#[must_use]
pub fn poll_span(max_attempts: u32) -> Span {
    info_span!("carousel.poll", max_attempts = max_attempts)
}

/// Record a successful dispatch.
pub fn record_dispatched(address: impl AsRef<str>, position: usize) {
    tracing::debug!(
        address = %address.as_ref(),
        position = position,
        "worker dispatched"
    );

    #[cfg(feature = "metrics")]
    crate::metrics::record_dispatched(address.as_ref());
}

/// Record a step that passed over a busy worker.
pub fn record_skipped_busy(address: impl AsRef<str>, position: usize) {
    tracing::trace!(
        address = %address.as_ref(),
        position = position,
        "worker busy; skipped"
    );

    #[cfg(feature = "metrics")]
    crate::metrics::record_skipped("busy");
}

/// Record a step that passed over a broken worker.
pub fn record_broken(address: impl AsRef<str>, position: usize) {
    tracing::warn!(
        address = %address.as_ref(),
        position = position,
        "worker broken; skipped"
    );

    #[cfg(feature = "metrics")]
    crate::metrics::record_skipped("broken");
}

/// Record the pool size after allocation or destruction.
pub fn set_pool_size(size: usize) {
    tracing::info!(size = size, "worker pool size updated");

    #[cfg(feature = "metrics")]
    crate::metrics::set_pool_size(size as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_names() {
        // Without a subscriber spans are disabled; metadata is only present
        // when one is installed.
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::TRACE)
                .with_test_writer()
                .finish(),
        );
        assert_eq!(allocate_span(3).metadata().unwrap().name(), "carousel.allocate");
        assert_eq!(step_span(0, "node0").metadata().unwrap().name(), "carousel.step");
        assert_eq!(poll_span(10).metadata().unwrap().name(), "carousel.poll");
    }

    #[test]
    fn test_record_helpers_do_not_panic() {
        record_dispatched("node0.example.org", 0);
        record_skipped_busy("node1.example.org", 1);
        record_broken("node2.example.org", 2);
        set_pool_size(3);
    }
}
