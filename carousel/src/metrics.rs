//! Prometheus metrics for the cursor.
//!
//! All metrics are conditionally compiled behind the `metrics` feature flag.
//!
//! # Metrics
//!
//! ## Counters
//! - `carousel_dispatches_total` - Workers dispatched to, by address
//! - `carousel_skips_total` - Steps that passed over a worker, by reason
//!
//! ## Gauges
//! - `carousel_pool_size` - Number of workers in the ring
#![cfg(feature = "metrics")]

use prometheus::{CounterVec, Gauge, Opts, Registry};
use std::sync::LazyLock;

/// Global Prometheus registry for carousel metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Counter for dispatches.
///
/// Labels:
/// - `address`: The dispatched worker's address
pub static DISPATCHES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new("carousel_dispatches_total", "Total number of worker dispatches");
    CounterVec::new(opts, &["address"])
        .expect("carousel_dispatches_total metric creation failed")
});

/// Counter for skipped workers.
///
/// Labels:
/// - `reason`: `busy` or `broken`
pub static SKIPS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new("carousel_skips_total", "Total number of skipped workers");
    CounterVec::new(opts, &["reason"]).expect("carousel_skips_total metric creation failed")
});

/// Gauge for the ring size.
pub static POOL_SIZE: LazyLock<Gauge> = LazyLock::new(|| {
    Gauge::new("carousel_pool_size", "Number of workers in the ring")
        .expect("carousel_pool_size metric creation failed")
});

/// Register all metrics with the global registry.
///
/// Calling it more than once is harmless.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let registry = &*REGISTRY;

    for metric in [
        Box::new(DISPATCHES_TOTAL.clone()) as Box<dyn prometheus::core::Collector>,
        Box::new(SKIPS_TOTAL.clone()),
        Box::new(POOL_SIZE.clone()),
    ] {
        match registry.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

/// Increment the dispatch counter.
pub fn record_dispatched(address: &str) {
    DISPATCHES_TOTAL.with_label_values(&[address]).inc();
}

/// Increment the skip counter.
pub fn record_skipped(reason: &str) {
    SKIPS_TOTAL.with_label_values(&[reason]).inc();
}

/// Update the pool size gauge.
pub fn set_pool_size(size: f64) {
    POOL_SIZE.set(size);
}

/// Gather all registered metrics in Prometheus text format.
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = prometheus::TextEncoder::new();
    encoder.encode_to_string(&REGISTRY.gather())
}
