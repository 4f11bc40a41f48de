//! Round-robin dispatch over a small worker pool.
//!
//! Allocates three workers, polls for a ready one a few times, marks one
//! worker broken through a probe and shows the cursor passing over it.
//!
//! Run with `RUST_LOG=carousel=debug cargo run --example round_robin` to see
//! the scan events.

use std::time::Duration;

use carousel::{
    CursorConfig, InstanceLifecycle, PollOutcome, RetryPolicy, WorkerDescriptor, WorkerRing,
    WorkerStatus,
};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let lifecycle = InstanceLifecycle::new(CursorConfig::default());
    let cursor = lifecycle.get_instance();

    let workers: Vec<_> = (0..3)
        .map(|i| WorkerDescriptor::ready(format!("node{i}.example.org")))
        .collect();
    let len = workers.len();
    cursor.allocate(workers, len)?;

    let policy =
        RetryPolicy::from(&lifecycle.config().poll).with_backoff(Duration::from_millis(10));

    for round in 0..2 {
        match cursor.poll(&policy) {
            PollOutcome::Dispatched { worker, attempts } => {
                let address = worker.address();
                println!("round {round}: dispatched to {address} after {attempts} step(s)");
            }
            outcome => println!("round {round}: no worker available ({outcome:?})"),
        }
    }

    // node0 finished its work, node2 went away.
    let probe = |worker: &WorkerDescriptor| match worker.address().as_str() {
        "node0.example.org" => Some(WorkerStatus::Ready),
        "node2.example.org" => Some(WorkerStatus::Broken),
        _ => None,
    };
    let changed = cursor.apply_probe(&probe);
    println!("probe changed {changed} worker(s)");

    for round in 2..4 {
        let mut guard = cursor.acquire();
        let outcome = guard.step();
        let position = guard.position();
        let last = guard.last_dispatched().map(|w| w.address().to_string());
        drop(guard);
        println!("round {round}: {outcome:?}, next position {position}, last dispatched {last:?}");
    }

    let outcome = cursor.poll(&RetryPolicy::attempts(3));
    println!("final poll: {outcome:?}");

    lifecycle.destroy();
    Ok(())
}
