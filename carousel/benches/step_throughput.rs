//! Benchmarks for ring stepping using criterion.
//!
//! - Unguarded steps over an all-ready ring, reset by probe each revolution
//! - Guarded `dispatch_next` with and without contention
//! - `poll` over a pool where only the last worker is ready

#![allow(missing_docs)]

use std::sync::Arc;

use carousel::{CursorConfig, RetryPolicy, RingCursor, SharedCursor, WorkerRing, WorkerStatus};
use carousel_testkit::{pool_with_statuses, ready_pool};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

fn reset_all(ring: &mut RingCursor) {
    for index in 0..ring.len() {
        let _ = ring.set_status(index, WorkerStatus::Ready);
    }
}

/// Benchmark: one full revolution of unguarded steps.
fn bench_ring_revolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_revolution");

    for len in [4usize, 64, 1024] {
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            let mut ring = RingCursor::new();
            ring.allocate(ready_pool(len), len).expect("allocate");
            b.iter(|| {
                for _ in 0..len {
                    std::hint::black_box(ring.step());
                }
                reset_all(&mut ring);
            });
        });
    }

    group.finish();
}

/// Benchmark: guarded dispatch from one thread and from four.
fn bench_guarded_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("guarded_dispatch");
    let len = 256;

    group.bench_function("single_thread", |b| {
        let cursor = SharedCursor::with_config(&CursorConfig::default());
        cursor.allocate(ready_pool(len), len).expect("allocate");
        b.iter(|| {
            if cursor.dispatch_next().is_none() {
                let mut guard = cursor.acquire();
                reset_all(&mut guard);
            }
        });
    });

    group.bench_function("four_threads", |b| {
        let cursor = Arc::new(SharedCursor::with_config(&CursorConfig::default()));
        cursor.allocate(ready_pool(len), len).expect("allocate");
        b.iter(|| {
            std::thread::scope(|scope| {
                for _ in 0..4 {
                    let cursor = Arc::clone(&cursor);
                    scope.spawn(move || {
                        for _ in 0..len / 4 {
                            std::hint::black_box(cursor.dispatch_next());
                        }
                    });
                }
            });
            reset_all(&mut cursor.acquire());
        });
    });

    group.finish();
}

/// Benchmark: poll that must skip every busy worker before dispatching.
fn bench_poll_worst_case(c: &mut Criterion) {
    let mut group = c.benchmark_group("poll_worst_case");
    let len = 64;
    let mut statuses = vec![WorkerStatus::Busy; len - 1];
    statuses.push(WorkerStatus::Ready);

    group.bench_function("last_ready", |b| {
        b.iter_batched(
            || {
                let cursor = SharedCursor::with_config(&CursorConfig::default());
                cursor
                    .allocate(pool_with_statuses(&statuses), len)
                    .expect("allocate");
                cursor
            },
            |cursor| std::hint::black_box(cursor.poll(&RetryPolicy::attempts(len as u32))),
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_ring_revolution,
    bench_guarded_dispatch,
    bench_poll_worst_case
);
criterion_main!(benches);
