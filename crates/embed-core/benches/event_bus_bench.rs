//! Criterion benchmarks for event bus emission.
//!
//! Run with:
//! ```bash
//! cargo bench --package embed-core --bench event_bus_bench
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use embed_core::{listener, EventBus};
use serde_json::{json, Value};

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn bus_with_listeners(count: usize) -> (EventBus<Value>, Arc<AtomicU64>) {
    let bus = EventBus::new();
    let hits = Arc::new(AtomicU64::new(0));
    for _ in 0..count {
        let hits = Arc::clone(&hits);
        bus.on(
            "playing",
            listener(move |_: &Value| {
                hits.fetch_add(1, Ordering::Relaxed);
            }),
        );
    }
    (bus, hits)
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

/// Emission cost as the listener count grows.
fn bench_emit_scaling(c: &mut Criterion) {
    let payload = json!({"x": 1});
    let mut group = c.benchmark_group("emit");

    for &count in &[1usize, 4, 16, 64] {
        let (bus, _hits) = bus_with_listeners(count);
        group.bench_with_input(BenchmarkId::new("listeners", count), &payload, |b, p| {
            b.iter(|| bus.emit(black_box("playing"), black_box(p)))
        });
    }

    group.finish();
}

/// The no-listener fast path: foreign event names emitted on a busy bus.
fn bench_emit_miss(c: &mut Criterion) {
    let (bus, _hits) = bus_with_listeners(16);
    let payload = Value::Null;

    c.bench_function("emit_unregistered_event", |b| {
        b.iter(|| bus.emit(black_box("offline"), black_box(&payload)))
    });
}

/// Register-then-fire cost of a one-shot listener.
fn bench_once_cycle(c: &mut Criterion) {
    let bus: EventBus<Value> = EventBus::new();
    let noop = listener(|_: &Value| {});
    let payload = Value::Null;

    c.bench_function("once_register_and_fire", |b| {
        b.iter(|| {
            bus.once("ready", Arc::clone(&noop));
            bus.emit(black_box("ready"), black_box(&payload))
        })
    });
}

criterion_group!(benches, bench_emit_scaling, bench_emit_miss, bench_once_cycle);
criterion_main!(benches);
