//! Criterion benchmarks for snapshot merging and inbound message decoding.
//!
//! Run with:
//! ```bash
//! cargo bench --package embed-core --bench state_merge_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use embed_core::{decode_message, PlayerState, NAMESPACE};
use serde_json::json;

/// Typical periodic update: the position ticks forward, nothing else changes.
fn bench_merge_time_tick(c: &mut Criterion) {
    let state = PlayerState::default().merged(&json!({
        "channelName": "somechannel",
        "playback": "Playing",
        "volume": 0.5,
    }));
    let update = json!({"currentTime": 1234.5});

    c.bench_function("merge_time_tick", |b| {
        b.iter(|| state.merged(black_box(&update)))
    });
}

/// Full snapshot replacement, as sent right after the surface becomes ready.
fn bench_merge_full_snapshot(c: &mut Criterion) {
    let state = PlayerState::default();
    let update = json!({
        "channelName": "somechannel",
        "channelID": "123456",
        "currentTime": 0.0,
        "duration": 0.0,
        "ended": false,
        "muted": true,
        "volume": 0.5,
        "quality": "chunked",
        "qualitiesAvailable": [
            {"name": "Source", "group": "chunked"},
            {"name": "720p60", "group": "720p60"},
            {"name": "480p30", "group": "480p30"}
        ],
        "playback": "Playing",
        "stats": {"videoStats": {"fps": 60.0, "videoResolution": "1920x1080"}}
    });

    c.bench_function("merge_full_snapshot", |b| {
        b.iter(|| state.merged(black_box(&update)))
    });
}

/// Decoder cost on our own traffic versus foreign noise.
fn bench_decode(c: &mut Criterion) {
    let ours = json!({"namespace": NAMESPACE, "eventName": "UpdateState", "params": {"volume": 1.0}});
    let foreign = json!({"namespace": "analytics", "eventName": "pageview", "params": {}});
    let mut group = c.benchmark_group("decode_message");

    group.bench_function("own_namespace", |b| b.iter(|| decode_message(black_box(&ours))));
    group.bench_function("foreign_namespace", |b| {
        b.iter(|| decode_message(black_box(&foreign)))
    });

    group.finish();
}

criterion_group!(benches, bench_merge_time_tick, bench_merge_full_snapshot, bench_decode);
criterion_main!(benches);
