//! Criterion benchmarks for the coordinate transform.
//!
//! `normalize` runs once per outbound sample and `denormalize` once per
//! inbound frame per peer.
//!
//! Run with:
//! ```bash
//! cargo bench --package cursor-core --bench transform_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cursor_core::domain::geometry::{denormalize, normalize, NormalizedPoint, TargetRect};

// ── Rect fixtures ─────────────────────────────────────────────────────────────

fn rects() -> Vec<(&'static str, TargetRect)> {
    vec![
        ("200x200", TargetRect::new(8.0, 8.0, 200.0, 200.0)),
        ("1920x1080", TargetRect::new(0.0, 64.0, 1920.0, 1080.0)),
        ("degenerate", TargetRect::ZERO),
    ]
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    for (name, rect) in rects() {
        group.bench_with_input(BenchmarkId::new("rect", name), &rect, |b, rect| {
            b.iter(|| normalize(black_box(100.5), black_box(73.25), black_box(rect)))
        });
    }
    group.finish();
}

fn bench_denormalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("denormalize");
    let point = NormalizedPoint::new(32767, 49151);
    for (name, rect) in rects() {
        group.bench_with_input(BenchmarkId::new("rect", name), &rect, |b, rect| {
            b.iter(|| denormalize(black_box(point), black_box(rect)))
        });
    }
    group.finish();
}

/// Sender and receiver with different sizes, the normal case between peers.
fn bench_cross_peer(c: &mut Criterion) {
    let sender = TargetRect::new(8.0, 8.0, 500.0, 500.0);
    let receiver = TargetRect::new(0.0, 0.0, 200.0, 200.0);
    c.bench_function("normalize_then_denormalize/500_to_200", |b| {
        b.iter(|| {
            let point = normalize(black_box(258.0), black_box(133.0), &sender);
            denormalize(point, black_box(&receiver))
        })
    });
}

criterion_group!(benches, bench_normalize, bench_denormalize, bench_cross_peer);
criterion_main!(benches);
