//! Benchmark: position solver, arrow solver and the full two-pass session.
//!
//! Run with: `cargo bench -p mapui-placement --bench placement_bench`
//!
//! A pin click runs the solver once and the arrow pass once or twice, so all
//! three must stay well under a frame budget even on slow hardware.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mapui_placement::{
    PlacementConfig, PlacementSession, Rect, Size, Viewport, compute_arrow_offset,
    compute_placement,
};

fn anchors() -> Vec<(&'static str, Rect)> {
    vec![
        ("center", Rect::new(500.0, 400.0, 20.0, 20.0)),
        ("top_right", Rect::new(1850.0, 60.0, 20.0, 20.0)),
        ("bottom_center", Rect::new(960.0, 1040.0, 20.0, 20.0)),
        ("origin_point", Rect::new(0.0, 0.0, 0.0, 0.0)),
    ]
}

// ===========================================================================
// Position solver
// ===========================================================================

fn bench_compute_placement(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_placement");
    let config = PlacementConfig::default();
    let viewport = Viewport::new(1920.0, 1080.0);
    let size = Size::new(500.0, 400.0);

    for (name, anchor) in anchors() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &anchor, |b, anchor| {
            b.iter(|| compute_placement(black_box(*anchor), black_box(size), viewport, &config));
        });
    }

    let crowded = Viewport::new(480.0, 360.0);
    group.bench_function("nothing_fits", |b| {
        b.iter(|| {
            compute_placement(
                black_box(Rect::new(200.0, 150.0, 20.0, 20.0)),
                black_box(size),
                crowded,
                &config,
            )
        });
    });

    group.finish();
}

// ===========================================================================
// Arrow solver
// ===========================================================================

fn bench_compute_arrow_offset(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_arrow_offset");
    let config = PlacementConfig::default();
    let anchor = Rect::new(540.0, 470.0, 20.0, 20.0);
    let rendered = Rect::new(300.0, 500.0, 500.0, 400.0);

    group.bench_function("measured", |b| {
        b.iter(|| {
            compute_arrow_offset(black_box(anchor), black_box(Some(rendered)), None, &config)
        });
    });
    group.bench_function("unmeasured", |b| {
        b.iter(|| compute_arrow_offset(black_box(anchor), black_box(None), None, &config));
    });

    group.finish();
}

// ===========================================================================
// Two-pass session
// ===========================================================================

fn bench_session(c: &mut Criterion) {
    let config = PlacementConfig::default();
    let viewport = Viewport::new(1920.0, 1080.0);
    let anchor = Rect::new(500.0, 400.0, 20.0, 20.0);
    // Narrower than the estimate, so the measure pass re-solves.
    let rendered = Rect::new(270.0, 448.0, 480.0, 400.0);

    c.bench_function("session/open_measure_settle", |b| {
        b.iter(|| {
            let mut session = PlacementSession::open(black_box(anchor), None, viewport, &config);
            session.measure(Some(rendered));
            session.settle(Some(rendered))
        });
    });
}

criterion_group!(
    benches,
    bench_compute_placement,
    bench_compute_arrow_offset,
    bench_session
);
criterion_main!(benches);
