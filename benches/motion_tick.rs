//! Motion Tick Benchmarks
//!
//! Measures the per-tick cost of the key state machine: event updates, click
//! resolution and motion computation with a varying number of held keys.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keymouse::input::{
    AccelerationCurve, ClickButton, Direction, KeyEventKind, KeyId, KeyTracker, Resolver,
};

/// Tracker with the first `held` direction keys pressed at time 0
fn tracker_with_held_keys(held: usize) -> KeyTracker {
    let mut tracker = KeyTracker::default();
    for direction in Direction::ALL.iter().take(held) {
        tracker.update(KeyId::Motion(*direction), KeyEventKind::Press, 0);
    }
    tracker
}

/// Benchmark the speed curve across the whole hold range
fn bench_speed_curve(c: &mut Criterion) {
    let curve = AccelerationCurve::default();

    c.bench_function("speed_curve_0_to_2000ms", |b| {
        b.iter(|| {
            let mut total = 0u32;
            for held in (0..2000).step_by(20) {
                total = total.wrapping_add(curve.speed(black_box(held)));
            }
            total
        })
    });
}

/// Benchmark one tick with 0..=4 held direction keys
fn bench_compute_motion(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_motion");
    let resolver = Resolver::default();

    for held in 0..=4 {
        group.bench_with_input(BenchmarkId::from_parameter(held), &held, |b, &held| {
            let mut tracker = tracker_with_held_keys(held);
            let mut now = 200;
            b.iter(|| {
                now += 20;
                resolver.compute_motion(&mut tracker, black_box(now))
            })
        });
    }

    group.finish();
}

/// Benchmark X auto-repeat bursts: release/press pairs inside the debounce window
fn bench_autorepeat_updates(c: &mut Criterion) {
    c.bench_function("autorepeat_pair", |b| {
        let mut tracker = tracker_with_held_keys(1);
        let key = KeyId::Motion(Direction::Up);
        let mut now = 0;
        b.iter(|| {
            now += 30;
            tracker.update(key, KeyEventKind::Release, black_box(now));
            tracker.update(key, KeyEventKind::Press, black_box(now + 2));
        })
    });
}

/// Benchmark click resolution with a pending press on every button
fn bench_resolve_clicks(c: &mut Criterion) {
    let resolver = Resolver::default();

    c.bench_function("resolve_clicks_all_pending", |b| {
        let mut tracker = KeyTracker::default();
        let mut kind = KeyEventKind::Press;
        b.iter(|| {
            for button in ClickButton::ALL {
                tracker.update(KeyId::Click(button), kind, 0);
            }
            kind = match kind {
                KeyEventKind::Press => KeyEventKind::Release,
                KeyEventKind::Release => KeyEventKind::Press,
            };
            resolver.resolve_clicks(&mut tracker)
        })
    });
}

criterion_group!(
    benches,
    bench_speed_curve,
    bench_compute_motion,
    bench_autorepeat_updates,
    bench_resolve_clicks
);
criterion_main!(benches);
