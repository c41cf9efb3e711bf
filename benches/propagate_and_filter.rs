use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use hifitime::{Epoch, Unit};
use nalgebra::Vector3;

use sattrack::kalman::FilterBank;
use sattrack::propagator::{cartesian_to_geodetic, estimate_accuracy, EnhancedPropagator};
use sattrack::state::{EnvironmentalData, OrbitState, SatelliteParameters};

fn epoch() -> Epoch {
    Epoch::from_gregorian_utc_hms(2024, 1, 15, 11, 0, 0)
}

/// 400 km circular LEO, inside the drag band
fn leo_state() -> OrbitState {
    OrbitState::new(
        Vector3::new(6_778_137.0, 0.0, 0.0),
        Vector3::new(0.0, 7_668.0, 0.0),
        epoch(),
    )
}

fn bench_propagate(c: &mut Criterion) {
    let propagator = EnhancedPropagator::new();
    let state = leo_state();
    let params = SatelliteParameters::new(2.2, 25.0, 420_000.0);
    let env = EnvironmentalData::new(150.0, 3.0, 15.0);
    let target = epoch() + 30.0 * Unit::Minute;

    c.bench_function("propagate/leo_with_drag", |b| {
        b.iter(|| {
            black_box(propagator.propagate(
                black_box(&state),
                black_box(target),
                &params,
                Some(&env),
            ))
        })
    });

    c.bench_function("propagate/leo_without_weather", |b| {
        b.iter(|| black_box(propagator.propagate(black_box(&state), target, &params, None)))
    });
}

/// One cycle over many objects: propagate, filter, convert, score.
fn bench_cycle(c: &mut Criterion) {
    let propagator = EnhancedPropagator::new();
    let params = SatelliteParameters::default();
    let env = EnvironmentalData::new(150.0, 3.0, 15.0);
    let objects: Vec<String> = (0..1_000).map(|i| format!("{:05}", 10_000 + i)).collect();
    let target = epoch() + 30.0 * Unit::Minute;

    c.bench_function("cycle/1000_objects", |b| {
        b.iter_batched(
            || {
                // Filters already seeded, so every object runs predict + update
                let mut bank = FilterBank::default();
                for id in &objects {
                    bank.observe(id, 0.0, &leo_state(), 1000.0);
                }
                bank
            },
            |mut bank| {
                for id in &objects {
                    let propagated = propagator.propagate(&leo_state(), target, &params, Some(&env));
                    let filtered = bank.observe(id, 1800.0, &propagated, 1000.0);
                    black_box(cartesian_to_geodetic(&filtered.position));
                    black_box(estimate_accuracy(1800.0, "enhanced", true, false));
                }
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_propagate, bench_cycle);
criterion_main!(benches);
