//! Benchmarks for the hash rebuild and interaction passes.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;
use sph::{Execution, NeighborSearch, Particle, SimParams, SimState, SolverConfig};

const H: f32 = 0.05;

/// Lattice filling `[0, 0.5)^3` at half the smoothing radius.
fn block() -> Vec<Particle> {
    let spacing = H * 0.5;
    let count = (0.5 / spacing) as usize;
    let mut particles = Vec::with_capacity(count * count * count);
    for k in 0..count {
        for j in 0..count {
            for i in 0..count {
                particles.push(Particle::at(Vec3::new(
                    (i as f32 + 0.5) * spacing,
                    (j as f32 + 0.5) * spacing,
                    (k as f32 + 0.5) * spacing,
                )));
            }
        }
    }
    particles
}

fn state(config: SolverConfig) -> SimState {
    let particles = block();
    // Rest density times the 0.125 volume of the half box
    let mass = 1000.0 * 0.125 / particles.len() as f32;
    SimState::new(particles, mass, config).unwrap()
}

fn bench_rebuild(c: &mut Criterion) {
    let mut parallel = state(SolverConfig::default());
    c.bench_function("rebuild_parallel", |b| {
        b.iter(|| parallel.rebuild_spatial_index(black_box(H)))
    });

    let mut serial = state(SolverConfig::default().with_execution(Execution::Serial));
    c.bench_function("rebuild_serial", |b| {
        b.iter(|| serial.rebuild_spatial_index(black_box(H)))
    });
}

fn bench_acceleration(c: &mut Criterion) {
    let params = SimParams::with_smoothing_radius(H);

    let mut bucketed = state(SolverConfig::default().with_grid_dim(32));
    c.bench_function("accel_bucketed_parallel", |b| {
        b.iter(|| bucketed.compute_acceleration(black_box(&params)))
    });

    let mut serial = state(
        SolverConfig::default()
            .with_grid_dim(32)
            .with_execution(Execution::Serial),
    );
    c.bench_function("accel_bucketed_serial", |b| {
        b.iter(|| serial.compute_acceleration(black_box(&params)))
    });

    let mut brute = state(SolverConfig::default().with_neighbor_search(NeighborSearch::BruteForce));
    let mut group = c.benchmark_group("brute_force");
    group.sample_size(10);
    group.bench_function("accel_brute_force_parallel", |b| {
        b.iter(|| brute.compute_acceleration(black_box(&params)))
    });
    group.finish();
}

criterion_group!(benches, bench_rebuild, bench_acceleration);
criterion_main!(benches);
