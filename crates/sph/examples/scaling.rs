//! Scaling study - times the interaction engine across particle counts and thread counts
//!
//! Fills the unit box with a lattice at spacing h for a sweep of smoothing radii
//! (N ~ 1/h^3), then times repeated `compute_acceleration` calls on rayon pools
//! of increasing size.
//!
//! Run with: cargo run --example scaling --release -p sph

use std::time::Instant;

use glam::Vec3;
use sph::{Particle, SimParams, SimState, SolverConfig};

const SMOOTHING_RADII: [f32; 7] = [0.17, 0.15, 0.13, 0.11, 0.09, 0.07, 0.05];
const THREAD_COUNTS: [usize; 5] = [1, 2, 4, 8, 16];
const STEPS: usize = 20;
const REST_DENSITY: f32 = 1000.0;

fn unit_box_lattice(h: f32) -> Vec<Particle> {
    let count = (1.0 / h).floor() as usize;
    let mut particles = Vec::with_capacity(count * count * count);
    for k in 0..count {
        for j in 0..count {
            for i in 0..count {
                particles.push(Particle::at(Vec3::new(
                    (i as f32 + 0.5) * h,
                    (j as f32 + 0.5) * h,
                    (k as f32 + 0.5) * h,
                )));
            }
        }
    }
    particles
}

/// Smallest power of two covering the box in cells of size h.
fn grid_dim_for(h: f32) -> u32 {
    ((1.0 / h).ceil() as u32).next_power_of_two().max(4)
}

fn time_steps(h: f32, threads: usize) -> Result<(usize, f64), Box<dyn std::error::Error>> {
    let params = SimParams {
        rho0: REST_DENSITY,
        ..SimParams::with_smoothing_radius(h)
    };
    params.validate()?;

    let particles = unit_box_lattice(h);
    let n = particles.len();
    let mass = REST_DENSITY / n as f32;
    let config = SolverConfig::default().with_grid_dim(grid_dim_for(h));
    let mut state = SimState::new(particles, mass, config)?;

    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    let start = Instant::now();
    pool.install(|| {
        for _ in 0..STEPS {
            state.compute_acceleration(&params);
        }
    });
    Ok((n, start.elapsed().as_secs_f64()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== SPH SCALING ===");
    println!("{} acceleration passes per run", STEPS);
    println!();

    for &h in &SMOOTHING_RADII {
        let mut baseline = None;
        for &threads in &THREAD_COUNTS {
            let (n, secs) = time_steps(h, threads)?;
            let base = *baseline.get_or_insert(secs);
            println!(
                "h={:.2} N={:>6} threads={:>2}: Ran in {:.4} seconds ({:.2}x)",
                h,
                n,
                threads,
                secs,
                base / secs
            );
        }
        log::info!("finished sweep for h={}", h);
    }

    println!();
    println!("=== END SPH SCALING ===");
    Ok(())
}
