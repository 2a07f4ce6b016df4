//! Shared particle setups for integration tests.

#![allow(dead_code)]

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sph::Particle;

/// `n` particles uniformly inside `[0, extent)^3` with velocities in `[-1, 1)^3`.
pub fn random_cloud(seed: u64, n: usize, extent: f32) -> Vec<Particle> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let position = Vec3::new(
                rng.gen_range(0.0..extent),
                rng.gen_range(0.0..extent),
                rng.gen_range(0.0..extent),
            );
            let velocity = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            Particle::new(position, velocity)
        })
        .collect()
}

/// `count^3` stationary particles on a cubic lattice, first one at `spacing / 2`.
pub fn lattice(count: usize, spacing: f32) -> Vec<Particle> {
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

/// Largest componentwise deviation between two vector fields.
pub fn max_vec_error(a: &[Vec3], b: &[Vec3]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (*x - *y).abs().max_element())
        .fold(0.0, f32::max)
}

/// Largest deviation between two scalar fields.
pub fn max_scalar_error(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f32::max)
}

pub fn max_norm(v: &[Vec3]) -> f32 {
    v.iter().map(|a| a.length()).fold(0.0, f32::max)
}
