//! Pairwise density and force accumulation.
//!
//! Both passes visit each unordered pair once, from its lower index, and
//! update both particles: the kernels are symmetric (density) and
//! antisymmetric (forces), so one evaluation serves both sides. A particle can
//! be updated as `j` by one worker while another worker owns it as `i`, so
//! every accumulator write is an atomic add into scratch arrays owned by
//! [`SimState`]. Results are copied into the particles once the pass is done.

use glam::Vec3;
use rayon::prelude::*;

use crate::atomic::{AtomicF32, AtomicVec3};
use crate::kernels::SphKernels;
use crate::params::{Execution, NeighborSearch, SimParams};
use crate::particle::Particle;
use crate::spatial_hash::{hash_particles, SpatialHash};
use crate::SimState;

/// Per-step accumulators, reused across steps.
#[derive(Debug, Default)]
pub(crate) struct Accumulators {
    density: Vec<AtomicF32>,
    acceleration: Vec<AtomicVec3>,
}

fn for_each_particle<F>(execution: Execution, n: usize, f: F)
where
    F: Fn(usize) + Sync + Send,
{
    match execution {
        Execution::Parallel => (0..n).into_par_iter().for_each(f),
        Execution::Serial => (0..n).for_each(f),
    }
}

fn for_each_particle_mut<F>(execution: Execution, particles: &mut [Particle], f: F)
where
    F: Fn(usize, &mut Particle) + Sync + Send,
{
    match execution {
        Execution::Parallel => particles
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, p)| f(i, p)),
        Execution::Serial => particles.iter_mut().enumerate().for_each(|(i, p)| f(i, p)),
    }
}

/// Visit every pair `(i, j)` with `j > i` that the search strategy proposes.
///
/// Pairs are not distance-filtered here; `visit` does that.
fn for_each_pair<F>(
    execution: Execution,
    search: NeighborSearch,
    hash: &SpatialHash,
    particles: &[Particle],
    h: f32,
    visit: F,
) where
    F: Fn(usize, usize) + Sync + Send,
{
    let n = particles.len();
    match search {
        NeighborSearch::Bucketed => {
            let grid = hash.grid();
            for_each_particle(execution, n, |i| {
                let bins = grid.particle_neighborhood(particles[i].position, h);
                for j in hash.candidates(&bins) {
                    if j > i {
                        visit(i, j);
                    }
                }
            });
        }
        NeighborSearch::BruteForce => {
            for_each_particle(execution, n, |i| {
                for j in (i + 1)..n {
                    visit(i, j);
                }
            });
        }
    }
}

#[inline]
fn update_density(pi: &Particle, pj: &Particle, rho_i: &AtomicF32, rho_j: &AtomicF32, kernels: &SphKernels) {
    let r2 = pi.position.distance_squared(pj.position);
    if r2 < kernels.h2 {
        let rho_ij = kernels.density_contribution(r2);
        rho_i.fetch_add(rho_ij);
        rho_j.fetch_add(rho_ij);
    }
}

#[inline]
fn update_forces(pi: &Particle, pj: &Particle, a_i: &AtomicVec3, a_j: &AtomicVec3, kernels: &SphKernels) {
    let dx = pi.position - pj.position;
    if dx.length_squared() < kernels.h2 {
        let dv = pi.velocity - pj.velocity;
        let delta = kernels.pair_acceleration(dx, dv, pi.density, pj.density);
        a_i.add(delta);
        a_j.sub(delta);
    }
}

/// Recompute every particle's density from the current hash table.
///
/// The hash table must have been rebuilt for the current positions. If the
/// particle count changed since the last rebuild the table is rebuilt here
/// first, since its links would point past the array.
pub fn compute_density(state: &mut SimState, params: &SimParams) {
    if state.hash.indexed_len() != state.particles.len() {
        log::debug!(
            "hash indexes {} particles but state holds {}; rebuilding",
            state.hash.indexed_len(),
            state.particles.len()
        );
        hash_particles(state, params.h);
    }

    let kernels = SphKernels::new(params, state.mass);
    let execution = state.config.execution;
    let search = state.config.neighbor_search;
    let SimState {
        particles,
        hash,
        scratch,
        ..
    } = state;

    let n = particles.len();
    scratch.density.resize_with(n, AtomicF32::default);
    let density = &scratch.density;

    {
        let particles: &[Particle] = particles;

        for_each_particle(execution, n, |i| density[i].store(kernels.self_density));

        for_each_pair(execution, search, hash, particles, params.h, |i, j| {
            update_density(&particles[i], &particles[j], &density[i], &density[j], &kernels);
        });
    }

    for_each_particle_mut(execution, particles, |i, p| p.density = density[i].load());

    if log::log_enabled!(log::Level::Trace) && n > 0 {
        let (min, max) = particles
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.density), hi.max(p.density))
            });
        log::trace!("density range over {} particles: [{}, {}]", n, min, max);
    }
}

/// Rebuild the hash, refresh densities, then accumulate pressure and viscosity
/// accelerations on top of gravity.
pub fn compute_accel(state: &mut SimState, params: &SimParams) {
    hash_particles(state, params.h);
    compute_density(state, params);

    let kernels = SphKernels::new(params, state.mass);
    let gravity = Vec3::new(0.0, -params.g, 0.0);
    let execution = state.config.execution;
    let search = state.config.neighbor_search;
    let SimState {
        particles,
        hash,
        scratch,
        ..
    } = state;

    let n = particles.len();
    scratch.acceleration.resize_with(n, AtomicVec3::default);
    let acceleration = &scratch.acceleration;

    {
        let particles: &[Particle] = particles;

        for_each_particle(execution, n, |i| acceleration[i].store(gravity));

        for_each_pair(execution, search, hash, particles, params.h, |i, j| {
            update_forces(
                &particles[i],
                &particles[j],
                &acceleration[i],
                &acceleration[j],
                &kernels,
            );
        });
    }

    for_each_particle_mut(execution, particles, |i, p| {
        p.acceleration = acceleration[i].load();
    });
}
