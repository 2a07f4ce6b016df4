//! 3D Smoothed Particle Hydrodynamics neighbor search and interaction engine
//!
//! Particles are binned into a toroidal grid of `h`-sized cells keyed by Morton
//! code, then density and pressure/viscosity forces are accumulated over the
//! 27 cells around each particle. All passes run data-parallel on rayon.
//!
//! Time integration, boundaries and initial conditions belong to the driver;
//! this crate only fills in `density` and `acceleration` for the current
//! positions.
//!
//! # Example
//!
//! ```
//! use sph::{Particle, SimParams, SimState, SolverConfig};
//! use glam::Vec3;
//!
//! let params = SimParams::with_smoothing_radius(0.1);
//!
//! // A small block of particles at half the smoothing radius
//! let mut particles = Vec::new();
//! for i in 0..4 {
//!     for j in 0..4 {
//!         for k in 0..4 {
//!             particles.push(Particle::at(Vec3::new(
//!                 (i as f32 + 0.5) * 0.05,
//!                 (j as f32 + 0.5) * 0.05,
//!                 (k as f32 + 0.5) * 0.05,
//!             )));
//!         }
//!     }
//! }
//!
//! let mut state = SimState::new(particles, 1e-3, SolverConfig::default()).unwrap();
//! state.compute_acceleration(&params);
//! assert!(state.particles.iter().all(|p| p.density > 0.0));
//! ```

pub mod atomic;
pub mod constants;
pub mod error;
pub mod interact;
pub mod kernels;
pub mod params;
pub mod particle;
pub mod spatial_hash;
pub mod zmorton;

pub use error::ConfigError;
pub use glam::Vec3;
pub use kernels::SphKernels;
pub use params::{Execution, NeighborSearch, SimParams, SolverConfig};
pub use particle::Particle;
pub use spatial_hash::{HashGrid, HashStats, NeighborBins, SpatialHash};

use constants::EMPTY;
use interact::Accumulators;

/// Particle array, uniform mass and the current step's hash table.
pub struct SimState {
    /// All particles. Indices must stay stable for the duration of a step.
    pub particles: Vec<Particle>,
    mass: f32,
    hash: SpatialHash,
    config: SolverConfig,
    scratch: Accumulators,
}

impl SimState {
    /// Validate `mass` and `config` and take ownership of the particles.
    pub fn new(
        particles: Vec<Particle>,
        mass: f32,
        config: SolverConfig,
    ) -> Result<Self, ConfigError> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(ConfigError::Mass(mass));
        }
        config.validate()?;
        if particles.len() >= EMPTY as usize {
            return Err(ConfigError::TooManyParticles(particles.len()));
        }

        log::info!(
            "SPH state: {} particles, mass {}, {}^3 buckets, {:?} search, {:?} execution",
            particles.len(),
            mass,
            config.grid_dim,
            config.neighbor_search,
            config.execution
        );

        Ok(Self {
            particles,
            mass,
            hash: SpatialHash::new(config.grid_dim),
            config,
            scratch: Accumulators::default(),
        })
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Hash table from the most recent rebuild.
    pub fn spatial_hash(&self) -> &SpatialHash {
        &self.hash
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Re-bin every particle for the current positions.
    pub fn rebuild_spatial_index(&mut self, smoothing_radius: f32) {
        spatial_hash::hash_particles(self, smoothing_radius);
    }

    /// Recompute densities. Requires a rebuild for the current positions;
    /// a table built for a different particle count is rebuilt first.
    pub fn compute_density(&mut self, params: &SimParams) {
        interact::compute_density(self, params);
    }

    /// Rebuild, recompute densities, then accumulate accelerations.
    pub fn compute_acceleration(&mut self, params: &SimParams) {
        interact::compute_accel(self, params);
    }
}
