//! Simulation parameters and solver configuration.
//!
//! Both structs are immutable for the duration of a run. They are validated
//! once, up front; the spatial hash and interaction engine assume valid input.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{
    DEFAULT_GRID_DIM, DEFAULT_REST_DENSITY, DEFAULT_SMOOTHING_RADIUS, DEFAULT_STIFFNESS,
    DEFAULT_VISCOSITY, GRAVITY, LARGE_GRID_DIM, MAX_GRID_DIM, MIN_GRID_DIM,
};
use crate::error::ConfigError;

/// Physical parameters of the SPH model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Smoothing radius, also the hash grid cell edge.
    pub h: f32,
    /// Rest density.
    pub rho0: f32,
    /// Pressure stiffness (bulk modulus).
    pub k: f32,
    /// Viscosity coefficient.
    pub mu: f32,
    /// Gravitational acceleration magnitude, applied along -Y.
    pub g: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            h: DEFAULT_SMOOTHING_RADIUS,
            rho0: DEFAULT_REST_DENSITY,
            k: DEFAULT_STIFFNESS,
            mu: DEFAULT_VISCOSITY,
            g: GRAVITY,
        }
    }
}

impl SimParams {
    /// Default parameters with the given smoothing radius.
    pub fn with_smoothing_radius(h: f32) -> Self {
        Self {
            h,
            ..Default::default()
        }
    }

    /// Check every field against its contract.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.h.is_finite() && self.h > 0.0) {
            return Err(ConfigError::SmoothingRadius(self.h));
        }
        if !(self.rho0.is_finite() && self.rho0 > 0.0) {
            return Err(ConfigError::RestDensity(self.rho0));
        }
        if !(self.k.is_finite() && self.k >= 0.0) {
            return Err(ConfigError::Stiffness(self.k));
        }
        if !(self.mu.is_finite() && self.mu >= 0.0) {
            return Err(ConfigError::Viscosity(self.mu));
        }
        if !self.g.is_finite() {
            return Err(ConfigError::Gravity(self.g));
        }
        Ok(())
    }

    /// Save parameters to a JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate parameters from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&json)?;
        params.validate()?;
        log::info!("Loaded SPH parameters from {}: {:?}", path.display(), params);
        Ok(params)
    }
}

/// How neighbor candidates are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborSearch {
    /// Visit the 27 hash buckets around each particle.
    #[default]
    Bucketed,
    /// Compare every pair `i < j`. Quadratic; kept as a reference.
    BruteForce,
}

/// Whether per-particle loops run on the rayon pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Execution {
    /// Data-parallel over particles on the current rayon thread pool.
    #[default]
    Parallel,
    /// Single-threaded, in index order.
    Serial,
}

/// Solver settings that are not physics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Cells per grid axis. Power of two.
    pub grid_dim: u32,
    pub neighbor_search: NeighborSearch,
    pub execution: Execution,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            grid_dim: DEFAULT_GRID_DIM,
            neighbor_search: NeighborSearch::default(),
            execution: Execution::default(),
        }
    }
}

impl SolverConfig {
    /// Buckets in the hash table, `grid_dim^3`.
    pub fn bucket_count(&self) -> usize {
        (self.grid_dim as usize).pow(3)
    }

    pub fn with_grid_dim(mut self, grid_dim: u32) -> Self {
        self.grid_dim = grid_dim;
        self
    }

    pub fn with_neighbor_search(mut self, neighbor_search: NeighborSearch) -> Self {
        self.neighbor_search = neighbor_search;
        self
    }

    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.grid_dim.is_power_of_two()
            || self.grid_dim < MIN_GRID_DIM
            || self.grid_dim > MAX_GRID_DIM
        {
            return Err(ConfigError::GridDim {
                got: self.grid_dim,
                min: MIN_GRID_DIM,
                max: MAX_GRID_DIM,
            });
        }
        if self.grid_dim > LARGE_GRID_DIM {
            log::warn!(
                "grid_dim {} allocates {} buckets and as many locks per parallel rebuild",
                self.grid_dim,
                self.bucket_count()
            );
        }
        if self.grid_dim < 3 && self.neighbor_search == NeighborSearch::Bucketed {
            log::warn!(
                "grid_dim {} folds neighbor offsets onto the same cell; pairs may be counted twice",
                self.grid_dim
            );
        }
        Ok(())
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        log::info!("Loaded solver config from {}: {:?}", path.display(), config);
        Ok(config)
    }
}
