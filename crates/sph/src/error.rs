//! Error types for the configuration boundary.
//!
//! The numeric core never fails; everything it relies on is checked once when a
//! [`crate::SimState`] is built or a parameter file is loaded.

use thiserror::Error;

/// Errors raised while loading or validating simulation configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Smoothing radius must be positive and finite.
    #[error("smoothing radius must be positive and finite, got {0}")]
    SmoothingRadius(f32),

    /// Rest density must be positive and finite.
    #[error("rest density must be positive and finite, got {0}")]
    RestDensity(f32),

    /// Stiffness must be non-negative and finite.
    #[error("pressure stiffness must be non-negative and finite, got {0}")]
    Stiffness(f32),

    /// Viscosity must be non-negative and finite.
    #[error("viscosity must be non-negative and finite, got {0}")]
    Viscosity(f32),

    /// Gravity must be finite.
    #[error("gravity must be finite, got {0}")]
    Gravity(f32),

    /// Particle mass must be positive and finite.
    #[error("particle mass must be positive and finite, got {0}")]
    Mass(f32),

    /// Grid dimension must be a power of two inside the encodable range.
    #[error("grid dimension must be a power of two in {min}..={max}, got {got}")]
    GridDim { got: u32, min: u32, max: u32 },

    /// Bucket lists index particles with `u32`.
    #[error("too many particles for u32 bucket links: {0}")]
    TooManyParticles(usize),

    /// IO error while reading or writing a parameter file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed parameter file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
