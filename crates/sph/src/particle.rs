//! SPH particle representation.

use glam::Vec3;

/// A single SPH particle.
///
/// `density` and `acceleration` are outputs of the interaction engine and are
/// overwritten every step. The bucket link lives in [`crate::SpatialHash`],
/// indexed the same way as the particle array.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// World position
    pub position: Vec3,
    /// Current velocity
    pub velocity: Vec3,
    /// Acceleration from the last interaction pass (gravity + pair forces)
    pub acceleration: Vec3,
    /// Density from the last interaction pass
    pub density: f32,
}

impl Particle {
    /// Create a new particle at the given position with initial velocity.
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            acceleration: Vec3::ZERO,
            density: 0.0,
        }
    }

    /// Create a stationary particle at the given position.
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Vec3::ZERO)
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ZERO)
    }
}
