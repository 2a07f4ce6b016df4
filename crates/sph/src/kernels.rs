//! 3D SPH kernel coefficients.
//!
//! Density uses the poly6 kernel
//!
//! ```text
//! rho_i = sum_j m W(r_ij, h),   W(r, h) = 315 / (64 pi h^9) * (h^2 - r^2)^3
//! ```
//!
//! and the pair interaction combines a spiky pressure gradient with a
//! viscosity Laplacian, both scaled by `45 m / (pi h^5)`.

use glam::Vec3;
use std::f32::consts::PI;

use crate::params::SimParams;

const POLY6_NORMALIZATION: f32 = 315.0 / 64.0 / PI;

/// Precomputed kernel coefficients for one parameter set and particle mass.
#[derive(Clone, Copy, Debug)]
pub struct SphKernels {
    /// h * h
    pub h2: f32,
    /// m * W(0, h)
    pub self_density: f32,
    /// 315 m / (64 pi h^9)
    pub density_coeff: f32,
    /// 45 m / (pi h^5)
    pub c0: f32,
    /// k / 2
    pub cp: f32,
    /// -mu
    pub cv: f32,
    pub rho0: f32,
}

impl SphKernels {
    pub fn new(params: &SimParams, mass: f32) -> Self {
        let h = params.h;
        let h2 = h * h;
        let h3 = h2 * h;
        let h9 = h3 * h3 * h3;
        Self {
            h2,
            self_density: POLY6_NORMALIZATION * mass / h3,
            density_coeff: POLY6_NORMALIZATION * mass / h9,
            c0: 45.0 * mass / PI / (h2 * h2 * h),
            cp: params.k / 2.0,
            cv: -params.mu,
            rho0: params.rho0,
        }
    }

    /// Density one particle receives from another at squared distance `r2`.
    ///
    /// Depends only on the separation, so both members of a pair receive the
    /// same value.
    #[inline]
    pub fn density_contribution(&self, r2: f32) -> f32 {
        let z = self.h2 - r2;
        if z > 0.0 {
            self.density_coeff * z * z * z
        } else {
            0.0
        }
    }

    /// Acceleration added to particle `i` by its pair with `j`; `j` receives the
    /// negation.
    ///
    /// `dx = x_i - x_j`, `dv = v_i - v_j`. Returns zero outside the support.
    /// At zero separation the pressure term is skipped (its `u / q` factor is
    /// singular) and only viscosity acts.
    #[inline]
    pub fn pair_acceleration(&self, dx: Vec3, dv: Vec3, rho_i: f32, rho_j: f32) -> Vec3 {
        let r2 = dx.length_squared();
        if r2 >= self.h2 {
            return Vec3::ZERO;
        }
        let q = (r2 / self.h2).sqrt();
        let u = 1.0 - q;
        let w0 = self.c0 * u / rho_i / rho_j;
        let wp = if r2 > 0.0 {
            w0 * self.cp * (rho_i + rho_j - 2.0 * self.rho0) * u / q
        } else {
            0.0
        };
        let wv = w0 * self.cv;
        wp * dx + wv * dv
    }
}
