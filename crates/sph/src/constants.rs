//! Constants shared by the spatial hash and the interaction engine.
//!
//! ## Grid Conventions
//!
//! The hash grid is a fixed `grid_dim^3` torus of cells whose edge length is the
//! SPH smoothing radius `h`. `grid_dim` must be a power of two so a bitmask can
//! stand in for the modulus; the default below is the one used unless the
//! driver's `SolverConfig` overrides it.

/// Default number of cells along each grid axis.
pub const DEFAULT_GRID_DIM: u32 = 16;

/// Smallest grid dimension the encoder accepts.
pub const MIN_GRID_DIM: u32 = 2;

/// Largest grid dimension the encoder accepts (10 bits per axis, 30 bits total).
///
/// Memory grows with `grid_dim^3`. At the maximum the head table alone is
/// 2^30 `u32` (4 GiB), and every parallel rebuild allocates one `Mutex<u32>`
/// per bucket on top of that. Grids above [`LARGE_GRID_DIM`] are accepted but
/// logged as a warning.
pub const MAX_GRID_DIM: u32 = 1 << 10;

/// Grid dimension above which per-rebuild lock allocation dominates the step.
pub const LARGE_GRID_DIM: u32 = 1 << 8;

/// Maximum number of neighbor buckets produced for one particle.
///
/// Must be at least 27 so the full 3x3x3 block is represented.
pub const MAX_NBR_BINS: usize = 27;

const _: () = assert!(MAX_NBR_BINS >= 27, "MAX_NBR_BINS must cover the 3x3x3 neighborhood");

/// Sentinel index marking the end of a bucket list (and an empty bucket).
pub const EMPTY: u32 = u32::MAX;

// =============================================================================
// DEFAULT PHYSICAL PARAMETERS
// =============================================================================

/// Default smoothing radius (grid cell edge length).
pub const DEFAULT_SMOOTHING_RADIUS: f32 = 5e-2;

/// Default rest density (kg/m³).
pub const DEFAULT_REST_DENSITY: f32 = 1000.0;

/// Default pressure stiffness (bulk modulus).
pub const DEFAULT_STIFFNESS: f32 = 1e3;

/// Default viscosity coefficient.
pub const DEFAULT_VISCOSITY: f32 = 0.1;

/// Gravity acceleration magnitude (m/s^2), applied along -Y.
pub const GRAVITY: f32 = 9.8;
