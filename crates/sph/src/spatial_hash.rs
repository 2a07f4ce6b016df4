//! Spatial hashing of particles into a toroidal grid of buckets.
//!
//! Cells are `h` wide, so "same or adjacent cell" covers every pair inside the
//! kernel support. Each axis coordinate is masked to `grid_dim - 1`, which
//! aliases cells that are `grid_dim` apart onto the same bucket. That aliasing
//! is intended: it keeps indexing O(1) for an unbounded domain at the cost of a
//! few extra distance checks, and it decides which particles are compared as
//! neighbors, so it must not be replaced by clamping.
//!
//! Buckets are intrusive singly-linked lists over particle indices: `heads`
//! holds the first particle of each bucket, `next[i]` the particle after `i`.

use glam::{IVec3, UVec3, Vec3};
use rayon::prelude::*;
use std::ops::Deref;
use std::sync::{Mutex, PoisonError};

use crate::constants::{EMPTY, MAX_NBR_BINS};
use crate::params::Execution;
use crate::particle::Particle;
use crate::zmorton;
use crate::SimState;

/// Geometry of the bucket grid: `dim^3` cells, `dim` a power of two.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashGrid {
    dim: u32,
    mask: u32,
}

impl HashGrid {
    pub fn new(dim: u32) -> Self {
        debug_assert!(dim.is_power_of_two() && dim >= 2, "grid dim {} must be a power of two", dim);
        Self { dim, mask: dim - 1 }
    }

    pub fn dim(&self) -> u32 {
        self.dim
    }

    /// Number of buckets, `dim^3`.
    pub fn bucket_count(&self) -> usize {
        (self.dim as usize).pow(3)
    }

    /// Unwrapped cell of a position: truncating `position / h` per axis.
    #[inline]
    pub fn cell_coord(&self, position: Vec3, h: f32) -> IVec3 {
        (position / h).as_ivec3()
    }

    /// Reduce a cell to the grid by masking each axis (two's complement for
    /// negative cells).
    #[inline]
    pub fn wrap(&self, cell: IVec3) -> UVec3 {
        UVec3::new(
            cell.x as u32 & self.mask,
            cell.y as u32 & self.mask,
            cell.z as u32 & self.mask,
        )
    }

    #[inline]
    pub fn cell_bucket(&self, cell: IVec3) -> u32 {
        let c = self.wrap(cell);
        zmorton::encode(c.x, c.y, c.z)
    }

    /// Bucket id of the cell containing `position`.
    #[inline]
    pub fn particle_bucket(&self, position: Vec3, h: f32) -> u32 {
        self.cell_bucket(self.cell_coord(position, h))
    }

    /// Bucket ids of the 3x3x3 block of cells around `position`, own cell
    /// included.
    ///
    /// Runs sequentially; callers are already inside a parallel loop over
    /// particles. Ids are not deduplicated, so a grid narrower than 3 cells
    /// yields repeats.
    pub fn particle_neighborhood(&self, position: Vec3, h: f32) -> NeighborBins {
        let cell = self.cell_coord(position, h);
        let mut bins = NeighborBins::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let neighbor = IVec3::new(
                        cell.x.wrapping_add(dx),
                        cell.y.wrapping_add(dy),
                        cell.z.wrapping_add(dz),
                    );
                    bins.push(self.cell_bucket(neighbor));
                }
            }
        }
        bins
    }
}

/// Fixed-capacity list of neighbor bucket ids, at most [`MAX_NBR_BINS`].
#[derive(Clone, Copy, Debug)]
pub struct NeighborBins {
    bins: [u32; MAX_NBR_BINS],
    len: usize,
}

impl NeighborBins {
    fn new() -> Self {
        Self {
            bins: [EMPTY; MAX_NBR_BINS],
            len: 0,
        }
    }

    /// Append unless full.
    #[inline]
    fn push(&mut self, bucket: u32) {
        if self.len < MAX_NBR_BINS {
            self.bins[self.len] = bucket;
            self.len += 1;
        }
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.bins[..self.len]
    }
}

impl Deref for NeighborBins {
    type Target = [u32];

    fn deref(&self) -> &[u32] {
        self.as_slice()
    }
}

/// Occupancy summary of a built hash table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HashStats {
    pub particles: usize,
    pub occupied_buckets: usize,
    pub max_bucket_len: usize,
    /// Bucket holding the longest list (0 when the table is empty).
    pub busiest_bucket: u32,
}

/// Bucket-head table plus per-particle links.
#[derive(Clone, Debug)]
pub struct SpatialHash {
    grid: HashGrid,
    heads: Vec<u32>,
    next: Vec<u32>,
}

impl SpatialHash {
    pub fn new(grid_dim: u32) -> Self {
        let grid = HashGrid::new(grid_dim);
        Self {
            grid,
            heads: vec![EMPTY; grid.bucket_count()],
            next: Vec::new(),
        }
    }

    pub fn grid(&self) -> HashGrid {
        self.grid
    }

    /// Number of particles linked by the last rebuild.
    pub fn indexed_len(&self) -> usize {
        self.next.len()
    }

    /// First particle of `bucket`, or [`EMPTY`].
    pub fn head(&self, bucket: u32) -> u32 {
        self.heads[bucket as usize]
    }

    /// Particle indices in `bucket`, most recently inserted first.
    pub fn bucket(&self, bucket: u32) -> BucketIter<'_> {
        BucketIter {
            next: &self.next,
            current: self.heads[bucket as usize],
        }
    }

    /// All particles in the given buckets, bucket by bucket.
    pub fn candidates<'a>(&'a self, bins: &'a [u32]) -> impl Iterator<Item = usize> + 'a {
        bins.iter().flat_map(move |&b| self.bucket(b))
    }

    /// Rebuild every bucket list from the current positions.
    ///
    /// Nothing from the previous build survives. In parallel mode each bucket
    /// head sits behind its own lock for the duration of this call; the lock
    /// is held only across the two-slot prepend.
    pub fn rebuild(&mut self, particles: &[Particle], h: f32, execution: Execution) {
        debug_assert!(h > 0.0, "smoothing radius must be positive");
        debug_assert!(particles.len() < EMPTY as usize);

        let grid = self.grid;
        self.next.clear();
        self.next.resize(particles.len(), EMPTY);

        match execution {
            Execution::Serial => {
                self.heads.fill(EMPTY);
                for (i, p) in particles.iter().enumerate() {
                    let bucket = grid.particle_bucket(p.position, h) as usize;
                    self.next[i] = self.heads[bucket];
                    self.heads[bucket] = i as u32;
                }
            }
            Execution::Parallel => {
                let locks: Vec<Mutex<u32>> = (0..self.heads.len())
                    .into_par_iter()
                    .map(|_| Mutex::new(EMPTY))
                    .collect();

                self.next
                    .par_iter_mut()
                    .zip(particles.par_iter())
                    .enumerate()
                    .for_each(|(i, (link, p))| {
                        let bucket = grid.particle_bucket(p.position, h) as usize;
                        let mut head = locks[bucket].lock().unwrap_or_else(PoisonError::into_inner);
                        *link = *head;
                        *head = i as u32;
                    });

                self.heads
                    .par_iter_mut()
                    .zip(locks.into_par_iter())
                    .for_each(|(head, lock)| {
                        *head = lock.into_inner().unwrap_or_else(PoisonError::into_inner);
                    });
            }
        }

        if log::log_enabled!(log::Level::Debug) {
            let stats = self.stats();
            let (cx, cy, cz) = zmorton::decode(stats.busiest_bucket);
            log::debug!(
                "hash rebuilt: {} particles in {} of {} buckets (longest list {} at cell ({}, {}, {}))",
                stats.particles,
                stats.occupied_buckets,
                self.heads.len(),
                stats.max_bucket_len,
                cx,
                cy,
                cz
            );
        }
    }

    pub fn stats(&self) -> HashStats {
        let mut stats = HashStats::default();
        for bucket in 0..self.heads.len() as u32 {
            let len = self.bucket(bucket).count();
            if len > 0 {
                stats.occupied_buckets += 1;
                stats.particles += len;
                if len > stats.max_bucket_len {
                    stats.max_bucket_len = len;
                    stats.busiest_bucket = bucket;
                }
            }
        }
        stats
    }
}

/// Walks one bucket's linked list.
pub struct BucketIter<'a> {
    next: &'a [u32],
    current: u32,
}

impl Iterator for BucketIter<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.current == EMPTY {
            return None;
        }
        let i = self.current as usize;
        self.current = self.next[i];
        Some(i)
    }
}

/// Rebuild `state`'s hash table for smoothing radius `h`.
pub fn hash_particles(state: &mut SimState, h: f32) {
    state.hash.rebuild(&state.particles, h, state.config.execution);
}
