//! Lock-free floating point accumulators.
//!
//! Density and acceleration are shared-mutable across workers during a pass: a
//! particle can be the primary `i` on one worker while another worker adds a
//! pair contribution to it as `j`. All writes go through a CAS loop on the
//! `f32` bit pattern so no update is ever lost.
//!
//! Orderings are `Relaxed` because the only cross-thread reads happen after the
//! enclosing rayon loop returns, which already synchronizes every worker.

use glam::Vec3;
use std::sync::atomic::{AtomicU32, Ordering};

/// An `f32` supporting atomic addition.
#[derive(Debug, Default)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Add `delta`, returning the previous value.
    #[inline]
    pub fn fetch_add(&self, delta: f32) -> f32 {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            let next = (f32::from_bits(current) + delta).to_bits();
            match self
                .0
                .compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(previous) => return f32::from_bits(previous),
                Err(actual) => current = actual,
            }
        }
    }
}

/// Three [`AtomicF32`] components updated independently.
#[derive(Debug, Default)]
pub struct AtomicVec3 {
    pub x: AtomicF32,
    pub y: AtomicF32,
    pub z: AtomicF32,
}

impl AtomicVec3 {
    pub fn new(v: Vec3) -> Self {
        Self {
            x: AtomicF32::new(v.x),
            y: AtomicF32::new(v.y),
            z: AtomicF32::new(v.z),
        }
    }

    #[inline]
    pub fn load(&self) -> Vec3 {
        Vec3::new(self.x.load(), self.y.load(), self.z.load())
    }

    #[inline]
    pub fn store(&self, v: Vec3) {
        self.x.store(v.x);
        self.y.store(v.y);
        self.z.store(v.z);
    }

    /// Componentwise atomic add. The vector as a whole is not updated atomically.
    #[inline]
    pub fn add(&self, v: Vec3) {
        self.x.fetch_add(v.x);
        self.y.fetch_add(v.y);
        self.z.fetch_add(v.z);
    }

    /// Componentwise atomic subtract.
    #[inline]
    pub fn sub(&self, v: Vec3) {
        self.add(-v);
    }
}
