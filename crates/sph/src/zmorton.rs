//! Z-order (Morton) encoding of 3D grid coordinates.
//!
//! Bits of the three coordinates are interleaved so that x lands in bit 0, y in
//! bit 1 and z in bit 2 of every 3-bit group. Neighboring cells therefore get
//! numerically close ids, which keeps bucket heads for a neighborhood close
//! together in memory.

/// Spread the low 10 bits of `v` so they occupy every third bit.
#[inline]
fn part1by2(v: u32) -> u32 {
    let mut x = v & 0x0000_03ff;
    x = (x | (x << 16)) & 0xff00_00ff;
    x = (x | (x << 8)) & 0x0300_f00f;
    x = (x | (x << 4)) & 0x030c_30c3;
    x = (x | (x << 2)) & 0x0924_9249;
    x
}

/// Inverse of [`part1by2`].
#[inline]
fn compact1by2(v: u32) -> u32 {
    let mut x = v & 0x0924_9249;
    x = (x | (x >> 2)) & 0x030c_30c3;
    x = (x | (x >> 4)) & 0x0300_f00f;
    x = (x | (x >> 8)) & 0xff00_00ff;
    x = (x | (x >> 16)) & 0x0000_03ff;
    x
}

/// Encode a grid coordinate as a Morton index.
///
/// Each coordinate must already be reduced to `[0, grid_dim)` with
/// `grid_dim <= 1024`; higher bits are ignored.
#[inline]
pub fn encode(ix: u32, iy: u32, iz: u32) -> u32 {
    part1by2(ix) | (part1by2(iy) << 1) | (part1by2(iz) << 2)
}

/// Recover the grid coordinate from a Morton index.
#[inline]
pub fn decode(code: u32) -> (u32, u32, u32) {
    (compact1by2(code), compact1by2(code >> 1), compact1by2(code >> 2))
}
