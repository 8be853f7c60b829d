//! # Tileable Perlin Noise
//!
//! Improved gradient noise whose lattice wraps every `period` cells, so a
//! volume sampled over the unit cube at an integer frequency tiles without
//! seams.
//!
//! ## Determinism Guarantee
//!
//! The permutation table is shuffled once from a [`NoiseSeed`]; sampling is
//! a pure function of the table and the input point.

use glam::Vec3;
use rand::Rng;

use crate::seed::NoiseSeed;

/// Largest period the 256-entry permutation can wrap exactly.
pub const MAX_PERIOD: u32 = stratus_core::MAX_NOISE_FREQUENCY;

/// Seeded, tileable 3D Perlin noise.
#[derive(Clone, Debug)]
pub struct TileablePerlin {
    /// 256-entry permutation, doubled so lookups never wrap.
    perm: [u8; 512],
}

impl TileablePerlin {
    /// Builds the permutation table from a seed (Fisher-Yates).
    #[must_use]
    pub fn new(seed: NoiseSeed) -> Self {
        let mut rng = seed.rng();
        let mut table = [0u8; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = i as u8;
        }
        for i in (1..256).rev() {
            let j = rng.gen_range(0..=i);
            table.swap(i, j);
        }

        let mut perm = [0u8; 512];
        perm[..256].copy_from_slice(&table);
        perm[256..].copy_from_slice(&table);
        Self { perm }
    }

    #[inline]
    fn hash(&self, x: usize, y: usize, z: usize) -> u8 {
        let a = self.perm[x] as usize + y;
        let b = self.perm[a] as usize + z;
        self.perm[b]
    }

    /// Samples signed noise (approximately `[-1, 1]`) at lattice-space `p`.
    ///
    /// Lattice coordinates wrap modulo `period` (clamped to
    /// `1..=MAX_PERIOD`).
    #[must_use]
    pub fn sample(&self, p: Vec3, period: u32) -> f32 {
        let period = i64::from(period.clamp(1, MAX_PERIOD));
        let cell = p.floor();
        let f = p - cell;

        let wrap = |c: f32| (c as i64).rem_euclid(period) as usize;
        let next = |c: usize| ((c as i64 + 1) % period) as usize;
        let (x0, y0, z0) = (wrap(cell.x), wrap(cell.y), wrap(cell.z));
        let (x1, y1, z1) = (next(x0), next(y0), next(z0));

        let u = fade(f.x);
        let v = fade(f.y);
        let w = fade(f.z);

        let g000 = grad(self.hash(x0, y0, z0), f.x, f.y, f.z);
        let g100 = grad(self.hash(x1, y0, z0), f.x - 1.0, f.y, f.z);
        let g010 = grad(self.hash(x0, y1, z0), f.x, f.y - 1.0, f.z);
        let g110 = grad(self.hash(x1, y1, z0), f.x - 1.0, f.y - 1.0, f.z);
        let g001 = grad(self.hash(x0, y0, z1), f.x, f.y, f.z - 1.0);
        let g101 = grad(self.hash(x1, y0, z1), f.x - 1.0, f.y, f.z - 1.0);
        let g011 = grad(self.hash(x0, y1, z1), f.x, f.y - 1.0, f.z - 1.0);
        let g111 = grad(self.hash(x1, y1, z1), f.x - 1.0, f.y - 1.0, f.z - 1.0);

        let x00 = lerp(g000, g100, u);
        let x10 = lerp(g010, g110, u);
        let x01 = lerp(g001, g101, u);
        let x11 = lerp(g011, g111, u);
        lerp(lerp(x00, x10, v), lerp(x01, x11, v), w)
    }

    /// Fractal Brownian motion over unit-cube coordinates, remapped to `[0, 1]`.
    ///
    /// Octave `i` runs at `base_frequency * 2^i` with amplitude `0.5^i`; the
    /// sum is normalized by the total amplitude before remapping. Tiles across
    /// the unit cube for any integer `base_frequency`.
    #[must_use]
    pub fn fbm(&self, p: Vec3, base_frequency: u32, octaves: u32) -> f32 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut total = 0.0;
        let mut frequency = base_frequency.max(1);

        for _ in 0..octaves.max(1) {
            value += amplitude * self.sample(p * frequency as f32, frequency);
            total += amplitude;
            amplitude *= 0.5;
            frequency = frequency.saturating_mul(2);
        }

        ((value / total + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

/// Quintic fade curve `6t^5 - 15t^4 + 10t^3`.
#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Dot product with one of the 12 cube-edge gradients.
#[inline]
fn grad(hash: u8, x: f32, y: f32, z: f32) -> f32 {
    match hash & 15 {
        0 | 12 => x + y,
        1 | 14 => -x + y,
        2 => x - y,
        3 => -x - y,
        4 => x + z,
        5 => -x + z,
        6 => x - z,
        7 => -x - z,
        8 => y + z,
        9 | 13 => -y + z,
        10 => y - z,
        _ => -y - z,
    }
}
