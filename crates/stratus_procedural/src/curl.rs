//! # Curl Noise
//!
//! Turbulence that swirls without compressing: the curl of a vector
//! potential is divergence-free. The potential is three independently
//! seeded tileable Perlin fields; derivatives are central differences in
//! lattice space.

use glam::{Vec3, Vec4, Vec4Swizzles};

use crate::perlin::TileablePerlin;
use crate::seed::NoiseSeed;

/// Finite-difference step, in lattice cells.
const EPSILON: f32 = 0.01;

/// Divergence-free vector field over the unit cube.
#[derive(Clone, Debug)]
pub struct CurlField {
    potentials: [TileablePerlin; 3],
    frequency: u32,
}

impl CurlField {
    /// Builds the three potential fields from `seed`.
    #[must_use]
    pub fn new(seed: NoiseSeed, frequency: u32) -> Self {
        Self {
            potentials: [
                TileablePerlin::new(seed.derive(0)),
                TileablePerlin::new(seed.derive(1)),
                TileablePerlin::new(seed.derive(2)),
            ],
            frequency: frequency.max(1),
        }
    }

    #[inline]
    fn potential(&self, axis: usize, q: Vec3) -> f32 {
        self.potentials[axis].sample(q, self.frequency)
    }

    #[inline]
    fn partial(&self, axis: usize, q: Vec3, along: Vec3) -> f32 {
        let offset = along * EPSILON;
        (self.potential(axis, q + offset) - self.potential(axis, q - offset)) / (2.0 * EPSILON)
    }

    /// Curl vector at unit-cube `p`, length clamped to 1.
    #[must_use]
    pub fn sample(&self, p: Vec3) -> Vec3 {
        let q = p * self.frequency as f32;
        let curl = Vec3::new(
            self.partial(2, q, Vec3::Y) - self.partial(1, q, Vec3::Z),
            self.partial(0, q, Vec3::Z) - self.partial(2, q, Vec3::X),
            self.partial(1, q, Vec3::X) - self.partial(0, q, Vec3::Y),
        );
        curl.clamp_length_max(1.0)
    }

    /// Packs a curl vector into a texel: `xyz * 0.5 + 0.5`, `w = 1`.
    #[inline]
    #[must_use]
    pub fn encode(curl: Vec3) -> [f32; 4] {
        let e = curl * 0.5 + Vec3::splat(0.5);
        [e.x, e.y, e.z, 1.0]
    }
}

/// Unpacks a curl texel back to a vector in `[-1, 1]^3`.
#[inline]
#[must_use]
pub fn decode_curl(texel: Vec4) -> Vec3 {
    (texel.xyz() * 2.0 - Vec3::ONE).clamp(Vec3::NEG_ONE, Vec3::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> CurlField {
        CurlField::new(NoiseSeed::new(11), 4)
    }

    #[test]
    fn test_length_bounded() {
        let f = field();
        for i in 0..500 {
            let t = i as f32 / 500.0;
            assert!(f.sample(Vec3::new(t, t * t, 1.0 - t)).length() <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn test_not_constant() {
        let f = field();
        let a = f.sample(Vec3::new(0.1, 0.2, 0.3));
        let b = f.sample(Vec3::new(0.6, 0.4, 0.9));
        assert!((a - b).length() > 1e-3);
    }

    #[test]
    fn test_tiles() {
        let f = field();
        let a = f.sample(Vec3::new(0.0, 0.37, 0.61));
        let b = f.sample(Vec3::new(1.0, 0.37, 0.61));
        assert!((a - b).length() < 1e-3);
    }

    #[test]
    fn test_encode_decode() {
        let v = Vec3::new(-1.0, 0.25, 0.8);
        let texel = Vec4::from_array(CurlField::encode(v));
        assert_eq!(texel.w, 1.0);
        assert!((decode_curl(texel) - v).length() < 1e-6);
    }
}
