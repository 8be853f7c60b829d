//! # Noise Volumes
//!
//! Cube-shaped 3D textures with four `f32` channels per texel and a full mip
//! chain down to 1³.
//!
//! ## Memory Layout
//!
//! ```text
//! level 0:  R³ texels, index = x + R * (y + R * z)
//! level 1:  (R/2)³ texels, each the mean of a 2×2×2 block of level 0
//! ...
//! level L:  1 texel (mean of the whole volume)
//! ```
//!
//! Volumes are filled once, mips are built, and from then on they are only
//! read. There is no mutable access after construction.

use glam::{Vec3, Vec4};
use rayon::prelude::*;
use stratus_core::{CloudError, CloudResult};

/// One RGBA32F texel.
pub type Texel = [f32; 4];

/// A tileable 4-channel 3D texture with mips.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseVolume {
    /// Edge length of level 0.
    resolution: usize,
    /// Level 0 first, each level half the edge length of the one before.
    levels: Vec<Vec<Texel>>,
}

impl NoiseVolume {
    /// Allocates a zeroed volume with storage for every mip level.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResolution` unless `resolution` is a power of two
    /// `>= 2`, and `VolumeAllocation` when the storage cannot be reserved.
    pub fn allocate(resolution: usize) -> CloudResult<Self> {
        if resolution < 2 || !resolution.is_power_of_two() {
            return Err(CloudError::InvalidResolution {
                name: "volume",
                resolution,
            });
        }

        let overflow = CloudError::VolumeAllocation {
            resolution,
            texels: usize::MAX,
        };
        let mut texels = 0usize;
        let mut edge = resolution;
        loop {
            let count = edge
                .checked_mul(edge)
                .and_then(|n| n.checked_mul(edge))
                .ok_or_else(|| overflow.clone())?;
            texels = texels.checked_add(count).ok_or_else(|| overflow.clone())?;
            if edge == 1 {
                break;
            }
            edge /= 2;
        }

        let mut levels = Vec::new();
        let mut edge = resolution;
        loop {
            let count = edge * edge * edge;
            let mut level: Vec<Texel> = Vec::new();
            level
                .try_reserve_exact(count)
                .map_err(|_| CloudError::VolumeAllocation { resolution, texels })?;
            level.resize(count, [0.0; 4]);
            levels.push(level);
            if edge == 1 {
                break;
            }
            edge /= 2;
        }

        Ok(Self { resolution, levels })
    }

    /// Builds a volume from a per-voxel function, then its mip chain.
    ///
    /// `f(x, y, z)` is called exactly once per level-0 voxel, in parallel over
    /// Z-slices. It must be a pure function of its inputs for the result to
    /// be deterministic.
    ///
    /// # Errors
    ///
    /// Same as [`allocate`](Self::allocate).
    pub fn from_fn<F>(resolution: usize, f: F) -> CloudResult<Self>
    where
        F: Fn(usize, usize, usize) -> Texel + Sync,
    {
        let mut volume = Self::allocate(resolution)?;
        let slice = resolution * resolution;
        volume.levels[0]
            .par_chunks_mut(slice)
            .enumerate()
            .for_each(|(z, texels)| {
                for (i, texel) in texels.iter_mut().enumerate() {
                    *texel = f(i % resolution, i / resolution, z);
                }
            });
        volume.build_mips();
        Ok(volume)
    }

    /// A volume where every texel (at every level) equals `texel`.
    ///
    /// # Errors
    ///
    /// Same as [`allocate`](Self::allocate).
    pub fn uniform(resolution: usize, texel: Texel) -> CloudResult<Self> {
        Self::from_fn(resolution, |_, _, _| texel)
    }

    /// Fills levels `1..` by 2×2×2 box filtering the level above.
    fn build_mips(&mut self) {
        for level in 1..self.levels.len() {
            let (upper, lower) = self.levels.split_at_mut(level);
            let src = &upper[level - 1];
            let dst = &mut lower[0];
            let src_edge = self.resolution >> (level - 1);
            let dst_edge = src_edge / 2;

            dst.par_chunks_mut(dst_edge * dst_edge)
                .enumerate()
                .for_each(|(z, texels)| {
                    for (i, texel) in texels.iter_mut().enumerate() {
                        let (x, y) = (i % dst_edge, i / dst_edge);
                        let mut sum = Vec4::ZERO;
                        for dz in 0..2 {
                            for dy in 0..2 {
                                for dx in 0..2 {
                                    let sx = 2 * x + dx;
                                    let sy = 2 * y + dy;
                                    let sz = 2 * z + dz;
                                    sum += Vec4::from_array(
                                        src[sx + src_edge * (sy + src_edge * sz)],
                                    );
                                }
                            }
                        }
                        *texel = (sum * 0.125).to_array();
                    }
                });
        }
    }

    /// Edge length of level 0.
    #[inline]
    #[must_use]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Number of mip levels, including level 0.
    #[inline]
    #[must_use]
    pub fn mip_count(&self) -> usize {
        self.levels.len()
    }

    /// Edge length of `level` (clamped to the last level).
    #[inline]
    #[must_use]
    pub fn level_resolution(&self, level: usize) -> usize {
        self.resolution >> level.min(self.levels.len() - 1)
    }

    /// Texels of `level` (clamped to the last level).
    #[must_use]
    pub fn level(&self, level: usize) -> &[Texel] {
        &self.levels[level.min(self.levels.len() - 1)]
    }

    /// Texels of `level` as raw bytes, four little-endian `f32` per texel.
    #[must_use]
    pub fn level_bytes(&self, level: usize) -> &[u8] {
        bytemuck::cast_slice(self.level(level))
    }

    /// Total bytes across all levels.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.levels
            .iter()
            .map(|level| std::mem::size_of_val(level.as_slice()))
            .sum()
    }

    /// Single texel with wraparound addressing.
    #[inline]
    #[must_use]
    pub fn texel(&self, level: usize, x: usize, y: usize, z: usize) -> Texel {
        let edge = self.level_resolution(level);
        let texels = self.level(level);
        texels[x % edge + edge * (y % edge + edge * (z % edge))]
    }

    fn sample_level(&self, level: usize, uvw: Vec3) -> Vec4 {
        let edge = self.level_resolution(level);
        let texels = self.level(level);
        let size = edge as f32;

        // Texel centres sit at (i + 0.5) / edge.
        let wrapped = uvw - uvw.floor();
        let coord = wrapped * size - Vec3::splat(0.5);
        let base = coord.floor();
        let t = coord - base;

        let wrap = |c: f32| (c as i64).rem_euclid(edge as i64) as usize;
        let (x0, y0, z0) = (wrap(base.x), wrap(base.y), wrap(base.z));
        let (x1, y1, z1) = ((x0 + 1) % edge, (y0 + 1) % edge, (z0 + 1) % edge);
        let at = |x: usize, y: usize, z: usize| Vec4::from_array(texels[x + edge * (y + edge * z)]);

        let c00 = at(x0, y0, z0).lerp(at(x1, y0, z0), t.x);
        let c10 = at(x0, y1, z0).lerp(at(x1, y1, z0), t.x);
        let c01 = at(x0, y0, z1).lerp(at(x1, y0, z1), t.x);
        let c11 = at(x0, y1, z1).lerp(at(x1, y1, z1), t.x);
        c00.lerp(c10, t.y).lerp(c01.lerp(c11, t.y), t.z)
    }

    /// Filtered sample at texture coordinates `uvw` (wrapping) and mip `lod`.
    ///
    /// Trilinear inside a level, linear between the two nearest levels.
    /// `lod` is clamped to the available chain.
    #[must_use]
    pub fn sample(&self, uvw: Vec3, lod: f32) -> Vec4 {
        let max_lod = (self.levels.len() - 1) as f32;
        let lod = if lod.is_nan() { 0.0 } else { lod.clamp(0.0, max_lod) };
        let lower = lod.floor();
        let blend = lod - lower;
        let near = self.sample_level(lower as usize, uvw);
        if blend > 0.0 {
            near.lerp(self.sample_level(lower as usize + 1, uvw), blend)
        } else {
            near
        }
    }

    /// Mip level whose texels match a footprint of `footprint_uv` texture
    /// units.
    #[must_use]
    pub fn lod_for_footprint(&self, footprint_uv: f32) -> f32 {
        let texels = footprint_uv * self.resolution as f32;
        if texels.is_nan() || texels <= 1.0 {
            0.0
        } else {
            texels.log2().min((self.levels.len() - 1) as f32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_volume() -> NoiseVolume {
        NoiseVolume::from_fn(8, |x, y, z| [x as f32, y as f32, z as f32, 1.0])
            .expect("small volume allocates")
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        assert_eq!(
            NoiseVolume::allocate(12),
            Err(CloudError::InvalidResolution {
                name: "volume",
                resolution: 12
            })
        );
        assert!(NoiseVolume::allocate(1).is_err());
    }

    #[test]
    fn test_mip_chain_to_one() {
        let v = gradient_volume();
        assert_eq!(v.mip_count(), 4);
        assert_eq!(v.level(0).len(), 512);
        assert_eq!(v.level(1).len(), 64);
        assert_eq!(v.level(3).len(), 1);
        assert_eq!(v.level_resolution(3), 1);
    }

    #[test]
    fn test_box_filter() {
        let v = gradient_volume();
        // Level 1 texel (0,0,0) averages x,y,z in {0,1}.
        assert_eq!(v.texel(1, 0, 0, 0), [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(v.texel(1, 3, 0, 0), [6.5, 0.5, 0.5, 1.0]);
        // Last level is the mean of everything.
        assert_eq!(v.texel(3, 0, 0, 0), [3.5, 3.5, 3.5, 1.0]);
    }

    #[test]
    fn test_texel_wraps() {
        let v = gradient_volume();
        assert_eq!(v.texel(0, 9, 1, 2), v.texel(0, 1, 1, 2));
    }

    #[test]
    fn test_sample_at_texel_centre() {
        let v = gradient_volume();
        let uvw = Vec3::new(2.5, 5.5, 7.5) / 8.0;
        let s = v.sample(uvw, 0.0);
        assert!((s - Vec4::new(2.0, 5.0, 7.0, 1.0)).length() < 1e-4);
    }

    #[test]
    fn test_sample_wraps_between_edges() {
        let v = gradient_volume();
        // Halfway between texel 7 and texel 0 (wrapped).
        let s = v.sample(Vec3::new(0.0, 0.5 / 8.0, 0.5 / 8.0), 0.0);
        assert!((s.x - 3.5).abs() < 1e-4);
        let a = v.sample(Vec3::new(1.25, 0.2, 0.4), 0.0);
        let b = v.sample(Vec3::new(0.25, 0.2, 0.4), 0.0);
        assert!((a - b).length() < 1e-4);
    }

    #[test]
    fn test_lod_blends_levels() {
        let v = NoiseVolume::from_fn(4, |x, _, _| if x < 2 { [0.0; 4] } else { [1.0; 4] })
            .expect("allocates");
        let uvw = Vec3::splat(0.5 / 4.0);
        let lod0 = v.sample(uvw, 0.0).x;
        let lod2 = v.sample(uvw, 2.0).x;
        let lod1_5 = v.sample(uvw, 1.5).x;
        assert_eq!(lod0, 0.0);
        assert!((lod2 - 0.5).abs() < 1e-6);
        let lod1 = v.sample(uvw, 1.0).x;
        assert!((lod1_5 - (lod1 + lod2) * 0.5).abs() < 1e-6);
        assert_eq!(v.sample(uvw, 99.0), v.sample(uvw, 2.0));
    }

    #[test]
    fn test_lod_for_footprint() {
        let v = gradient_volume();
        assert_eq!(v.lod_for_footprint(0.0), 0.0);
        assert_eq!(v.lod_for_footprint(f32::NAN), 0.0);
        assert!((v.lod_for_footprint(0.5) - 2.0).abs() < 1e-6);
        assert_eq!(v.lod_for_footprint(100.0), 3.0);
    }

    #[test]
    fn test_level_bytes() {
        let v = gradient_volume();
        assert_eq!(v.level_bytes(0).len(), 512 * 16);
        assert_eq!(v.size_bytes(), (512 + 64 + 8 + 1) * 16);
    }

    #[test]
    fn test_uniform() {
        let v = NoiseVolume::uniform(4, [0.25, 0.5, 0.75, 1.0]).expect("allocates");
        assert_eq!(v.texel(2, 0, 0, 0), [0.25, 0.5, 0.75, 1.0]);
        let s = v.sample(Vec3::new(0.123, 0.77, 0.5), 0.7);
        assert!((s - Vec4::new(0.25, 0.5, 0.75, 1.0)).length() < 1e-6);
    }
}
