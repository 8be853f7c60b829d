//! # Noise Field Generator
//!
//! Builds the three volumes the density sampler reads:
//!
//! | volume | R | G | B | A |
//! |--------|---|---|---|---|
//! | shape  | Perlin fBm | Worley f₀ | Worley f₁ | Worley f₂ |
//! | detail | Worley f₀ | Worley f₁ | Worley f₂ | 0 |
//! | curl   | curl.x | curl.y | curl.z | 1 |
//!
//! ## Determinism Guarantee
//!
//! Every table (permutation, feature points) is built in [`NoiseFieldGenerator::new`]
//! before any parallel work. Each voxel is then a pure function of its index
//! and those tables, so the output is bit-identical no matter how rayon
//! schedules the slices.

use std::time::Instant;

use glam::Vec3;
use stratus_core::{CloudResult, NoiseConfig};

use crate::curl::CurlField;
use crate::perlin::TileablePerlin;
use crate::seed::NoiseSeed;
use crate::volume::NoiseVolume;
use crate::worley::WorleyGrid;

/// Sub-seed purposes. Changing one reseeds only that table.
mod purpose {
    pub const SHAPE_PERLIN: u64 = 1;
    pub const SHAPE_WORLEY: u64 = 2;
    pub const DETAIL_WORLEY: u64 = 3;
    pub const CURL: u64 = 4;
}

/// The three volumes generated at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct CloudVolumes {
    /// Low-frequency base shape (128³ by default).
    pub shape: NoiseVolume,
    /// High-frequency erosion detail (32³ by default).
    pub detail: NoiseVolume,
    /// Encoded curl vectors for turbulence (32³ by default).
    pub curl: NoiseVolume,
}

impl CloudVolumes {
    /// Bytes held by all three volumes, mips included.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.shape.size_bytes() + self.detail.size_bytes() + self.curl.size_bytes()
    }
}

/// Seeded generator for the cloud noise volumes.
#[derive(Clone, Debug)]
pub struct NoiseFieldGenerator {
    config: NoiseConfig,
    shape_perlin: TileablePerlin,
    shape_worley: [WorleyGrid; 3],
    detail_worley: [WorleyGrid; 3],
    curl: CurlField,
}

fn worley_ladder(seed: NoiseSeed, frequencies: [u32; 3]) -> CloudResult<[WorleyGrid; 3]> {
    Ok([
        WorleyGrid::new(seed.derive(0), frequencies[0])?,
        WorleyGrid::new(seed.derive(1), frequencies[1])?,
        WorleyGrid::new(seed.derive(2), frequencies[2])?,
    ])
}

/// Unit-cube coordinate of a voxel centre.
#[inline]
fn voxel_center(x: usize, y: usize, z: usize, resolution: usize) -> Vec3 {
    (Vec3::new(x as f32, y as f32, z as f32) + Vec3::splat(0.5)) / resolution as f32
}

impl NoiseFieldGenerator {
    /// Validates `config` and builds every lookup table.
    ///
    /// # Errors
    ///
    /// Returns the config validation error, or `VolumeAllocation` if a
    /// feature-point table cannot be allocated.
    pub fn new(config: NoiseConfig) -> CloudResult<Self> {
        config.validate()?;
        let seed = NoiseSeed::new(config.seed);
        Ok(Self {
            shape_perlin: TileablePerlin::new(seed.derive(purpose::SHAPE_PERLIN)),
            shape_worley: worley_ladder(
                seed.derive(purpose::SHAPE_WORLEY),
                config.shape_worley_frequencies,
            )?,
            detail_worley: worley_ladder(
                seed.derive(purpose::DETAIL_WORLEY),
                config.detail_worley_frequencies,
            )?,
            curl: CurlField::new(seed.derive(purpose::CURL), config.curl_frequency),
            config,
        })
    }

    /// The configuration this generator was built from.
    #[must_use]
    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    /// Shape volume: Perlin fBm in R, inverted Worley at the shape ladder in GBA.
    ///
    /// # Errors
    ///
    /// Returns `VolumeAllocation` if the volume cannot be allocated.
    pub fn generate_shape(&self) -> CloudResult<NoiseVolume> {
        let resolution = self.config.shape_resolution;
        let frequency = self.config.perlin_frequency;
        let octaves = self.config.perlin_octaves;
        let start = Instant::now();

        let volume = NoiseVolume::from_fn(resolution, |x, y, z| {
            let p = voxel_center(x, y, z, resolution);
            [
                self.shape_perlin.fbm(p, frequency, octaves),
                self.shape_worley[0].sample(p),
                self.shape_worley[1].sample(p),
                self.shape_worley[2].sample(p),
            ]
        })?;

        tracing::info!(
            "Generated shape volume {resolution}^3 in {:.1} ms",
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(volume)
    }

    /// Detail volume: inverted Worley at the detail ladder in RGB, A = 0.
    ///
    /// # Errors
    ///
    /// Returns `VolumeAllocation` if the volume cannot be allocated.
    pub fn generate_detail(&self) -> CloudResult<NoiseVolume> {
        let resolution = self.config.detail_resolution;
        let start = Instant::now();

        let volume = NoiseVolume::from_fn(resolution, |x, y, z| {
            let p = voxel_center(x, y, z, resolution);
            [
                self.detail_worley[0].sample(p),
                self.detail_worley[1].sample(p),
                self.detail_worley[2].sample(p),
                0.0,
            ]
        })?;

        tracing::info!(
            "Generated detail volume {resolution}^3 in {:.1} ms",
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(volume)
    }

    /// Curl volume: encoded divergence-free turbulence vectors.
    ///
    /// # Errors
    ///
    /// Returns `VolumeAllocation` if the volume cannot be allocated.
    pub fn generate_curl(&self) -> CloudResult<NoiseVolume> {
        let resolution = self.config.curl_resolution;
        let start = Instant::now();

        let volume = NoiseVolume::from_fn(resolution, |x, y, z| {
            CurlField::encode(self.curl.sample(voxel_center(x, y, z, resolution)))
        })?;

        tracing::info!(
            "Generated curl volume {resolution}^3 in {:.1} ms",
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(volume)
    }

    /// Generates all three volumes.
    ///
    /// # Errors
    ///
    /// Returns the first allocation failure. Without the volumes there are no
    /// clouds, so callers treat this as fatal.
    pub fn generate_all(&self) -> CloudResult<CloudVolumes> {
        let start = Instant::now();
        let volumes = CloudVolumes {
            shape: self.generate_shape()?,
            detail: self.generate_detail()?,
            curl: self.generate_curl()?,
        };
        tracing::info!(
            "Noise volumes ready: {} KiB in {:.1} ms",
            volumes.size_bytes() / 1024,
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(volumes)
    }
}
