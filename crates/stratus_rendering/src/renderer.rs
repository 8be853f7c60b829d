//! # Frame Renderer
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ tile 0  (tile_rows rows)     │ ─┐
//! ├──────────────────────────────┤  │
//! │ tile 1                       │  ├─ rayon: one task per tile,
//! ├──────────────────────────────┤  │  each pixel marched independently
//! │ ...                          │  │  and written only by its tile
//! ├──────────────────────────────┤  │
//! │ tile N                       │ ─┘
//! └──────────────────────────────┘
//!            │ reduce
//!            ▼
//!        FrameStats
//! ```
//!
//! The renderer owns the volumes (shared, read-only) and the output target.
//! Parameters come from the caller once per frame.

use std::sync::Arc;
use std::time::Instant;

use glam::Vec3;
use rayon::prelude::*;
use stratus_core::{CloudError, CloudResult, ParameterSet, RenderConfig};
use stratus_procedural::CloudVolumes;

use crate::camera::CameraRig;
use crate::density::DensitySampler;
use crate::raymarch::{CloudSample, RaymarchIntegrator};
use crate::stats::FrameStats;

/// Per-pixel dither in `[0, 1)` (interleaved gradient noise).
///
/// Breaks up banding from the fixed step pattern without any state.
#[inline]
#[must_use]
pub fn interleaved_gradient_noise(x: u32, y: u32) -> f32 {
    let inner = (0.067_110_56 * x as f32 + 0.005_837_15 * y as f32).fract();
    (52.982_918_9 * inner).fract()
}

/// Everything that varies per frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameInputs<'a> {
    /// Camera for this frame.
    pub camera: CameraRig,
    /// Seconds since start, drives wind.
    pub elapsed_time: f32,
    /// The frame's parameter snapshot.
    pub params: &'a ParameterSet,
}

/// A rendered cloud layer, one premultiplied sample per pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct CloudFrame {
    width: u32,
    height: u32,
    pixels: Vec<CloudSample>,
}

impl CloudFrame {
    /// Frame width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// All pixels, row-major from the top row.
    #[must_use]
    pub fn pixels(&self) -> &[CloudSample] {
        &self.pixels
    }

    /// Pixel at `(x, y)`, or `None` out of bounds.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<CloudSample> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Composites the clouds over a background of the same size:
    /// `radiance + background * (1 - alpha)`.
    ///
    /// # Errors
    ///
    /// Returns `BufferSizeMismatch` if `background` has the wrong length.
    pub fn composite_over(&self, background: &[Vec3]) -> CloudResult<Vec<Vec3>> {
        if background.len() != self.pixels.len() {
            return Err(CloudError::BufferSizeMismatch {
                expected: self.pixels.len(),
                actual: background.len(),
            });
        }
        Ok(self
            .pixels
            .iter()
            .zip(background)
            .map(|(cloud, &bg)| cloud.radiance + bg * (1.0 - cloud.alpha))
            .collect())
    }

    /// Mean opacity over the frame.
    #[must_use]
    pub fn mean_alpha(&self) -> f32 {
        if self.pixels.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.pixels.iter().map(|p| f64::from(p.alpha)).sum();
        (sum / self.pixels.len() as f64) as f32
    }
}

/// Tiled parallel cloud renderer.
#[derive(Clone, Debug)]
pub struct CloudRenderer {
    volumes: Arc<CloudVolumes>,
    config: RenderConfig,
}

impl CloudRenderer {
    /// Creates a renderer for a fixed output target.
    ///
    /// # Errors
    ///
    /// Returns the render config validation error, if any.
    pub fn new(volumes: Arc<CloudVolumes>, config: RenderConfig) -> CloudResult<Self> {
        config.validate()?;
        Ok(Self { volumes, config })
    }

    /// Output target and tiling.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// The shared noise volumes.
    #[must_use]
    pub fn volumes(&self) -> &Arc<CloudVolumes> {
        &self.volumes
    }

    /// Renders one frame.
    #[must_use]
    pub fn render(&self, inputs: &FrameInputs<'_>) -> (CloudFrame, FrameStats) {
        let start = Instant::now();
        let RenderConfig {
            width,
            height,
            tile_rows,
            jitter,
        } = self.config;
        let row = width as usize;
        let tile_len = row * tile_rows as usize;

        let sampler = DensitySampler::new(&self.volumes, inputs.params, inputs.elapsed_time);
        let integrator = RaymarchIntegrator::new(sampler);
        let camera = inputs.camera;

        let mut pixels = vec![CloudSample::TRANSPARENT; self.config.pixel_count()];
        let mut stats = pixels
            .par_chunks_mut(tile_len)
            .enumerate()
            .map(|(tile, chunk)| {
                let mut stats = FrameStats::default();
                let first_row = tile * tile_rows as usize;
                for (i, pixel) in chunk.iter_mut().enumerate() {
                    let x = (i % row) as u32;
                    let y = (first_row + i / row) as u32;
                    let ray = camera.ray_for_pixel(x, y, width, height);
                    let offset = if jitter {
                        interleaved_gradient_noise(x, y)
                    } else {
                        0.0
                    };
                    let (sample, march) = integrator.integrate_with_stats(&ray, offset);
                    stats.record(&sample, &march);
                    *pixel = sample;
                }
                stats
            })
            .reduce(FrameStats::default, FrameStats::combine);

        stats.frame_time_ms = start.elapsed().as_secs_f32() * 1000.0;
        tracing::debug!(
            "Rendered {width}x{height} clouds in {:.2} ms ({:.1}% cloudy, {:.1} steps/px)",
            stats.frame_time_ms,
            stats.coverage_ratio() * 100.0,
            stats.mean_steps_per_pixel()
        );

        let frame = CloudFrame {
            width,
            height,
            pixels,
        };
        (frame, stats)
    }
}
