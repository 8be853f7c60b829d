//! # Raymarch Integrator
//!
//! Marches one view ray through the cloud layer, front to back.
//!
//! ```text
//!  entry                                                   exit
//!    |--c----c----c--f-f-f-f-f-f-f-f-f-f-f-f--c----c----c--|
//!        coarse (2x)   fine while density > 0   coarse again
//!                      after 8 empty fine steps
//! ```
//!
//! Every fine sample with density marches six samples toward the sun for
//! self-shadowing. Each segment is composited with the energy-conserving
//! form `T * S * (1 - exp(-σ ds))`, so the result converges as the step
//! count grows instead of scaling with it.

use glam::Vec3;
use stratus_core::{Ray, MAX_NUM_STEPS, MIN_NUM_STEPS};

use crate::density::DensitySampler;
use crate::scattering::{beer_lambert, extinction, in_scattered_radiance, phase};

/// Stop marching once this little light gets through.
pub const TRANSMITTANCE_CUTOFF: f32 = 0.01;

/// Consecutive empty fine samples before dropping back to coarse steps.
const EMPTY_SAMPLES_BEFORE_COARSE: u32 = 8;

/// Coarse step length relative to the fine step.
const COARSE_STEP_FACTOR: f32 = 2.0;

/// Iteration cap relative to the step count.
const ITERATION_FACTOR: u32 = 4;

/// Distance of the long light sample, in light steps past the cone.
const LONG_LIGHT_SAMPLE_FACTOR: f32 = 4.0;

/// Fixed lateral offsets for the five light cone samples.
const LIGHT_CONE_KERNEL: [Vec3; 5] = [
    Vec3::new(0.380_513, 0.924_534, -0.021_113),
    Vec3::new(-0.506_258, -0.035_908, -0.861_634),
    Vec3::new(-0.325_092, -0.945_574, 0.014_288),
    Vec3::new(0.090_262, -0.273_765, 0.957_552),
    Vec3::new(0.281_286, 0.424_436, -0.860_658),
];

/// Light samples taken per shaded point.
pub const LIGHT_SAMPLES_PER_POINT: u32 = LIGHT_CONE_KERNEL.len() as u32 + 1;

/// Integrated result for one ray.
///
/// `radiance` is premultiplied: composite with
/// `radiance + background * (1 - alpha)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CloudSample {
    /// In-scattered light reaching the camera.
    pub radiance: Vec3,
    /// Opacity, `1 - transmittance`.
    pub alpha: f32,
}

impl CloudSample {
    /// No cloud along the ray.
    pub const TRANSPARENT: Self = Self {
        radiance: Vec3::ZERO,
        alpha: 0.0,
    };
}

/// Work counters for one ray.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarchStats {
    /// Density samples along the view ray (coarse and fine).
    pub steps: u32,
    /// Density samples toward the sun.
    pub light_samples: u32,
    /// The ray stopped because transmittance fell below the cutoff.
    pub early_exit: bool,
}

/// One shaded point along a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarchSample {
    /// Distance from the ray origin.
    pub distance: f32,
    /// World position.
    pub position: Vec3,
    /// Cloud density.
    pub density: f32,
    /// Height fraction inside the layer.
    pub height_fraction: f32,
    /// Phase function value for this ray and the sun.
    pub phase: f32,
    /// Sun light reaching the point.
    pub light_transmittance: f32,
    /// View-ray transmittance after this segment.
    pub transmittance: f32,
}

/// Integrates cloud radiance and opacity along view rays.
#[derive(Clone, Copy, Debug)]
pub struct RaymarchIntegrator<'a> {
    sampler: DensitySampler<'a>,
}

impl<'a> RaymarchIntegrator<'a> {
    /// Creates an integrator over one frame's density field.
    #[must_use]
    pub fn new(sampler: DensitySampler<'a>) -> Self {
        Self { sampler }
    }

    /// The density field being integrated.
    #[must_use]
    pub fn sampler(&self) -> &DensitySampler<'a> {
        &self.sampler
    }

    /// Integrates one ray. `jitter` in `[0, 1)` offsets the first sample by
    /// that fraction of a step.
    #[must_use]
    pub fn integrate(&self, ray: &Ray, jitter: f32) -> CloudSample {
        self.march(ray, jitter, |_| ()).0
    }

    /// Integrates one ray and reports the work done.
    #[must_use]
    pub fn integrate_with_stats(&self, ray: &Ray, jitter: f32) -> (CloudSample, MarchStats) {
        self.march(ray, jitter, |_| ())
    }

    /// Integrates one ray and returns every shaded point, nearest first.
    #[must_use]
    pub fn trace(&self, ray: &Ray, jitter: f32) -> (CloudSample, Vec<MarchSample>) {
        let mut samples = Vec::new();
        let (result, _) = self.march(ray, jitter, |sample| samples.push(*sample));
        (result, samples)
    }

    /// Sun transmittance at `position`: five cone samples plus one long one.
    fn light_transmittance(&self, position: Vec3) -> f32 {
        let params = self.sampler.params();
        let step = params.light_step_length;
        let toward_sun = params.sun_direction;

        let mut optical_depth = 0.0;
        let mut distance = 0.0;
        for offset in &LIGHT_CONE_KERNEL {
            distance += step;
            let sample = position
                + toward_sun * distance
                + *offset * (params.light_cone_radius * distance);
            let density = self.sampler.sample_density_with_footprint(sample, step);
            optical_depth += extinction(density, params.precipitation) * step;
        }

        let long_step = step * LONG_LIGHT_SAMPLE_FACTOR;
        let far = position + toward_sun * (distance + long_step);
        let density = self.sampler.sample_density_with_footprint(far, long_step);
        optical_depth += extinction(density, params.precipitation) * long_step;

        beer_lambert(optical_depth)
    }

    fn march<F>(&self, ray: &Ray, jitter: f32, mut on_sample: F) -> (CloudSample, MarchStats)
    where
        F: FnMut(&MarchSample),
    {
        let params = self.sampler.params();
        let mut stats = MarchStats::default();
        let Some(interval) = params.geometry.march_interval(ray) else {
            return (CloudSample::TRANSPARENT, stats);
        };

        let steps = params.max_num_steps.clamp(MIN_NUM_STEPS, MAX_NUM_STEPS);
        let base_step = interval.length() / steps as f32;
        let jitter = if jitter.is_nan() { 0.0 } else { jitter.clamp(0.0, 1.0) };
        let phase = phase(
            ray.direction.dot(params.sun_direction),
            params.hg_g_forward,
            params.hg_g_backward,
        );

        let mut t = interval.entry + jitter * base_step;
        let mut transmittance = 1.0f32;
        let mut radiance = Vec3::ZERO;
        let mut coarse = params.empty_space_skipping;
        let mut empty_run = 0u32;

        for _ in 0..steps * ITERATION_FACTOR {
            if t >= interval.exit {
                break;
            }
            let position = ray.at(t);
            stats.steps += 1;

            if coarse {
                let density = self.sampler.sample_coarse_density(position, base_step);
                if density > 0.0 {
                    // Resample this distance at full detail.
                    coarse = false;
                    empty_run = 0;
                } else {
                    t += base_step * COARSE_STEP_FACTOR;
                }
                continue;
            }

            let density = self.sampler.sample_density_with_footprint(position, base_step);
            if density > 0.0 {
                empty_run = 0;
                let h = self.sampler.height_fraction(position);
                let light_transmittance = self.light_transmittance(position);
                stats.light_samples += LIGHT_SAMPLES_PER_POINT;

                let ds = base_step.min(interval.exit - t);
                let scattered = in_scattered_radiance(params, h, light_transmittance, phase);
                let step_transmittance = beer_lambert(extinction(density, params.precipitation) * ds);
                radiance += transmittance * scattered * (1.0 - step_transmittance);
                transmittance *= step_transmittance;

                on_sample(&MarchSample {
                    distance: t,
                    position,
                    density,
                    height_fraction: h,
                    phase,
                    light_transmittance,
                    transmittance,
                });

                if transmittance < TRANSMITTANCE_CUTOFF {
                    stats.early_exit = true;
                    break;
                }
            } else if params.empty_space_skipping {
                empty_run += 1;
                if empty_run >= EMPTY_SAMPLES_BEFORE_COARSE {
                    coarse = true;
                    empty_run = 0;
                }
            }
            t += base_step;
        }

        let sample = CloudSample {
            radiance,
            alpha: (1.0 - transmittance).clamp(0.0, 1.0),
        };
        (sample, stats)
    }
}
