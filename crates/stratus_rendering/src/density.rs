//! # Density Sampler
//!
//! Maps a world position to cloud density in `[0, 1]`:
//!
//! ```text
//! height fraction ─► wind offset ─► shape (eroded by its Worley channels)
//!       │                                 │
//!       │                           coverage remap
//!       │                                 │
//!       └──────────────► height gradient ─┤
//!                                         │ zero? ─► 0
//!                      curl turbulence ─► detail erosion ─► clamp
//! ```
//!
//! The sampler holds only shared references; it is `Sync` and never
//! mutates anything, so every pixel of a frame can share one.

use glam::Vec3;
use stratus_core::ParameterSet;
use stratus_procedural::{decode_curl, CloudVolumes};

/// Shape erosion weights for the G, B, A Worley channels (low to high frequency).
const SHAPE_EROSION_WEIGHTS: [f32; 3] = [0.15, 0.25, 0.35];

/// Detail fBm weights for the R, G, B Worley channels.
const DETAIL_FBM_WEIGHTS: [f32; 3] = [0.625, 0.25, 0.125];

/// Maximum fraction of density the detail noise can erode.
const DETAIL_EROSION_STRENGTH: f32 = 0.35;

/// Detail noise scrolls faster than the shape.
const DETAIL_WIND_FACTOR: f32 = 1.5;

/// Turbulence displacement at unit amount, in metres.
const TURBULENCE_DISTANCE: f32 = 50.0;

/// Hermite smoothstep, `0` below `edge0` and `1` above `edge1`.
#[inline]
#[must_use]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Vertical density profile: fades in over the bottom tenth of the layer
/// and out over the top 40%.
#[inline]
#[must_use]
pub fn height_gradient(h: f32) -> f32 {
    smoothstep(0.0, 0.1, h) * (1.0 - smoothstep(0.6, 1.0, h))
}

/// Coverage remap: keeps the part of `raw` above `1 - coverage`, rescaled
/// back to `[0, 1]`. Zero coverage removes all cloud.
#[inline]
#[must_use]
pub fn apply_coverage(raw: f32, coverage: f32) -> f32 {
    if coverage <= 0.0 || coverage.is_nan() {
        0.0
    } else {
        (raw - (1.0 - coverage)).max(0.0) / coverage
    }
}

/// Samples cloud density for one frame's parameters and time.
#[derive(Clone, Copy, Debug)]
pub struct DensitySampler<'a> {
    volumes: &'a CloudVolumes,
    params: &'a ParameterSet,
    elapsed_time: f32,
}

impl<'a> DensitySampler<'a> {
    /// Binds the volumes to one frame's parameters and wind time.
    #[must_use]
    pub fn new(volumes: &'a CloudVolumes, params: &'a ParameterSet, elapsed_time: f32) -> Self {
        Self {
            volumes,
            params,
            elapsed_time,
        }
    }

    /// The parameters this sampler reads.
    #[inline]
    #[must_use]
    pub fn params(&self) -> &'a ParameterSet {
        self.params
    }

    /// Seconds of wind scrolling applied.
    #[inline]
    #[must_use]
    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    /// Normalized height inside the cloud layer (unclamped).
    #[inline]
    #[must_use]
    pub fn height_fraction(&self, position: Vec3) -> f32 {
        self.params.geometry.height_fraction(position)
    }

    /// Density at `position` using the finest mip.
    #[must_use]
    pub fn sample_density(&self, position: Vec3) -> f32 {
        self.sample_density_with_footprint(position, 0.0)
    }

    /// Height-shaped, coverage-remapped base density, or `None` outside the
    /// layer. Returns `(density, height_fraction)`.
    fn base_density(&self, position: Vec3, footprint_m: f32) -> Option<(f32, f32)> {
        let h = self.height_fraction(position);
        if !(0.0..=1.0).contains(&h) {
            return None;
        }

        let p = self.params;
        let wind = p.wind_direction;
        let wind_position =
            position + wind * (p.wind_speed * self.elapsed_time) + wind * (p.wind_shear_offset * h);

        let shape = &self.volumes.shape;
        let lod = shape.lod_for_footprint(footprint_m * p.shape_noise_scale);
        let s = shape.sample(wind_position * p.shape_noise_scale, lod);

        let [wg, wb, wa] = SHAPE_EROSION_WEIGHTS;
        let erosion = wg * (1.0 - s.y) + wb * (1.0 - s.z) + wa * (1.0 - s.w);
        let raw = s.x * (1.0 - erosion);

        let density = apply_coverage(raw, p.cloud_coverage) * height_gradient(h);
        Some((density, h))
    }

    /// Density at `position`, sampling mips that match a footprint of
    /// `footprint_m` metres.
    ///
    /// Always in `[0, 1]`; exactly `0` outside the cloud layer.
    #[must_use]
    pub fn sample_density_with_footprint(&self, position: Vec3, footprint_m: f32) -> f32 {
        let Some((mut density, h)) = self.base_density(position, footprint_m) else {
            return 0.0;
        };
        if density <= 0.0 || density.is_nan() {
            return 0.0;
        }

        let p = self.params;

        let curl_volume = &self.volumes.curl;
        let curl_lod = curl_volume.lod_for_footprint(footprint_m * p.turbulence_noise_scale);
        let curl = decode_curl(curl_volume.sample(position * p.turbulence_noise_scale, curl_lod));
        let turbulence = curl * (p.turbulence_amount * TURBULENCE_DISTANCE * (1.0 - h));

        let detail_position = position
            + p.wind_direction * (p.wind_speed * self.elapsed_time * DETAIL_WIND_FACTOR)
            + turbulence;
        let detail = &self.volumes.detail;
        let detail_lod = detail.lod_for_footprint(footprint_m * p.detail_noise_scale);
        let d = detail.sample(detail_position * p.detail_noise_scale, detail_lod);

        let [fr, fg, fb] = DETAIL_FBM_WEIGHTS;
        let detail_fbm = fr * d.x + fg * d.y + fb * d.z;
        let erode = (detail_fbm * p.detail_noise_modifier * DETAIL_EROSION_STRENGTH).clamp(0.0, 0.99);
        density = (density - erode) / (1.0 - erode);

        if density.is_nan() {
            0.0
        } else {
            density.clamp(0.0, 1.0)
        }
    }

    /// Base density without detail erosion or turbulence.
    ///
    /// Never below the full density at the same point, so a zero here means
    /// the full density is zero too. Used to skip empty space cheaply.
    #[must_use]
    pub fn sample_coarse_density(&self, position: Vec3, footprint_m: f32) -> f32 {
        match self.base_density(position, footprint_m) {
            Some((density, _)) if !density.is_nan() => density.clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}
