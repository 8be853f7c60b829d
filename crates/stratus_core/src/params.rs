//! # Parameter Surface
//!
//! Two views of the same controls:
//!
//! - [`CloudSettings`]: what the operator edits, in slider units (degrees of
//!   sun angle, "0.3" shape scale, precipitation 1.0–2.5, ...).
//! - [`ParameterSet`]: what a frame consumes, with every slider mapped to the
//!   units the kernels expect.
//!
//! The slider → kernel mapping is fixed; changing any constant here changes
//! the look of every existing preset.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::geometry::CloudLayerGeometry;

/// Minimum raymarch step count.
pub const MIN_NUM_STEPS: u32 = 16;

/// Maximum raymarch step count.
pub const MAX_NUM_STEPS: u32 = 256;

/// Frequency floor added to every noise scale.
const NOISE_SCALE_BASE: f32 = 0.000_01;

/// World-to-texture factor applied to the shape scale slider.
const NOISE_SCALE_FACTOR: f32 = 0.000_4;

/// Precipitation slider to extinction-per-metre factor.
const PRECIPITATION_FACTOR: f32 = 0.01;

/// Operator-facing cloud controls.
///
/// Every field may change between frames. Angles are stored in radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudSettings {
    /// Sun elevation angle (radians, `-PI..=0`; negative is above the horizon).
    pub sun_angle: f32,
    /// Cloud layer bottom above the ground.
    pub cloud_min_height: f32,
    /// Cloud layer top above the ground.
    pub cloud_max_height: f32,
    /// Shape noise tiling (slider `0.1..=1.0`).
    pub shape_noise_scale: f32,
    /// Detail noise tiling relative to shape (slider `0..=100`).
    pub detail_noise_scale: f32,
    /// Strength of detail erosion (`0..=1`).
    pub detail_noise_modifier: f32,
    /// Turbulence noise tiling relative to shape (slider `0..=100`).
    pub turbulence_noise_scale: f32,
    /// Turbulence displacement strength (slider `0..=100`).
    pub turbulence_amount: f32,
    /// Fraction of sky covered (`0..=1`).
    pub cloud_coverage: f32,
    /// Rain-cloud darkness proxy (`1.0..=2.5`).
    pub precipitation: f32,
    /// Ambient light weight (`0..=1`).
    pub ambient_light_factor: f32,
    /// Direct sun light weight (`0..=1`).
    pub sun_light_factor: f32,
    /// Wind heading (radians, `-PI..=0`).
    pub wind_angle: f32,
    /// Wind speed in metres per second (`0..=200`).
    pub wind_speed: f32,
    /// Extra wind displacement at the top of the layer.
    pub wind_shear_offset: f32,
    /// Sun colour (linear RGB).
    pub sun_color: Vec3,
    /// Planet radius.
    pub planet_radius: f32,
    /// Raymarch step count (`16..=256`).
    pub max_num_steps: u32,
    /// Spacing of the light march toward the sun.
    pub light_step_length: f32,
    /// Light march cone radius, relative to distance travelled.
    pub light_cone_radius: f32,
    /// Cloud colour at the bottom of the layer.
    pub cloud_base_color: Vec3,
    /// Cloud colour at the top of the layer.
    pub cloud_top_color: Vec3,
    /// Forward Henyey-Greenstein asymmetry.
    pub henyey_greenstein_g_forward: f32,
    /// Backward Henyey-Greenstein asymmetry.
    pub henyey_greenstein_g_backward: f32,
    /// Take coarse steps through empty space.
    pub empty_space_skipping: bool,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            sun_angle: (-58.0_f32).to_radians(),
            cloud_min_height: 1_500.0,
            cloud_max_height: 4_000.0,
            shape_noise_scale: 0.3,
            detail_noise_scale: 5.5,
            detail_noise_modifier: 0.5,
            turbulence_noise_scale: 7.44,
            turbulence_amount: 1.0,
            cloud_coverage: 0.7,
            precipitation: 1.0,
            ambient_light_factor: 0.12,
            sun_light_factor: 1.0,
            wind_angle: 0.0,
            wind_speed: 50.0,
            wind_shear_offset: 500.0,
            sun_color: Vec3::ONE,
            planet_radius: 35_000.0,
            max_num_steps: 128,
            light_step_length: 64.0,
            light_cone_radius: 0.4,
            cloud_base_color: Vec3::new(0.78, 0.86, 1.0),
            cloud_top_color: Vec3::ONE,
            henyey_greenstein_g_forward: 0.4,
            henyey_greenstein_g_backward: 0.179,
            empty_space_skipping: true,
        }
    }
}

impl CloudSettings {
    /// Clamps every slider-backed field to the range the editing UI offers.
    ///
    /// Free-form inputs (heights, planet radius, wind shear) are left alone.
    #[must_use]
    pub fn clamp_to_ui_ranges(mut self) -> Self {
        use std::f32::consts::PI;

        self.sun_angle = self.sun_angle.clamp(-PI, 0.0);
        self.wind_angle = self.wind_angle.clamp(-PI, 0.0);
        self.shape_noise_scale = self.shape_noise_scale.clamp(0.1, 1.0);
        self.detail_noise_scale = self.detail_noise_scale.clamp(0.0, 100.0);
        self.detail_noise_modifier = self.detail_noise_modifier.clamp(0.0, 1.0);
        self.turbulence_noise_scale = self.turbulence_noise_scale.clamp(0.0, 100.0);
        self.turbulence_amount = self.turbulence_amount.clamp(0.0, 100.0);
        self.cloud_coverage = self.cloud_coverage.clamp(0.0, 1.0);
        self.precipitation = self.precipitation.clamp(1.0, 2.5);
        self.ambient_light_factor = self.ambient_light_factor.clamp(0.0, 1.0);
        self.sun_light_factor = self.sun_light_factor.clamp(0.0, 1.0);
        self.wind_speed = self.wind_speed.clamp(0.0, 200.0);
        self.max_num_steps = self.max_num_steps.clamp(MIN_NUM_STEPS, MAX_NUM_STEPS);
        self.sun_color = self.sun_color.clamp(Vec3::ZERO, Vec3::ONE);
        self
    }
}

/// Immutable per-frame snapshot of every control, in kernel units.
///
/// Built from [`CloudSettings`] by [`ParameterSet::from_settings`]; a frame
/// never observes a half-applied edit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParameterSet {
    /// Cloud layer bounds.
    pub geometry: CloudLayerGeometry,
    /// World-to-texture scale of the shape volume.
    pub shape_noise_scale: f32,
    /// World-to-texture scale of the detail volume.
    pub detail_noise_scale: f32,
    /// Strength of detail erosion.
    pub detail_noise_modifier: f32,
    /// World-to-texture scale of the turbulence field.
    pub turbulence_noise_scale: f32,
    /// Turbulence displacement strength.
    pub turbulence_amount: f32,
    /// Fraction of sky covered.
    pub cloud_coverage: f32,
    /// Extinction per metre at unit density.
    pub precipitation: f32,
    /// Unit wind direction.
    pub wind_direction: Vec3,
    /// Wind speed in metres per second.
    pub wind_speed: f32,
    /// Wind displacement at the top of the layer.
    pub wind_shear_offset: f32,
    /// Primary march step count, already clamped.
    pub max_num_steps: u32,
    /// Light march spacing.
    pub light_step_length: f32,
    /// Light march cone radius.
    pub light_cone_radius: f32,
    /// Unit vector pointing toward the sun.
    pub sun_direction: Vec3,
    /// Sun colour.
    pub sun_color: Vec3,
    /// Cloud colour at the bottom of the layer.
    pub cloud_base_color: Vec3,
    /// Cloud colour at the top of the layer.
    pub cloud_top_color: Vec3,
    /// Ambient light weight.
    pub ambient_light_factor: f32,
    /// Direct sun weight.
    pub sun_light_factor: f32,
    /// Forward lobe asymmetry.
    pub hg_g_forward: f32,
    /// Backward lobe asymmetry.
    pub hg_g_backward: f32,
    /// Coarse stepping through empty space.
    pub empty_space_skipping: bool,
}

impl ParameterSet {
    /// Maps slider values to kernel units.
    #[must_use]
    pub fn from_settings(settings: &CloudSettings) -> Self {
        let noise_scale = NOISE_SCALE_BASE + settings.shape_noise_scale * NOISE_SCALE_FACTOR;

        // The light points from the sun; kernels want the direction to it.
        let light_direction =
            Vec3::new(0.0, settings.sun_angle.sin(), settings.sun_angle.cos()).normalize_or_zero();
        let wind_direction =
            Vec3::new(settings.wind_angle.cos(), settings.wind_angle.sin(), 0.0).normalize_or_zero();

        Self {
            geometry: CloudLayerGeometry::new(
                settings.planet_radius,
                settings.cloud_min_height,
                settings.cloud_max_height,
            ),
            shape_noise_scale: noise_scale,
            detail_noise_scale: noise_scale * settings.detail_noise_scale,
            detail_noise_modifier: settings.detail_noise_modifier,
            turbulence_noise_scale: noise_scale * settings.turbulence_noise_scale,
            turbulence_amount: settings.turbulence_amount,
            cloud_coverage: settings.cloud_coverage,
            precipitation: settings.precipitation * PRECIPITATION_FACTOR,
            wind_direction,
            wind_speed: settings.wind_speed,
            wind_shear_offset: settings.wind_shear_offset,
            max_num_steps: settings.max_num_steps.clamp(MIN_NUM_STEPS, MAX_NUM_STEPS),
            light_step_length: settings.light_step_length,
            light_cone_radius: settings.light_cone_radius,
            sun_direction: -light_direction,
            sun_color: settings.sun_color,
            cloud_base_color: settings.cloud_base_color,
            cloud_top_color: settings.cloud_top_color,
            ambient_light_factor: settings.ambient_light_factor,
            sun_light_factor: settings.sun_light_factor,
            hg_g_forward: settings.henyey_greenstein_g_forward,
            hg_g_backward: settings.henyey_greenstein_g_backward,
            empty_space_skipping: settings.empty_space_skipping,
        }
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::from_settings(&CloudSettings::default())
    }
}

impl From<&CloudSettings> for ParameterSet {
    fn from(settings: &CloudSettings) -> Self {
        Self::from_settings(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_scale_mapping() {
        let params = ParameterSet::default();
        let expected = 0.000_01 + 0.3 * 0.000_4;
        assert!((params.shape_noise_scale - expected).abs() < 1e-9);
        assert!((params.detail_noise_scale - expected * 5.5).abs() < 1e-9);
        assert!((params.turbulence_noise_scale - expected * 7.44).abs() < 1e-9);
    }

    #[test]
    fn test_precipitation_prescaled() {
        let settings = CloudSettings {
            precipitation: 2.5,
            ..CloudSettings::default()
        };
        let params = ParameterSet::from_settings(&settings);
        assert!((params.precipitation - 0.025).abs() < 1e-7);
    }

    #[test]
    fn test_sun_direction_points_up_by_default() {
        let params = ParameterSet::default();
        assert!(params.sun_direction.y > 0.8);
        assert!((params.sun_direction.length() - 1.0).abs() < 1e-5);
        assert_eq!(params.sun_direction.x, 0.0);
    }

    #[test]
    fn test_wind_direction() {
        let params = ParameterSet::default();
        assert!((params.wind_direction - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_step_count_clamped() {
        let low = CloudSettings {
            max_num_steps: 2,
            ..CloudSettings::default()
        };
        let high = CloudSettings {
            max_num_steps: 10_000,
            ..CloudSettings::default()
        };
        assert_eq!(ParameterSet::from_settings(&low).max_num_steps, MIN_NUM_STEPS);
        assert_eq!(ParameterSet::from_settings(&high).max_num_steps, MAX_NUM_STEPS);
    }

    #[test]
    fn test_planet_center_below_origin() {
        let params = ParameterSet::default();
        assert_eq!(params.geometry.planet_center, Vec3::new(0.0, -35_000.0, 0.0));
    }

    #[test]
    fn test_clamp_to_ui_ranges() {
        let wild = CloudSettings {
            cloud_coverage: 3.0,
            precipitation: 0.0,
            sun_angle: 1.0,
            wind_speed: -5.0,
            ..CloudSettings::default()
        }
        .clamp_to_ui_ranges();
        assert_eq!(wild.cloud_coverage, 1.0);
        assert_eq!(wild.precipitation, 1.0);
        assert_eq!(wild.sun_angle, 0.0);
        assert_eq!(wild.wind_speed, 0.0);
        // Free-form inputs are untouched.
        assert_eq!(wild.cloud_min_height, 1_500.0);
    }
}
