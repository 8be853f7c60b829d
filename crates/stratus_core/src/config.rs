//! # Configuration
//!
//! One TOML document, three sections, every field optional:
//!
//! ```toml
//! [noise]
//! seed = 1234
//! shape_resolution = 128
//!
//! [clouds]
//! cloud_coverage = 0.85
//! max_num_steps = 192
//!
//! [render]
//! width = 640
//! height = 360
//! ```
//!
//! Loaded once at startup. Live edits go through the
//! [`ParameterStore`](crate::sync::ParameterStore), not through this file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CloudError, CloudResult};
use crate::params::CloudSettings;

/// Highest lattice frequency any noise table may use (cells per tile edge).
///
/// Perlin lattices wrap through a 256-entry permutation, so no octave can
/// repeat faster than this and still tile exactly.
pub const MAX_NOISE_FREQUENCY: u32 = 256;

/// Noise Field Generator configuration.
///
/// Changing any field changes the generated volumes; the same config always
/// produces bit-identical volumes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Seed for permutation tables and feature points.
    pub seed: u64,
    /// Edge length of the shape volume.
    pub shape_resolution: usize,
    /// Edge length of the detail volume.
    pub detail_resolution: usize,
    /// Edge length of the curl (turbulence) volume.
    pub curl_resolution: usize,
    /// Perlin fBm octave count for the base shape channel.
    pub perlin_octaves: u32,
    /// Lattice frequency of the first Perlin octave (cells per tile).
    pub perlin_frequency: u32,
    /// Worley cell frequencies of shape channels 1-3.
    pub shape_worley_frequencies: [u32; 3],
    /// Worley cell frequencies of detail channels 0-2.
    pub detail_worley_frequencies: [u32; 3],
    /// Lattice frequency of the curl potential.
    pub curl_frequency: u32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED_C10D,
            shape_resolution: 128,
            detail_resolution: 32,
            curl_resolution: 32,
            perlin_octaves: 4,
            perlin_frequency: 4,
            shape_worley_frequencies: [4, 8, 16],
            detail_worley_frequencies: [2, 4, 8],
            curl_frequency: 4,
        }
    }
}

impl NoiseConfig {
    /// Checks resolutions and frequencies.
    ///
    /// # Errors
    ///
    /// Returns an error for non power-of-two resolutions, zero octaves, zero
    /// frequencies, or frequencies the volumes cannot resolve: a Worley or
    /// curl frequency above its volume's resolution or
    /// [`MAX_NOISE_FREQUENCY`], or a top Perlin octave above
    /// [`MAX_NOISE_FREQUENCY`].
    pub fn validate(&self) -> CloudResult<()> {
        check_resolution("shape", self.shape_resolution)?;
        check_resolution("detail", self.detail_resolution)?;
        check_resolution("curl", self.curl_resolution)?;

        if self.perlin_octaves == 0 {
            return Err(CloudError::InvalidConfig(
                "perlin_octaves must be at least 1".to_string(),
            ));
        }
        check_frequency("perlin_frequency", self.perlin_frequency, usize::MAX)?;
        let max_octaves = max_perlin_octaves(self.perlin_frequency);
        if self.perlin_octaves > max_octaves {
            return Err(CloudError::InvalidConfig(format!(
                "perlin_octaves {} exceeds {max_octaves} for perlin_frequency {}",
                self.perlin_octaves, self.perlin_frequency
            )));
        }
        for frequency in self.shape_worley_frequencies {
            check_frequency("shape_worley_frequencies", frequency, self.shape_resolution)?;
        }
        for frequency in self.detail_worley_frequencies {
            check_frequency("detail_worley_frequencies", frequency, self.detail_resolution)?;
        }
        check_frequency("curl_frequency", self.curl_frequency, self.curl_resolution)
    }
}

/// Octaves that fit between `base_frequency` and [`MAX_NOISE_FREQUENCY`],
/// doubling each time.
#[must_use]
pub fn max_perlin_octaves(base_frequency: u32) -> u32 {
    if base_frequency == 0 || base_frequency > MAX_NOISE_FREQUENCY {
        return 0;
    }
    (MAX_NOISE_FREQUENCY / base_frequency).ilog2() + 1
}

fn check_frequency(name: &str, frequency: u32, resolution: usize) -> CloudResult<()> {
    if frequency == 0 {
        return Err(CloudError::InvalidConfig(format!("{name} must be at least 1")));
    }
    if frequency > MAX_NOISE_FREQUENCY || frequency as usize > resolution {
        return Err(CloudError::InvalidConfig(format!(
            "{name} {frequency} exceeds the limit of {}",
            (MAX_NOISE_FREQUENCY as usize).min(resolution)
        )));
    }
    Ok(())
}

fn check_resolution(name: &'static str, resolution: usize) -> CloudResult<()> {
    if resolution >= 2 && resolution.is_power_of_two() {
        Ok(())
    } else {
        Err(CloudError::InvalidResolution { name, resolution })
    }
}

/// Output target and work partitioning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Rows per parallel work tile.
    pub tile_rows: u32,
    /// Offset each pixel's first sample by a dither pattern.
    pub jitter: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            tile_rows: 8,
            jitter: true,
        }
    }
}

impl RenderConfig {
    /// Number of pixels in the output.
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Width over height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Checks the target is non-empty.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero width, height, or tile size.
    pub fn validate(&self) -> CloudResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CloudError::InvalidConfig(format!(
                "render target {}x{} is empty",
                self.width, self.height
            )));
        }
        if self.tile_rows == 0 {
            return Err(CloudError::InvalidConfig(
                "tile_rows must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete startup configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StratusConfig {
    /// Noise volume generation.
    pub noise: NoiseConfig,
    /// Initial cloud controls.
    pub clouds: CloudSettings,
    /// Output target.
    pub render: RenderConfig,
}

impl StratusConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigParse` on malformed TOML or mistyped fields.
    pub fn from_toml_str(source: &str) -> CloudResult<Self> {
        toml::from_str(source).map_err(|e| CloudError::ConfigParse(e.to_string()))
    }

    /// Reads and parses a TOML file, then validates it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigRead` if the file cannot be read, `ConfigParse` on bad
    /// TOML, or a validation error.
    pub fn load(path: impl AsRef<Path>) -> CloudResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| CloudError::ConfigRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml_str(&source)?;
        config.validate()?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Serializes back to TOML.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if a value cannot be represented in TOML.
    pub fn to_toml_string(&self) -> CloudResult<String> {
        toml::to_string_pretty(self).map_err(|e| CloudError::InvalidConfig(e.to_string()))
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn validate(&self) -> CloudResult<()> {
        self.noise.validate()?;
        self.render.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = StratusConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(config, StratusConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = StratusConfig::from_toml_str(
            r"
            [noise]
            seed = 7
            detail_resolution = 16

            [clouds]
            cloud_coverage = 0.9
            sun_color = [1.0, 0.5, 0.25]

            [render]
            width = 64
            height = 32
            ",
        )
        .expect("valid config");

        assert_eq!(config.noise.seed, 7);
        assert_eq!(config.noise.detail_resolution, 16);
        assert_eq!(config.noise.shape_resolution, 128);
        assert!((config.clouds.cloud_coverage - 0.9).abs() < 1e-6);
        assert!((config.clouds.sun_color.y - 0.5).abs() < 1e-6);
        assert_eq!(config.clouds.max_num_steps, 128);
        assert_eq!(config.render.width, 64);
        assert_eq!(config.render.tile_rows, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_resolution() {
        let config = NoiseConfig {
            shape_resolution: 100,
            ..NoiseConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(CloudError::InvalidResolution {
                name: "shape",
                resolution: 100
            })
        );
    }

    #[test]
    fn test_rejects_zero_frequency() {
        let config = NoiseConfig {
            detail_worley_frequencies: [2, 0, 8],
            ..NoiseConfig::default()
        };
        assert!(matches!(config.validate(), Err(CloudError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_oversized_worley_frequency() {
        let config = NoiseConfig {
            detail_worley_frequencies: [2, 4, 3_000_000],
            ..NoiseConfig::default()
        };
        assert!(matches!(config.validate(), Err(CloudError::InvalidConfig(_))));

        let above_resolution = NoiseConfig {
            detail_worley_frequencies: [2, 4, 64],
            ..NoiseConfig::default()
        };
        assert!(above_resolution.validate().is_err());
    }

    #[test]
    fn test_rejects_curl_frequency_above_resolution() {
        let config = NoiseConfig {
            curl_resolution: 8,
            curl_frequency: 16,
            ..NoiseConfig::default()
        };
        assert!(matches!(config.validate(), Err(CloudError::InvalidConfig(_))));
    }

    #[test]
    fn test_octaves_bounded_by_max_frequency() {
        assert_eq!(max_perlin_octaves(4), 7);
        assert_eq!(max_perlin_octaves(256), 1);
        assert_eq!(max_perlin_octaves(3), 7);
        assert_eq!(max_perlin_octaves(512), 0);

        let at_limit = NoiseConfig {
            perlin_octaves: 7,
            ..NoiseConfig::default()
        };
        assert!(at_limit.validate().is_ok());

        for octaves in [8, 4_000_000_000] {
            let config = NoiseConfig {
                perlin_octaves: octaves,
                ..NoiseConfig::default()
            };
            assert!(matches!(config.validate(), Err(CloudError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_rejects_empty_render_target() {
        let render = RenderConfig {
            width: 0,
            ..RenderConfig::default()
        };
        assert!(render.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let result = StratusConfig::from_toml_str("[clouds]\ncloud_coverage = \"lots\"");
        assert!(matches!(result, Err(CloudError::ConfigParse(_))));
    }

    #[test]
    fn test_toml_roundtrip_preserves_settings() {
        let mut config = StratusConfig::default();
        config.clouds.cloud_coverage = 0.42;
        config.noise.seed = 99;
        let text = config.to_toml_string().expect("serializes");
        let back = StratusConfig::from_toml_str(&text).expect("parses");
        assert_eq!(back, config);
    }
}
