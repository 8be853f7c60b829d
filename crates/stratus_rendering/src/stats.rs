//! Rendering statistics.

use crate::raymarch::{CloudSample, MarchStats};

/// Statistics from a rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Pixels marched.
    pub pixels: u64,
    /// Pixels with non-zero opacity.
    pub cloudy_pixels: u64,
    /// Density samples along view rays.
    pub march_steps: u64,
    /// Density samples toward the sun.
    pub light_samples: u64,
    /// Rays that stopped at the transmittance cutoff.
    pub early_exits: u64,
    /// Frame time in milliseconds.
    pub frame_time_ms: f32,
}

impl FrameStats {
    /// Adds one pixel's result.
    #[inline]
    pub fn record(&mut self, sample: &CloudSample, march: &MarchStats) {
        self.pixels += 1;
        if sample.alpha > 0.0 {
            self.cloudy_pixels += 1;
        }
        self.march_steps += u64::from(march.steps);
        self.light_samples += u64::from(march.light_samples);
        if march.early_exit {
            self.early_exits += 1;
        }
    }

    /// Sums two partial counts (tiles). Times are not summed; the frame time
    /// is set once for the whole frame.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        Self {
            pixels: self.pixels + other.pixels,
            cloudy_pixels: self.cloudy_pixels + other.cloudy_pixels,
            march_steps: self.march_steps + other.march_steps,
            light_samples: self.light_samples + other.light_samples,
            early_exits: self.early_exits + other.early_exits,
            frame_time_ms: self.frame_time_ms.max(other.frame_time_ms),
        }
    }

    /// Fraction of pixels with any cloud.
    #[must_use]
    pub fn coverage_ratio(&self) -> f64 {
        if self.pixels == 0 {
            0.0
        } else {
            self.cloudy_pixels as f64 / self.pixels as f64
        }
    }

    /// Mean view-ray samples per pixel.
    #[must_use]
    pub fn mean_steps_per_pixel(&self) -> f64 {
        if self.pixels == 0 {
            0.0
        } else {
            self.march_steps as f64 / self.pixels as f64
        }
    }

    /// Returns FPS calculated from frame time.
    #[must_use]
    pub fn fps(&self) -> f32 {
        if self.frame_time_ms > 0.0 {
            1000.0 / self.frame_time_ms
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_record_and_combine() {
        let cloudy = CloudSample {
            radiance: Vec3::ONE,
            alpha: 0.5,
        };
        let march = MarchStats {
            steps: 10,
            light_samples: 12,
            early_exit: true,
        };

        let mut a = FrameStats::default();
        a.record(&cloudy, &march);
        let mut b = FrameStats::default();
        b.record(&CloudSample::TRANSPARENT, &MarchStats::default());

        let total = a.combine(b);
        assert_eq!(total.pixels, 2);
        assert_eq!(total.cloudy_pixels, 1);
        assert_eq!(total.march_steps, 10);
        assert_eq!(total.light_samples, 12);
        assert_eq!(total.early_exits, 1);
        assert!((total.coverage_ratio() - 0.5).abs() < 1e-12);
        assert!((total.mean_steps_per_pixel() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_ratios() {
        let stats = FrameStats::default();
        assert_eq!(stats.coverage_ratio(), 0.0);
        assert_eq!(stats.fps(), 0.0);
    }

    #[test]
    fn test_fps() {
        let stats = FrameStats {
            frame_time_ms: 20.0,
            ..FrameStats::default()
        };
        assert!((stats.fps() - 50.0).abs() < 1e-4);
    }
}
