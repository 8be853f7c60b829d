//! # Cloud Session
//!
//! ```text
//! Startup:
//!   StratusConfig ─► validate ─► NoiseFieldGenerator::generate_all (fatal on failure)
//!                              └► ParameterStore seeded from [clouds]
//!
//! Frame N:
//!   1. snapshot()        one Arc<ParameterSet> for the whole frame
//!   2. render            tiles in parallel, volumes read-only
//!   3. RenderedFrame     pixels + stats + which parameter generation was used
//! ```
//!
//! UI edits go to [`CloudSession::settings`] at any time; they become
//! visible on the first frame after `publish()`.

use std::sync::Arc;

use glam::Vec3;
use stratus_core::{CloudResult, ParameterSet, ParameterStore, RenderConfig, StratusConfig};
use stratus_procedural::{CloudVolumes, NoiseFieldGenerator};
use stratus_rendering::camera::{DEFAULT_FAR, DEFAULT_FOV_DEGREES, DEFAULT_NEAR};
use stratus_rendering::{CameraRig, CloudFrame, CloudRenderer, FrameInputs, FrameStats};

/// Eye position of the default viewpoint.
pub const DEFAULT_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 5.0, 0.0);

/// Upward pitch of the default viewpoint, in degrees.
pub const DEFAULT_CAMERA_PITCH_DEGREES: f32 = 25.0;

/// The default viewpoint: just above the ground looking along -X, pitched up
/// so the cloud layer fills the view.
#[must_use]
pub fn default_camera(render: &RenderConfig) -> CameraRig {
    let pitch = DEFAULT_CAMERA_PITCH_DEGREES.to_radians();
    let forward = Vec3::new(-pitch.cos(), pitch.sin(), 0.0);
    CameraRig::perspective(
        DEFAULT_CAMERA_POSITION,
        forward,
        DEFAULT_FOV_DEGREES,
        render.aspect_ratio(),
        DEFAULT_NEAR,
        DEFAULT_FAR,
    )
}

/// One frame's output.
#[derive(Clone, Debug)]
pub struct RenderedFrame {
    /// Premultiplied cloud pixels.
    pub frame: CloudFrame,
    /// Work and timing counters.
    pub stats: FrameStats,
    /// Parameter generation the frame was rendered with.
    pub generation: u64,
}

/// A running cloud renderer: volumes, renderer, and live parameters.
#[derive(Debug)]
pub struct CloudSession {
    config: StratusConfig,
    renderer: CloudRenderer,
    store: ParameterStore,
}

impl CloudSession {
    /// Validates `config` and generates the noise volumes.
    ///
    /// # Errors
    ///
    /// Returns a config validation error, or `VolumeAllocation` if the
    /// volumes cannot be allocated. Either way no clouds can be rendered.
    pub fn new(config: StratusConfig) -> CloudResult<Self> {
        config.validate()?;
        let volumes = NoiseFieldGenerator::new(config.noise.clone())?.generate_all()?;
        Self::with_volumes(config, Arc::new(volumes))
    }

    /// Builds a session around volumes generated elsewhere.
    ///
    /// # Errors
    ///
    /// Returns a render config validation error.
    pub fn with_volumes(config: StratusConfig, volumes: Arc<CloudVolumes>) -> CloudResult<Self> {
        let renderer = CloudRenderer::new(volumes, config.render.clone())?;
        if ParameterSet::from_settings(&config.clouds).geometry.is_degenerate() {
            tracing::warn!("Cloud layer geometry is degenerate, frames will be empty");
        }
        let store = ParameterStore::new(config.clouds);
        tracing::info!(
            "Cloud session ready: {}x{} target, seed {:#x}",
            config.render.width,
            config.render.height,
            config.noise.seed
        );
        Ok(Self {
            config,
            renderer,
            store,
        })
    }

    /// Live parameters for the UI side.
    #[must_use]
    pub fn settings(&self) -> &ParameterStore {
        &self.store
    }

    /// The startup configuration.
    #[must_use]
    pub fn config(&self) -> &StratusConfig {
        &self.config
    }

    /// The generated noise volumes.
    #[must_use]
    pub fn volumes(&self) -> &CloudVolumes {
        self.renderer.volumes()
    }

    /// Renders one frame with the currently published parameters.
    #[must_use]
    pub fn render_frame(&self, camera: &CameraRig, elapsed_time: f32) -> RenderedFrame {
        let snapshot = self.store.snapshot();
        let (frame, stats) = self.renderer.render(&FrameInputs {
            camera: *camera,
            elapsed_time,
            params: &snapshot.params,
        });
        RenderedFrame {
            frame,
            stats,
            generation: snapshot.generation,
        }
    }
}

/// Running totals over many frames.
#[derive(Clone, Debug)]
pub struct SessionStats {
    /// Frames recorded.
    pub frames_recorded: u64,
    /// Sum of frame times in milliseconds.
    pub total_ms: f64,
    /// Fastest frame in milliseconds.
    pub min_frame_ms: f64,
    /// Slowest frame in milliseconds.
    pub max_frame_ms: f64,
    /// Sum of per-frame cloud coverage ratios.
    pub coverage_sum: f64,
    /// Sum of per-frame mean steps per pixel.
    pub steps_per_pixel_sum: f64,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStats {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames_recorded: 0,
            total_ms: 0.0,
            min_frame_ms: f64::MAX,
            max_frame_ms: 0.0,
            coverage_sum: 0.0,
            steps_per_pixel_sum: 0.0,
        }
    }

    /// Records one frame.
    pub fn record(&mut self, stats: &FrameStats) {
        let ms = f64::from(stats.frame_time_ms);
        self.frames_recorded += 1;
        self.total_ms += ms;
        self.min_frame_ms = self.min_frame_ms.min(ms);
        self.max_frame_ms = self.max_frame_ms.max(ms);
        self.coverage_sum += stats.coverage_ratio();
        self.steps_per_pixel_sum += stats.mean_steps_per_pixel();
    }

    fn mean(&self, sum: f64) -> f64 {
        if self.frames_recorded == 0 {
            0.0
        } else {
            sum / self.frames_recorded as f64
        }
    }

    /// Average frame time in milliseconds.
    #[must_use]
    pub fn avg_frame_ms(&self) -> f64 {
        self.mean(self.total_ms)
    }

    /// Average frames per second.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        let avg = self.avg_frame_ms();
        if avg <= 0.0 {
            0.0
        } else {
            1000.0 / avg
        }
    }

    /// Average fraction of cloudy pixels.
    #[must_use]
    pub fn avg_coverage(&self) -> f64 {
        self.mean(self.coverage_sum)
    }

    /// Average view-ray samples per pixel.
    #[must_use]
    pub fn avg_steps_per_pixel(&self) -> f64 {
        self.mean(self.steps_per_pixel_sum)
    }

    /// Prints a summary of the statistics.
    pub fn print_summary(&self) {
        let min = if self.frames_recorded == 0 {
            0.0
        } else {
            self.min_frame_ms
        };
        println!("╔══════════════════════════════════════════════════════════════════╗");
        println!("║                    FRAME STATISTICS SUMMARY                      ║");
        println!("╚══════════════════════════════════════════════════════════════════╝");
        println!();
        println!("┌─ TIMING ─────────────────────────────────────────────────────────┐");
        println!("│ Frames Recorded:    {}", self.frames_recorded);
        println!(
            "│ Average Frame:      {:.3} ms ({:.1} FPS)",
            self.avg_frame_ms(),
            self.avg_fps()
        );
        println!("│ Min Frame:          {min:.3} ms");
        println!("│ Max Frame:          {:.3} ms", self.max_frame_ms);
        println!("└──────────────────────────────────────────────────────────────────┘");
        println!();
        println!("┌─ CLOUDS ─────────────────────────────────────────────────────────┐");
        println!("│ Cloudy Pixels:      {:.1}%", self.avg_coverage() * 100.0);
        println!("│ Steps / Pixel:      {:.1}", self.avg_steps_per_pixel());
        println!("└──────────────────────────────────────────────────────────────────┘");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera_looks_up_and_west() {
        let camera = default_camera(&RenderConfig::default());
        let ray = camera.ray_for_pixel(640, 360, 1280, 720);
        assert!(ray.direction.x < -0.8);
        assert!(ray.direction.y > 0.3);
        assert_eq!(ray.origin, DEFAULT_CAMERA_POSITION);
    }

    #[test]
    fn test_session_stats_means() {
        let mut totals = SessionStats::new();
        assert_eq!(totals.avg_fps(), 0.0);
        for ms in [10.0, 30.0] {
            totals.record(&FrameStats {
                pixels: 4,
                cloudy_pixels: 2,
                march_steps: 40,
                frame_time_ms: ms,
                ..FrameStats::default()
            });
        }
        assert!((totals.avg_frame_ms() - 20.0).abs() < 1e-9);
        assert!((totals.avg_fps() - 50.0).abs() < 1e-9);
        assert_eq!(totals.min_frame_ms, 10.0);
        assert_eq!(totals.max_frame_ms, 30.0);
        assert!((totals.avg_coverage() - 0.5).abs() < 1e-12);
        assert!((totals.avg_steps_per_pixel() - 10.0).abs() < 1e-12);
    }
}
