//! # Cloud Session Tests
//!
//! Startup, parameter hand-off between frames, and failure at startup.

use stratus::core::{CloudError, NoiseConfig, RenderConfig, StratusConfig};
use stratus::{default_camera, CloudSession, SessionStats};

fn small_config() -> StratusConfig {
    StratusConfig {
        noise: NoiseConfig {
            shape_resolution: 16,
            detail_resolution: 8,
            curl_resolution: 8,
            ..NoiseConfig::default()
        },
        render: RenderConfig {
            width: 16,
            height: 12,
            tile_rows: 3,
            jitter: true,
        },
        ..StratusConfig::default()
    }
}

/// Test: A new session renders generation zero from the config settings.
#[test]
fn test_first_frame_uses_config_settings() {
    let mut config = small_config();
    config.clouds.cloud_coverage = 0.0;
    let session = CloudSession::new(config).expect("session starts");
    let camera = default_camera(&session.config().render);

    let rendered = session.render_frame(&camera, 0.0);
    assert_eq!(rendered.generation, 0);
    assert_eq!(rendered.frame.width(), 16);
    assert_eq!(rendered.frame.height(), 12);
    assert_eq!(rendered.stats.pixels, 16 * 12);
    assert_eq!(rendered.stats.cloudy_pixels, 0);
}

/// Test: Edits are invisible until published, then apply on the next frame.
#[test]
fn test_edits_apply_after_publish() {
    let mut config = small_config();
    config.clouds.cloud_coverage = 0.0;
    let session = CloudSession::new(config).expect("session starts");
    let camera = default_camera(&session.config().render);

    session.settings().edit(|s| s.cloud_coverage = 1.0);
    let before = session.render_frame(&camera, 0.0);
    assert_eq!(before.generation, 0);
    assert_eq!(before.stats.cloudy_pixels, 0);

    assert_eq!(session.settings().publish(), 1);
    let after = session.render_frame(&camera, 0.0);
    assert_eq!(after.generation, 1);
    assert_eq!(session.settings().pending().cloud_coverage, 1.0);
}

/// Test: Same config, same time, same camera gives the same frame.
#[test]
fn test_sessions_are_deterministic() {
    let a = CloudSession::new(small_config()).expect("session starts");
    let b = CloudSession::new(small_config()).expect("session starts");
    let camera = default_camera(&a.config().render);

    assert_eq!(a.volumes(), b.volumes());
    assert_eq!(
        a.render_frame(&camera, 3.5).frame,
        b.render_frame(&camera, 3.5).frame
    );
}

/// Test: An invalid noise resolution aborts startup.
#[test]
fn test_invalid_config_is_fatal() {
    let mut config = small_config();
    config.noise.shape_resolution = 24;
    assert!(matches!(
        CloudSession::new(config),
        Err(CloudError::InvalidResolution { .. })
    ));
}

/// Test: Session totals track every rendered frame.
#[test]
fn test_session_stats_accumulate() {
    let session = CloudSession::new(small_config()).expect("session starts");
    let camera = default_camera(&session.config().render);
    let mut totals = SessionStats::new();
    for frame in 0..3 {
        totals.record(&session.render_frame(&camera, frame as f32).stats);
    }
    assert_eq!(totals.frames_recorded, 3);
    assert!(totals.max_frame_ms >= totals.min_frame_ms);
    assert!((0.0..=1.0).contains(&totals.avg_coverage()));
}
