//! # STRATUS Headless
//!
//! Generates the noise volumes, renders a run of frames with no window, and
//! prints a timing and coverage report.
//!
//! ```bash
//! stratus_headless --config clouds.toml --frames 120 --width 640 --height 360
//! ```

use std::process;
use std::str::FromStr;

use stratus::core::{CloudError, CloudResult, StratusConfig};
use stratus::{default_camera, CloudSession, SessionStats};

const DEFAULT_FRAMES: u32 = 30;
const DEFAULT_TIME_STEP: f32 = 1.0 / 60.0;

fn print_usage() {
    println!("Usage: stratus_headless [options]");
    println!();
    println!("Options:");
    println!("  --config <path>     TOML config ([noise], [clouds], [render])");
    println!("  --width <px>        Override render width");
    println!("  --height <px>       Override render height");
    println!("  --frames <n>        Frames to render (default {DEFAULT_FRAMES})");
    println!("  --time-step <s>     Simulated seconds per frame (default 1/60)");
    println!("  --help              Show this message");
}

/// Value following `flag`, or `None` if the flag is absent.
///
/// A flag with a missing or unparsable value is an error rather than a
/// silent fallback to the default.
fn flag_value<T: FromStr>(args: &[String], flag: &str) -> CloudResult<Option<T>> {
    let Some(index) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    let raw = args
        .get(index + 1)
        .filter(|value| !value.starts_with("--"))
        .ok_or_else(|| CloudError::InvalidConfig(format!("{flag} expects a value")))?;
    raw.parse()
        .map(Some)
        .map_err(|_| CloudError::InvalidConfig(format!("invalid value for {flag}: {raw:?}")))
}

fn load_config(args: &[String]) -> CloudResult<StratusConfig> {
    let mut config = match flag_value::<String>(args, "--config")? {
        Some(path) => {
            println!("Loading config: {path}");
            StratusConfig::load(path)?
        }
        None => StratusConfig::default(),
    };
    if let Some(width) = flag_value(args, "--width")? {
        config.render.width = width;
    }
    if let Some(height) = flag_value(args, "--height")? {
        config.render.height = height;
    }
    Ok(config)
}

fn run(args: &[String]) -> CloudResult<()> {
    let config = load_config(args)?;
    let frames: u32 = flag_value(args, "--frames")?.unwrap_or(DEFAULT_FRAMES);
    let time_step: f32 = flag_value(args, "--time-step")?.unwrap_or(DEFAULT_TIME_STEP);

    println!("Generating noise volumes (seed {:#x})...", config.noise.seed);
    let session = CloudSession::new(config)?;
    let volumes = session.volumes();

    println!();
    println!("┌─ VOLUMES ────────────────────────────────────────────────────────┐");
    for (name, volume) in [
        ("Shape", &volumes.shape),
        ("Detail", &volumes.detail),
        ("Curl", &volumes.curl),
    ] {
        println!(
            "│ {name:<8} {:>4}³  {} mips  {:>8.2} MB",
            volume.resolution(),
            volume.mip_count(),
            volume.size_bytes() as f64 / (1024.0 * 1024.0)
        );
    }
    println!(
        "│ Total:            {:.2} MB",
        volumes.size_bytes() as f64 / (1024.0 * 1024.0)
    );
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    let render = &session.config().render;
    let camera = default_camera(render);
    println!(
        "Rendering {frames} frames at {}x{} ({} px)...",
        render.width,
        render.height,
        render.pixel_count()
    );
    println!();

    let mut totals = SessionStats::new();
    for frame in 0..frames {
        session.settings().publish_if_dirty();
        let rendered = session.render_frame(&camera, frame as f32 * time_step);
        totals.record(&rendered.stats);
        println!(
            "  frame {frame:>4}: {:>8.2} ms  {:>5.1}% cloudy  {:>6.1} steps/px  alpha {:.3}",
            rendered.stats.frame_time_ms,
            rendered.stats.coverage_ratio() * 100.0,
            rendered.stats.mean_steps_per_pixel(),
            rendered.frame.mean_alpha()
        );
    }

    println!();
    totals.print_summary();
    Ok(())
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init()
        .ok();

    println!("═══════════════════════════════════════════════════════════════════");
    println!("                    STRATUS HEADLESS v0.1.0");
    println!("                  VOLUMETRIC CLOUDS, NO WINDOW");
    println!("═══════════════════════════════════════════════════════════════════");
    println!();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help") {
        print_usage();
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        eprintln!("Run with --help for usage.");
        process::exit(1);
    }
}
