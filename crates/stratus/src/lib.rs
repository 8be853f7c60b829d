//! # STRATUS
//!
//! Real-time volumetric clouds on the CPU.
//!
//! ## Crates
//!
//! ```text
//! stratus_core        parameters, layer geometry, config, errors, double buffer
//!      ↓
//! stratus_procedural  tileable Perlin/Worley/curl volumes with mips
//!      ↓
//! stratus_rendering   density, scattering, raymarch, tiled frames
//!      ↓
//! stratus             CloudSession + stratus_headless
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use stratus::{default_camera, CloudSession};
//! use stratus::core::StratusConfig;
//!
//! let session = CloudSession::new(StratusConfig::default())?;
//! let camera = default_camera(&session.config().render);
//! session.settings().edit(|s| s.cloud_coverage = 0.6);
//! session.settings().publish();
//! let rendered = session.render_frame(&camera, 0.0);
//! assert_eq!(rendered.generation, 1);
//! # Ok::<(), stratus::core::CloudError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod session;

pub use session::{default_camera, CloudSession, RenderedFrame, SessionStats};

// Re-export sub-crates
pub use stratus_core as core;
pub use stratus_procedural as procedural;
pub use stratus_rendering as rendering;
