//! # STRATUS Core
//!
//! Shared types for the volumetric cloud renderer.
//!
//! ## Core Components
//!
//! - `CloudSettings`: UI-space values exactly as an operator edits them
//! - `ParameterSet`: pre-scaled, immutable snapshot consumed by one frame
//! - `CloudLayerGeometry`: inner/outer spheres bounding the cloud layer
//! - `ParameterStore`: double-buffered hand-off between UI and render work
//! - `StratusConfig`: TOML configuration (noise, clouds, render)
//!
//! ## Example
//!
//! ```rust,ignore
//! use stratus_core::{CloudSettings, ParameterStore};
//!
//! let store = ParameterStore::new(CloudSettings::default());
//! store.edit(|s| s.cloud_coverage = 0.9);
//! store.publish();
//!
//! // Render side: one snapshot per frame, never re-read mid-frame
//! let snapshot = store.snapshot();
//! assert!((snapshot.params.cloud_coverage - 0.9).abs() < 1e-6);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod geometry;
pub mod params;
pub mod sync;

pub use config::{
    max_perlin_octaves, NoiseConfig, RenderConfig, StratusConfig, MAX_NOISE_FREQUENCY,
};
pub use error::{CloudError, CloudResult};
pub use geometry::{ray_sphere, CloudLayerGeometry, MarchInterval, Ray};
pub use params::{CloudSettings, ParameterSet, MAX_NUM_STEPS, MIN_NUM_STEPS};
pub use sync::{ParameterSnapshot, ParameterStore};
