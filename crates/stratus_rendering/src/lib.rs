//! # STRATUS Rendering
//!
//! Volumetric cloud raymarching on the CPU, tiled across all cores.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PER-PIXEL PIPELINE                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CameraRig → Ray → CloudLayerGeometry::march_interval       │
//! │       ↓                                                      │
//! │  RaymarchIntegrator ──► DensitySampler (shape/detail/curl)   │
//! │       ↓                        ↓                             │
//! │  Scattering (HG phase, Beer-Lambert) → CloudSample           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! - One `ParameterSet` per frame, never re-read mid-frame
//! - Pixels share nothing mutable
//! - No allocations per pixel

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod camera;
pub mod density;
pub mod raymarch;
pub mod renderer;
pub mod scattering;
pub mod stats;

pub use camera::CameraRig;
pub use density::DensitySampler;
pub use raymarch::{CloudSample, MarchSample, MarchStats, RaymarchIntegrator};
pub use renderer::{interleaved_gradient_noise, CloudFrame, CloudRenderer, FrameInputs};
pub use stats::FrameStats;
