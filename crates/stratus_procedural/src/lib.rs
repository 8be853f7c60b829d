//! # STRATUS Procedural Generation
//!
//! The Noise Field Generator: tileable 3D noise baked into volumes once at
//! startup.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same config always produces the same volumes
//! 2. **Tileable**: Every field wraps across the unit cube
//! 3. **Parallel**: Voxels are generated per Z-slice with rayon
//! 4. **Immutable**: Volumes are read-only once their mips exist
//!
//! ## Core Components
//!
//! - `TileablePerlin`: seeded gradient noise with wrapping lattice
//! - `WorleyGrid`: jittered-grid cellular noise, inverted
//! - `CurlField`: divergence-free turbulence vectors
//! - `NoiseVolume`: 4-channel 3D texture with mip chain
//! - `NoiseFieldGenerator`: builds `CloudVolumes { shape, detail, curl }`
//!
//! ## Example
//!
//! ```rust,ignore
//! use stratus_core::NoiseConfig;
//! use stratus_procedural::NoiseFieldGenerator;
//!
//! let generator = NoiseFieldGenerator::new(NoiseConfig::default())?;
//! let volumes = generator.generate_all()?;
//! assert_eq!(volumes.shape.resolution(), 128);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod curl;
pub mod generator;
pub mod perlin;
pub mod seed;
pub mod volume;
pub mod worley;

pub use curl::{decode_curl, CurlField};
pub use generator::{CloudVolumes, NoiseFieldGenerator};
pub use perlin::TileablePerlin;
pub use seed::NoiseSeed;
pub use volume::{NoiseVolume, Texel};
pub use worley::WorleyGrid;
