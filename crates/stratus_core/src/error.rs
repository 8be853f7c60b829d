//! # Cloud Error Types
//!
//! All errors that can occur while setting up or driving the cloud renderer.
//!
//! Per-pixel work never fails: a ray that misses the cloud layer is the
//! normal "no cloud here" outcome, not an error.

use thiserror::Error;

/// Errors that can occur in the cloud renderer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CloudError {
    /// Backing storage for a noise volume could not be allocated.
    ///
    /// Fatal: no clouds can be rendered without the volumes.
    #[error("failed to allocate {texels} texels for a {resolution}^3 noise volume")]
    VolumeAllocation {
        /// Edge length of the volume.
        resolution: usize,
        /// Number of texels requested (all mip levels).
        texels: usize,
    },

    /// A volume resolution is unusable (must be a power of two, at least 2).
    #[error("invalid {name} resolution {resolution}: must be a power of two >= 2")]
    InvalidResolution {
        /// Which volume the resolution belongs to.
        name: &'static str,
        /// The rejected resolution.
        resolution: usize,
    },

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("failed to read config {path}: {reason}")]
    ConfigRead {
        /// Path that was read.
        path: String,
        /// Underlying I/O failure.
        reason: String,
    },

    /// Configuration file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    ConfigParse(String),

    /// A caller-supplied buffer does not match the frame dimensions.
    #[error("buffer size mismatch: expected {expected} pixels, got {actual}")]
    BufferSizeMismatch {
        /// Pixel count required.
        expected: usize,
        /// Pixel count supplied.
        actual: usize,
    },
}

/// Result type for cloud renderer operations.
pub type CloudResult<T> = Result<T, CloudError>;
