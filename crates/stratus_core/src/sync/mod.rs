//! # UI -> Render Parameter Hand-off
//!
//! ## The Problem
//!
//! ```text
//! UI thread:      edits sliders at any moment
//! Render workers: read parameters for every sample of every pixel
//!
//! Shared mutable record:  a frame can mix old and new values (tearing)
//! Lock per read:          millions of lock acquisitions per frame
//! ```
//!
//! ## The Solution: Double Buffering
//!
//! ```text
//! UI edits    -> write buffer (CloudSettings)
//! publish()   -> derive ParameterSet, swap Arc into read buffer
//! Frame start -> snapshot(): clone the Arc once
//! Frame work  -> every pixel reads the same immutable snapshot
//! ```
//!
//! One lock per frame on the render side, none per sample.

mod parameter_store;

pub use parameter_store::{ParameterSnapshot, ParameterStore};
