//! Temporal smoothing for mapper outputs
//!
//! Decouples the rate at which hardware values arrive from the rate at
//! which smoothed values are emitted.

mod interpolator;

pub use interpolator::{InterpolationKind, Interpolator, SmoothingConfig};
