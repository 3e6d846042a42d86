//! Mapping system for shaping hardware values
//!
//! Source filtering, response curves and the output remap shared by the
//! knob and note mappers.

mod curve;
mod filter;
mod shape;

pub use curve::{ResponseCurve, MAX_EXPONENTIAL_FACTOR};
pub use filter::{Channel, Identity, NoteFilter, NoteName, SourceAddress};
pub use shape::{lerp, shape, velocity_shape};
