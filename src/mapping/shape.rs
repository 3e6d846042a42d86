//! Value shaping
//!
//! Curve evaluation followed by a linear remap to output bounds, plus the
//! velocity-offset remap used by note mappers. No state.

use super::ResponseCurve;

/// Linear interpolation from `a` to `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Apply `curve` to a normalized input and remap the result to `low..high`
///
/// The bounds may be inverted (`low > high`) to flip the control.
pub fn shape(raw: f32, curve: &ResponseCurve, low: f32, high: f32) -> f32 {
    lerp(low, high, curve.evaluate(raw))
}

/// Remap a velocity so `offset = 0` keeps it and `offset = 1` pins it to 1
pub fn velocity_shape(velocity: f32, offset: f32) -> f32 {
    lerp(offset, 1.0, velocity)
}
