//! Configuration errors
//!
//! Everything here is detected once, when a mapper is built or a
//! configuration file is validated. The event path never fails.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Curve needs at least two points, got {0}")]
    CurveTooFewPoints(usize),

    #[error("Curve points must start at x = 0 and end at x = 1")]
    CurveEndpoints,

    #[error("Curve x values must be strictly increasing (point {0})")]
    CurveNotIncreasing(usize),

    #[error("Curve is not monotonic (point {0})")]
    CurveNotMonotonic(usize),

    #[error("Curve output must stay within 0..=1 (point {0})")]
    CurveOutOfRange(usize),

    #[error("Curve parameter must be finite and positive, got {0}")]
    CurveParameter(f32),

    #[error("Exponential curve factor {0} is too large (at most 80)")]
    CurveFactorTooLarge(f32),

    #[error("Note range is inverted: lowest {low} > highest {high}")]
    NoteRangeInverted { low: u8, high: u8 },

    #[error("Note number {0} is outside 0..=127")]
    NoteOutOfRange(u8),

    #[error("Controller number {0} is outside 0..=127")]
    ControllerOutOfRange(u8),

    #[error("MIDI channel {0} is outside 0..=15")]
    ChannelOutOfRange(u8),

    #[error("Unknown MIDI channel '{0}' (use \"all\" or 0..=15)")]
    UnknownChannel(String),

    #[error("Velocity offset {0} is outside 0..=1")]
    VelocityOffsetOutOfRange(f32),

    #[error("Unsupported smoothing speed {0}")]
    UnsupportedSpeed(f32),

    #[error("Frame rate must be between 1 and 1000, got {0}")]
    FrameRate(f32),

    #[error("Duplicate mapper name '{0}'")]
    DuplicateName(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
