//! midimap - MIDI control surfaces as application events
//!
//! Knob turns and key presses become continuous values, triggers, toggles
//! and gated note pairs, with filtering, curve shaping and per-frame
//! smoothing.

pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod mapping;
pub mod smoothing;

pub use config::MapConfig;
pub use engine::Engine;
pub use error::ConfigError;
