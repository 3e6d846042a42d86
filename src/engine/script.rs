//! Replay scripts
//!
//! A YAML list of hardware events and frame ticks that drives an engine
//! without a device attached.

use super::{Engine, EventLog};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One scripted action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    /// Knob moved to a normalized value
    Knob { channel: u8, number: u8, value: f32 },
    /// Key pressed with a normalized velocity
    NoteOn { channel: u8, note: u8, velocity: f32 },
    /// Key released
    NoteOff { channel: u8, note: u8 },
    /// Write a knob mapper's debug input
    DebugKnob { mapper: String, value: f32 },
    /// Press or release a note mapper's debug key
    DebugNote { mapper: String, on: bool },
    /// End one or more frames
    Tick {
        #[serde(default = "default_frames")]
        frames: u32,
    },
}

fn default_frames() -> u32 { 1 }

/// A sequence of steps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    /// Load a script from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Run every step against `engine`, stamping `log` with frame numbers.
    /// Each tick advances time by `dt` seconds.
    pub fn run(&self, engine: &mut Engine, log: &EventLog, dt: f32) -> Result<()> {
        for step in &self.steps {
            log.set_frame(engine.frame());

            match step {
                Step::Knob { channel, number, value } => {
                    engine.bus().knob(*channel, *number, *value);
                }
                Step::NoteOn { channel, note, velocity } => {
                    engine.bus().note_on(*channel, *note, *velocity);
                }
                Step::NoteOff { channel, note } => {
                    engine.bus().note_off(*channel, *note);
                }
                Step::DebugKnob { mapper, value } => {
                    let index = lookup(engine, mapper)?;
                    if let Some(mut slot) = engine.mapper(index) {
                        let knob = slot
                            .as_knob_mut()
                            .ok_or_else(|| anyhow!("'{}' is not a knob mapper", mapper))?;
                        knob.set_debug_input(*value);
                    }
                }
                Step::DebugNote { mapper, on } => {
                    let index = lookup(engine, mapper)?;
                    if let Some(mut slot) = engine.mapper(index) {
                        let note = slot
                            .as_note_mut()
                            .ok_or_else(|| anyhow!("'{}' is not a note mapper", mapper))?;
                        note.set_debug_input(*on);
                    }
                }
                Step::Tick { frames } => {
                    for _ in 0..*frames {
                        log.set_frame(engine.frame());
                        engine.tick(dt);
                    }
                }
            }
        }
        Ok(())
    }
}

fn lookup(engine: &Engine, name: &str) -> Result<usize> {
    engine
        .find(name)
        .ok_or_else(|| anyhow!("Unknown mapper '{}'", name))
}
