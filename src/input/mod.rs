//! Hardware input mappers
//!
//! Knob and note mappers turn filtered hardware messages into application
//! events, delivered through multicast output sinks.

mod knob;
mod note;
mod signal;

pub use knob::{KnobMapper, KnobOutputs, SWITCH_THRESHOLD};
pub use note::{NoteMapper, NoteOutputs};
pub use signal::Signal;

use crate::engine::MidiListener;

/// Either kind of mapper, as held by the engine
#[derive(Debug)]
pub enum Mapper {
    Knob(KnobMapper),
    Note(NoteMapper),
}

impl Mapper {
    /// Per-frame update
    pub fn tick(&mut self, dt: f32) {
        match self {
            Mapper::Knob(knob) => knob.tick(dt),
            Mapper::Note(note) => note.tick(dt),
        }
    }

    /// Get the knob mapper, if this is one
    pub fn as_knob_mut(&mut self) -> Option<&mut KnobMapper> {
        match self {
            Mapper::Knob(knob) => Some(knob),
            Mapper::Note(_) => None,
        }
    }

    /// Get the note mapper, if this is one
    pub fn as_note_mut(&mut self) -> Option<&mut NoteMapper> {
        match self {
            Mapper::Note(note) => Some(note),
            Mapper::Knob(_) => None,
        }
    }
}

impl From<KnobMapper> for Mapper {
    fn from(mapper: KnobMapper) -> Self {
        Mapper::Knob(mapper)
    }
}

impl From<NoteMapper> for Mapper {
    fn from(mapper: NoteMapper) -> Self {
        Mapper::Note(mapper)
    }
}

impl MidiListener for Mapper {
    fn on_knob(&mut self, channel: u8, number: u8, value: f32) {
        if let Mapper::Knob(knob) = self {
            knob.knob(channel, number, value);
        }
    }

    fn on_note_on(&mut self, channel: u8, note: u8, velocity: f32) {
        if let Mapper::Note(mapper) = self {
            mapper.note_on(channel, note, velocity);
        }
    }

    fn on_note_off(&mut self, channel: u8, note: u8) {
        if let Mapper::Note(mapper) = self {
            mapper.note_off(channel, note);
        }
    }
}
