//! Note event mapper
//!
//! Turns note-on/note-off messages into triggers, gates, toggles or a
//! smoothed value. Gate mode tracks the sounding note and, in mono voice
//! mode, steals it when another note arrives.

use super::Signal;
use crate::config::{NoteConfig, NoteMode, VoiceMode};
use crate::engine::MidiListener;
use crate::error::Result;
use crate::mapping::{velocity_shape, SourceAddress};
use crate::smoothing::Interpolator;

/// Output sinks of a note mapper
#[derive(Debug, Default)]
pub struct NoteOutputs {
    /// Trigger mode output, with shaped velocity
    pub trigger: Signal<f32>,
    /// Gate mode note-on, with note number and shaped velocity
    pub note_on: Signal<(u8, f32)>,
    /// Gate mode note-off, with note number
    pub note_off: Signal<u8>,
    /// Toggle mode output when switching on
    pub toggle_on: Signal<()>,
    /// Toggle mode output when switching off
    pub toggle_off: Signal<()>,
    /// Value mode output, every frame
    pub value: Signal<f32>,
}

#[derive(Debug)]
enum Behavior {
    Trigger,
    Gate {
        voice: VoiceMode,
        sounding: Option<u8>,
    },
    Toggle {
        state: bool,
    },
    Value {
        off_value: f32,
        on_value: f32,
        value: Interpolator,
    },
}

/// Note event mapper
#[derive(Debug)]
pub struct NoteMapper {
    address: SourceAddress,
    velocity_offset: f32,
    behavior: Behavior,
    debug_input: bool,
    outputs: NoteOutputs,
}

impl NoteMapper {
    /// Build a mapper from validated settings
    pub fn new(config: &NoteConfig) -> Result<Self> {
        config.validate()?;

        let behavior = match config.mode {
            NoteMode::Trigger => Behavior::Trigger,
            NoteMode::Gate { voice } => Behavior::Gate {
                voice,
                sounding: None,
            },
            NoteMode::Toggle => Behavior::Toggle { state: false },
            NoteMode::Value {
                off_value,
                on_value,
                smoothing,
            } => Behavior::Value {
                off_value,
                on_value,
                value: Interpolator::new(off_value, smoothing),
            },
        };

        Ok(Self {
            address: config.address(),
            velocity_offset: config.velocity_offset,
            behavior,
            debug_input: false,
            outputs: NoteOutputs::default(),
        })
    }

    /// Get the source address
    pub fn address(&self) -> &SourceAddress {
        &self.address
    }

    /// Get the output sinks
    pub fn outputs(&self) -> &NoteOutputs {
        &self.outputs
    }

    /// Get the output sinks for connecting listeners
    pub fn outputs_mut(&mut self) -> &mut NoteOutputs {
        &mut self.outputs
    }

    /// Note currently held in gate mode
    pub fn sounding_note(&self) -> Option<u8> {
        match self.behavior {
            Behavior::Gate { sounding, .. } => sounding,
            _ => None,
        }
    }

    /// Toggle state, in toggle mode
    pub fn toggle_state(&self) -> Option<bool> {
        match self.behavior {
            Behavior::Toggle { state } => Some(state),
            _ => None,
        }
    }

    /// Current smoothed output, in value mode
    pub fn current_value(&self) -> Option<f32> {
        match &self.behavior {
            Behavior::Value { value, .. } => Some(value.current()),
            _ => None,
        }
    }

    /// Whether the debug key is held
    pub fn debug_input(&self) -> bool {
        self.debug_input
    }

    /// Press or release a debug key that passes this mapper's filter
    pub fn set_debug_input(&mut self, on: bool) {
        if on == self.debug_input {
            return;
        }
        self.debug_input = on;

        let note = self.address.identity.representative_note();
        if on {
            self.press(note, 1.0);
        } else {
            self.release(note);
        }
    }

    /// Handle a note-on message; ignored unless it matches the address
    pub fn note_on(&mut self, channel: u8, note: u8, velocity: f32) {
        if self.address.matches(channel, note) {
            self.press(note, velocity);
        }
    }

    /// Handle a note-off message; ignored unless it matches the address
    pub fn note_off(&mut self, channel: u8, note: u8) {
        if self.address.matches(channel, note) {
            self.release(note);
        }
    }

    /// Process a note-on that already passed the filter
    pub fn press(&mut self, note: u8, velocity: f32) {
        let velocity = velocity_shape(velocity, self.velocity_offset);

        match &mut self.behavior {
            Behavior::Trigger => self.outputs.trigger.emit(velocity),
            Behavior::Gate { voice, sounding } => {
                if *voice == VoiceMode::Mono {
                    if let Some(previous) = *sounding {
                        if previous != note {
                            self.outputs.note_off.emit(previous);
                        }
                    }
                }
                self.outputs.note_on.emit((note, velocity));
                *sounding = Some(note);
            }
            Behavior::Toggle { state } => {
                *state = !*state;
                if *state {
                    self.outputs.toggle_on.emit(());
                } else {
                    self.outputs.toggle_off.emit(());
                }
            }
            Behavior::Value {
                on_value, value, ..
            } => value.set_target(*on_value * velocity),
        }
    }

    /// Process a note-off that already passed the filter
    pub fn release(&mut self, note: u8) {
        match &mut self.behavior {
            Behavior::Gate { voice, sounding } => {
                // Under mono, an off for a stolen or unknown note is stale
                if *voice == VoiceMode::Poly || *sounding == Some(note) {
                    self.outputs.note_off.emit(note);
                    *sounding = None;
                }
            }
            Behavior::Value {
                off_value, value, ..
            } => value.set_target(*off_value),
            Behavior::Trigger | Behavior::Toggle { .. } => {}
        }
    }

    /// Per-frame update; only value mode emits here
    pub fn tick(&mut self, dt: f32) {
        if let Behavior::Value { value, .. } = &mut self.behavior {
            let stepped = value.step(dt);
            self.outputs.value.emit(stepped);
        }
    }
}

impl MidiListener for NoteMapper {
    fn on_note_on(&mut self, channel: u8, note: u8, velocity: f32) {
        self.note_on(channel, note, velocity);
    }

    fn on_note_off(&mut self, channel: u8, note: u8) {
        self.note_off(channel, note);
    }
}
