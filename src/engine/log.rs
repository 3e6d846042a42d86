//! Emission log
//!
//! Connects to every sink of a mapper and records what it emits, tagged
//! with the mapper name and the frame it happened in.

use crate::input::Mapper;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// One output event
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OutputEvent {
    Value { value: f32 },
    Trigger,
    TriggerVelocity { velocity: f32 },
    ToggleOn,
    ToggleOff,
    NoteOn { note: u8, velocity: f32 },
    NoteOff { note: u8 },
}

/// An output event and where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Emission {
    pub frame: u64,
    pub mapper: String,
    #[serde(flatten)]
    pub event: OutputEvent,
}

#[derive(Debug, Default)]
struct Inner {
    frame: Cell<u64>,
    entries: RefCell<Vec<Emission>>,
}

/// Shared, append-only record of emissions
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    inner: Rc<Inner>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the frame number stamped on new entries
    pub fn set_frame(&self, frame: u64) {
        self.inner.frame.set(frame);
    }

    /// Connect to every sink of `mapper`
    pub fn attach(&self, name: &str, mapper: &mut Mapper) {
        match mapper {
            Mapper::Knob(knob) => {
                let outputs = knob.outputs_mut();
                outputs.value.connect(self.sink(name, |value: f32| OutputEvent::Value { value }));
                outputs.trigger.connect(self.sink(name, |_: ()| OutputEvent::Trigger));
                outputs.toggle_on.connect(self.sink(name, |_: ()| OutputEvent::ToggleOn));
                outputs.toggle_off.connect(self.sink(name, |_: ()| OutputEvent::ToggleOff));
            }
            Mapper::Note(note) => {
                let outputs = note.outputs_mut();
                outputs.trigger.connect(
                    self.sink(name, |velocity: f32| OutputEvent::TriggerVelocity { velocity }),
                );
                outputs.note_on.connect(
                    self.sink(name, |(note, velocity): (u8, f32)| {
                        OutputEvent::NoteOn { note, velocity }
                    }),
                );
                outputs.note_off.connect(self.sink(name, |note: u8| OutputEvent::NoteOff { note }));
                outputs.toggle_on.connect(self.sink(name, |_: ()| OutputEvent::ToggleOn));
                outputs.toggle_off.connect(self.sink(name, |_: ()| OutputEvent::ToggleOff));
                outputs.value.connect(self.sink(name, |value: f32| OutputEvent::Value { value }));
            }
        }
    }

    fn sink<T, F>(&self, name: &str, to_event: F) -> impl FnMut(T) + 'static
    where
        T: 'static,
        F: Fn(T) -> OutputEvent + 'static,
    {
        let inner = Rc::clone(&self.inner);
        let mapper = name.to_string();
        move |payload| {
            let emission = Emission {
                frame: inner.frame.get(),
                mapper: mapper.clone(),
                event: to_event(payload),
            };
            inner.entries.borrow_mut().push(emission);
        }
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.inner.entries.borrow().is_empty()
    }

    /// Copy of every entry
    pub fn entries(&self) -> Vec<Emission> {
        self.inner.entries.borrow().clone()
    }

    /// Remove and return every entry
    pub fn drain(&self) -> Vec<Emission> {
        std::mem::take(&mut *self.inner.entries.borrow_mut())
    }
}
