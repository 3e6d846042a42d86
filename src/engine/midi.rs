//! MIDI input for midimap.
//!
//! Decodes raw channel messages from a hardware port and hands them to the
//! host thread, where they are broadcast on the [`MidiBus`].

use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::{anyhow, Result};
use midir::{Ignore, MidiInput, MidiInputConnection};

use super::MidiBus;

/// Channel messages a mapper can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note on: channel (0-15), note (0-127), velocity (1-127)
    NoteOn(u8, u8, u8),
    /// Note off: channel (0-15), note (0-127)
    NoteOff(u8, u8),
    /// Control change: channel (0-15), controller (0-127), value (0-127)
    ControlChange(u8, u8, u8),
}

impl MidiMessage {
    /// Decode raw MIDI bytes. Anything but note and CC messages is `None`.
    ///
    /// A note-on with velocity 0 is a note-off.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        let channel = status & 0x0F;

        match (status & 0xF0, data) {
            (0x80, [note, _, ..]) => Some(MidiMessage::NoteOff(channel, note & 0x7F)),
            (0x90, [note, 0, ..]) => Some(MidiMessage::NoteOff(channel, note & 0x7F)),
            (0x90, [note, velocity, ..]) => {
                Some(MidiMessage::NoteOn(channel, note & 0x7F, velocity & 0x7F))
            }
            (0xB0, [controller, value, ..]) => Some(MidiMessage::ControlChange(
                channel,
                controller & 0x7F,
                value & 0x7F,
            )),
            _ => None,
        }
    }

    /// Broadcast on a bus with values normalized to 0.0-1.0.
    pub fn dispatch(&self, bus: &MidiBus) {
        match *self {
            MidiMessage::NoteOn(ch, note, vel) => bus.note_on(ch, note, normalize(vel)),
            MidiMessage::NoteOff(ch, note) => bus.note_off(ch, note),
            MidiMessage::ControlChange(ch, ctrl, val) => bus.knob(ch, ctrl, normalize(val)),
        }
    }
}

fn normalize(value: u8) -> f32 {
    f32::from(value.min(127)) / 127.0
}

/// An open MIDI input port.
///
/// Messages arrive on midir's thread and are queued until the host loop
/// drains them with [`InputPort::drain`]. Dropping the port closes it.
pub struct InputPort {
    _connection: MidiInputConnection<()>,
    receiver: Receiver<MidiMessage>,
    name: String,
}

impl InputPort {
    /// Connect to the first port whose name contains `port_name`, or the
    /// first port if none is given.
    pub fn open(port_name: Option<&str>) -> Result<Self> {
        let mut midi_in = MidiInput::new("midimap input")?;
        midi_in.ignore(Ignore::All);
        let ports = midi_in.ports();

        if ports.is_empty() {
            return Err(anyhow!("No MIDI input ports available"));
        }

        let port = if let Some(name) = port_name {
            ports
                .iter()
                .find(|p| {
                    midi_in
                        .port_name(p)
                        .map(|n| n.contains(name))
                        .unwrap_or(false)
                })
                .ok_or_else(|| anyhow!("MIDI port '{}' not found", name))?
                .clone()
        } else {
            ports[0].clone()
        };

        let name = midi_in.port_name(&port)?;
        let (sender, receiver): (Sender<MidiMessage>, _) = mpsc::channel();

        let connection = midi_in
            .connect(
                &port,
                "midimap-input",
                move |_stamp, bytes, _| {
                    if let Some(message) = MidiMessage::parse(bytes) {
                        let _ = sender.send(message);
                    }
                },
                (),
            )
            .map_err(|e| anyhow!("Failed to connect to '{}': {}", name, e))?;

        tracing::debug!("MIDI input connected to: {}", name);

        Ok(Self {
            _connection: connection,
            receiver,
            name,
        })
    }

    /// Name of the connected port.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Take every message received since the last call.
    pub fn drain(&self) -> Vec<MidiMessage> {
        self.receiver.try_iter().collect()
    }
}

/// List available MIDI input ports.
pub fn list_input_ports() -> Result<Vec<String>> {
    let midi_in = MidiInput::new("midimap list")?;
    let ports = midi_in.ports();

    let names: Vec<String> = ports
        .iter()
        .filter_map(|p| midi_in.port_name(p).ok())
        .collect();

    Ok(names)
}
