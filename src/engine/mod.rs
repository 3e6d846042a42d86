//! Host engine for midimap
//!
//! Owns the event bus and the mappers subscribed to it, and drives the
//! per-frame update. Hardware events for a frame are dispatched first,
//! then every mapper is ticked.

mod bus;
mod log;
mod midi;
mod script;

pub use bus::{MidiBus, MidiListener, Subscription};
pub use log::{Emission, EventLog, OutputEvent};
pub use midi::{list_input_ports, InputPort, MidiMessage};
pub use script::{Script, Step};

use crate::config::MapConfig;
use crate::error::Result;
use crate::input::{KnobMapper, Mapper, NoteMapper};
use std::cell::{RefCell, RefMut};
use std::rc::Rc;

/// A mapper and its bus subscription
struct Binding {
    name: String,
    mapper: Rc<RefCell<Mapper>>,
    subscription: Option<Subscription>,
}

impl Binding {
    fn activate(&mut self, bus: &MidiBus) {
        if self.subscription.is_none() {
            let listener: Rc<RefCell<dyn MidiListener>> = self.mapper.clone();
            self.subscription = Some(bus.subscribe(&listener));
            tracing::debug!("Activated mapper '{}'", self.name);
        }
    }

    fn deactivate(&mut self) {
        if self.subscription.take().is_some() {
            tracing::debug!("Deactivated mapper '{}'", self.name);
        }
    }
}

/// The host engine
pub struct Engine {
    bus: MidiBus,
    bindings: Vec<Binding>,
    frame: u64,
}

impl Engine {
    /// Create an engine with no mappers
    pub fn new() -> Self {
        Self {
            bus: MidiBus::new(),
            bindings: Vec::new(),
            frame: 0,
        }
    }

    /// Build and activate every mapper in a configuration
    pub fn from_config(config: &MapConfig) -> Result<Self> {
        config.validate()?;
        let mut engine = Self::new();

        for knob in &config.knobs {
            engine.add(&knob.name, KnobMapper::new(knob)?);
        }
        for note in &config.notes {
            engine.add(&note.name, NoteMapper::new(note)?);
        }

        tracing::info!(
            "Engine ready: {} knob mappers, {} note mappers",
            config.knobs.len(),
            config.notes.len()
        );
        Ok(engine)
    }

    /// Add a mapper and subscribe it to the bus; returns its index
    pub fn add(&mut self, name: &str, mapper: impl Into<Mapper>) -> usize {
        let mut binding = Binding {
            name: name.to_string(),
            mapper: Rc::new(RefCell::new(mapper.into())),
            subscription: None,
        };
        binding.activate(&self.bus);
        self.bindings.push(binding);
        self.bindings.len() - 1
    }

    /// Get the event bus
    pub fn bus(&self) -> &MidiBus {
        &self.bus
    }

    /// Number of mappers
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if the engine has no mappers
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Index of the mapper with the given name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.bindings.iter().position(|b| b.name == name)
    }

    /// Name of the mapper at `index`
    pub fn name(&self, index: usize) -> Option<&str> {
        self.bindings.get(index).map(|b| b.name.as_str())
    }

    /// Borrow the mapper at `index`
    pub fn mapper(&self, index: usize) -> Option<RefMut<'_, Mapper>> {
        self.bindings.get(index).map(|b| b.mapper.borrow_mut())
    }

    /// Resume receiving hardware events; no-op if already active
    pub fn activate(&mut self, index: usize) {
        if let Some(binding) = self.bindings.get_mut(index) {
            binding.activate(&self.bus);
        }
    }

    /// Stop receiving hardware events; no-op if already inactive
    pub fn deactivate(&mut self, index: usize) {
        if let Some(binding) = self.bindings.get_mut(index) {
            binding.deactivate();
        }
    }

    /// Check if the mapper at `index` is subscribed
    pub fn is_active(&self, index: usize) -> bool {
        self.bindings
            .get(index)
            .map(|b| b.subscription.is_some())
            .unwrap_or(false)
    }

    /// Connect `log` to every mapper's sinks
    pub fn attach_log(&self, log: &EventLog) {
        for binding in &self.bindings {
            log.attach(&binding.name, &mut binding.mapper.borrow_mut());
        }
    }

    /// Broadcast a hardware message to the active mappers
    pub fn dispatch(&self, message: MidiMessage) {
        message.dispatch(&self.bus);
    }

    /// Finish the current frame: tick every active mapper by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        for binding in self.bindings.iter().filter(|b| b.subscription.is_some()) {
            binding.mapper.borrow_mut().tick(dt);
        }
        self.frame += 1;
    }

    /// Number of frames ticked so far
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KnobConfig, KnobMode, NoteConfig, NoteMode, VoiceMode};
    use crate::mapping::{Channel, NoteFilter, ResponseCurve};
    use crate::smoothing::SmoothingConfig;

    const FRAME: f32 = 1.0 / 60.0;

    fn test_config() -> MapConfig {
        MapConfig {
            host: Default::default(),
            knobs: vec![KnobConfig {
                name: "level".to_string(),
                channel: Channel::All,
                knob: 7,
                curve: ResponseCurve::Linear,
                mode: KnobMode::Value {
                    low: 0.0,
                    high: 10.0,
                    smoothing: SmoothingConfig::default(),
                },
            }],
            notes: vec![NoteConfig {
                name: "lead".to_string(),
                channel: Channel::All,
                filter: NoteFilter::Off,
                velocity_offset: 0.0,
                mode: NoteMode::Gate {
                    voice: VoiceMode::Mono,
                },
            }],
        }
    }

    #[test]
    fn test_engine_from_config() {
        let engine = Engine::from_config(&test_config()).unwrap();

        assert_eq!(engine.len(), 2);
        assert_eq!(engine.bus().listener_count(), 2);
        assert_eq!(engine.find("lead"), Some(1));
        assert_eq!(engine.name(0), Some("level"));
        assert!(engine.is_active(0));
    }

    #[test]
    fn test_engine_routes_messages() {
        let engine = Engine::from_config(&test_config()).unwrap();
        let log = EventLog::new();
        engine.attach_log(&log);

        engine.dispatch(MidiMessage::ControlChange(0, 7, 127));
        engine.dispatch(MidiMessage::NoteOn(0, 60, 127));

        let events: Vec<_> = log.drain().into_iter().map(|e| (e.mapper, e.event)).collect();
        assert_eq!(
            events,
            vec![
                ("level".to_string(), OutputEvent::Value { value: 10.0 }),
                (
                    "lead".to_string(),
                    OutputEvent::NoteOn {
                        note: 60,
                        velocity: 1.0
                    }
                ),
            ]
        );
    }

    #[test]
    fn test_activation_is_idempotent_and_symmetric() {
        let mut engine = Engine::from_config(&test_config()).unwrap();
        let log = EventLog::new();
        engine.attach_log(&log);

        engine.activate(0);
        assert_eq!(engine.bus().listener_count(), 2);

        engine.deactivate(0);
        engine.deactivate(0);
        assert!(!engine.is_active(0));
        assert_eq!(engine.bus().listener_count(), 1);

        engine.dispatch(MidiMessage::ControlChange(0, 7, 127));
        assert!(log.is_empty());

        engine.activate(0);
        engine.dispatch(MidiMessage::ControlChange(0, 7, 127));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_inactive_mapper_is_not_ticked() {
        let mut engine = Engine::new();
        let swell = engine.add(
            "swell",
            NoteMapper::new(&NoteConfig {
                name: "swell".to_string(),
                channel: Channel::All,
                filter: NoteFilter::Off,
                velocity_offset: 0.0,
                mode: NoteMode::Value {
                    off_value: 0.0,
                    on_value: 1.0,
                    smoothing: SmoothingConfig::exponential(10.0),
                },
            })
            .unwrap(),
        );
        let log = EventLog::new();
        engine.attach_log(&log);

        engine.tick(FRAME);
        assert_eq!(log.drain().len(), 1);

        engine.deactivate(swell);
        engine.tick(FRAME);
        engine.tick(FRAME);
        assert!(log.is_empty());
        assert_eq!(engine.frame(), 3);

        engine.activate(swell);
        engine.tick(FRAME);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_dropping_engine_releases_subscriptions() {
        let engine = Engine::from_config(&test_config()).unwrap();
        let bus = engine.bus().clone();
        assert_eq!(bus.listener_count(), 2);

        drop(engine);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_tick_counts_frames() {
        let mut engine = Engine::new();
        engine.tick(FRAME);
        engine.tick(FRAME);
        assert_eq!(engine.frame(), 2);
    }

    #[test]
    fn test_mapper_access() {
        let engine = Engine::from_config(&test_config()).unwrap();
        engine.dispatch(MidiMessage::NoteOn(0, 64, 100));

        let mut mapper = engine.mapper(1).unwrap();
        let note = mapper.as_note_mut().unwrap();
        assert_eq!(note.sounding_note(), Some(64));
    }
}
