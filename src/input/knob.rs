//! Knob event mapper
//!
//! Turns continuous controller values into value, trigger or toggle
//! events. Trigger and toggle treat the knob as a switch with a rising
//! edge at the middle of the (curved) range.

use super::Signal;
use crate::config::{KnobConfig, KnobMode};
use crate::engine::MidiListener;
use crate::error::Result;
use crate::mapping::{shape, ResponseCurve, SourceAddress};
use crate::smoothing::Interpolator;

/// Shaped input level at which a knob counts as "pressed"
pub const SWITCH_THRESHOLD: f32 = 0.5;

/// Output sinks of a knob mapper
#[derive(Debug, Default)]
pub struct KnobOutputs {
    /// Value mode output
    pub value: Signal<f32>,
    /// Trigger mode output
    pub trigger: Signal<()>,
    /// Toggle mode output when switching on
    pub toggle_on: Signal<()>,
    /// Toggle mode output when switching off
    pub toggle_off: Signal<()>,
}

/// Mode-specific settings and state, fixed at construction
#[derive(Debug)]
enum Behavior {
    Value {
        low: f32,
        high: f32,
        value: Interpolator,
    },
    Trigger,
    Toggle {
        state: bool,
    },
}

/// Knob event mapper
#[derive(Debug)]
pub struct KnobMapper {
    address: SourceAddress,
    curve: ResponseCurve,
    behavior: Behavior,
    /// Last curved input, for edge detection
    last_input: f32,
    /// Last raw input, for the debug surface
    raw_input: f32,
    outputs: KnobOutputs,
}

impl KnobMapper {
    /// Build a mapper from validated settings
    pub fn new(config: &KnobConfig) -> Result<Self> {
        config.validate()?;

        let behavior = match config.mode {
            KnobMode::Value { low, high, smoothing } => Behavior::Value {
                low,
                high,
                value: Interpolator::new(shape(0.0, &config.curve, low, high), smoothing),
            },
            KnobMode::Trigger => Behavior::Trigger,
            KnobMode::Toggle => Behavior::Toggle { state: false },
        };

        Ok(Self {
            address: config.address(),
            curve: config.curve.clone(),
            behavior,
            last_input: 0.0,
            raw_input: 0.0,
            outputs: KnobOutputs::default(),
        })
    }

    /// Get the source address
    pub fn address(&self) -> &SourceAddress {
        &self.address
    }

    /// Get the output sinks
    pub fn outputs(&self) -> &KnobOutputs {
        &self.outputs
    }

    /// Get the output sinks for connecting listeners
    pub fn outputs_mut(&mut self) -> &mut KnobOutputs {
        &mut self.outputs
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

    /// Last raw input processed
    pub fn debug_input(&self) -> f32 {
        self.raw_input
    }

    /// Inject a raw input as if the knob had moved
    pub fn set_debug_input(&mut self, value: f32) {
        self.update(value);
    }

    /// Handle a knob message; ignored unless it matches the address
    pub fn knob(&mut self, channel: u8, number: u8, value: f32) {
        if self.address.matches(channel, number) {
            self.update(value);
        }
    }

    /// Process a raw knob value that already passed the filter
    pub fn update(&mut self, raw: f32) {
        self.raw_input = raw;
        let input = self.curve.evaluate(raw);
        let previous = std::mem::replace(&mut self.last_input, input);
        let rising = previous < SWITCH_THRESHOLD && input >= SWITCH_THRESHOLD;

        match &mut self.behavior {
            Behavior::Value { low, high, value } => {
                value.set_target(shape(raw, &self.curve, *low, *high));
                if !value.config().is_enabled() {
                    let stepped = value.step(0.0);
                    self.outputs.value.emit(stepped);
                }
            }
            Behavior::Trigger => {
                if rising {
                    self.outputs.trigger.emit(());
                }
            }
            Behavior::Toggle { state } => {
                if rising {
                    *state = !*state;
                    if *state {
                        self.outputs.toggle_on.emit(());
                    } else {
                        self.outputs.toggle_off.emit(());
                    }
                }
            }
        }
    }

    /// Per-frame update; only smoothed value mode emits here
    pub fn tick(&mut self, dt: f32) {
        if let Behavior::Value { value, .. } = &mut self.behavior {
            if value.config().is_enabled() {
                let stepped = value.step(dt);
                self.outputs.value.emit(stepped);
            }
        }
    }
}

impl MidiListener for KnobMapper {
    fn on_knob(&mut self, channel: u8, number: u8, value: f32) {
        self.knob(channel, number, value);
    }
}
