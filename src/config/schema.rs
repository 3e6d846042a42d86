//! Configuration schema definitions

use crate::error::{ConfigError, Result};
use crate::mapping::{Channel, NoteFilter, ResponseCurve, SourceAddress};
use crate::smoothing::SmoothingConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Main configuration for midimap
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapConfig {
    /// Host loop settings
    #[serde(default)]
    pub host: HostConfig,

    /// Knob mappers
    #[serde(default)]
    pub knobs: Vec<KnobConfig>,

    /// Note mappers
    #[serde(default)]
    pub notes: Vec<NoteConfig>,
}

impl MapConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.host.validate()?;

        let mut names = HashSet::new();
        for knob in &self.knobs {
            knob.validate()?;
            if !names.insert(knob.name.as_str()) {
                return Err(ConfigError::DuplicateName(knob.name.clone()));
            }
        }
        for note in &self.notes {
            note.validate()?;
            if !names.insert(note.name.as_str()) {
                return Err(ConfigError::DuplicateName(note.name.clone()));
            }
        }

        Ok(())
    }
}

/// Host loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Frames per second of the update loop (default: 60)
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,

    /// MIDI input port name, matched by substring (None = first port)
    pub port: Option<String>,
}

fn default_frame_rate() -> f32 { 60.0 }

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            port: None,
        }
    }
}

impl HostConfig {
    /// Duration of one frame in seconds
    pub fn frame_time(&self) -> f32 {
        1.0 / self.frame_rate
    }

    fn validate(&self) -> Result<()> {
        if !(1.0..=1000.0).contains(&self.frame_rate) {
            return Err(ConfigError::FrameRate(self.frame_rate));
        }
        Ok(())
    }
}

/// Knob mapper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnobConfig {
    /// Unique name for this mapper
    pub name: String,

    /// MIDI channel (default: all)
    #[serde(default)]
    pub channel: Channel,

    /// Controller number
    pub knob: u8,

    /// Response curve (default: linear)
    #[serde(default)]
    pub curve: ResponseCurve,

    /// Event type
    pub mode: KnobMode,
}

impl KnobConfig {
    /// Source address of this knob
    pub fn address(&self) -> SourceAddress {
        SourceAddress::knob(self.channel, self.knob)
    }

    /// Validate the knob settings
    pub fn validate(&self) -> Result<()> {
        self.address().validate()?;
        self.curve.validate()?;
        if let KnobMode::Value { smoothing, .. } = &self.mode {
            smoothing.validate()?;
        }
        Ok(())
    }
}

/// Knob event types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KnobMode {
    /// Continuous value between `low` and `high`
    Value {
        #[serde(default)]
        low: f32,
        #[serde(default = "default_one")]
        high: f32,
        #[serde(default)]
        smoothing: SmoothingConfig,
    },
    /// Fire when the knob passes the middle going up
    Trigger,
    /// Flip on/off when the knob passes the middle going up
    Toggle,
}

fn default_one() -> f32 { 1.0 }

/// Note mapper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteConfig {
    /// Unique name for this mapper
    pub name: String,

    /// MIDI channel (default: all)
    #[serde(default)]
    pub channel: Channel,

    /// Which notes to listen to (default: all)
    #[serde(default)]
    pub filter: NoteFilter,

    /// Velocity floor, 0.0-1.0 (default: 0.0)
    #[serde(default)]
    pub velocity_offset: f32,

    /// Event type
    pub mode: NoteMode,
}

impl NoteConfig {
    /// Source address of these notes
    pub fn address(&self) -> SourceAddress {
        SourceAddress::notes(self.channel, self.filter)
    }

    /// Validate the note settings
    pub fn validate(&self) -> Result<()> {
        self.address().validate()?;
        if !(0.0..=1.0).contains(&self.velocity_offset) {
            return Err(ConfigError::VelocityOffsetOutOfRange(self.velocity_offset));
        }
        if let NoteMode::Value { smoothing, .. } = &self.mode {
            smoothing.validate()?;
        }
        Ok(())
    }
}

/// Note event types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NoteMode {
    /// Fire with velocity on every note-on
    Trigger,
    /// Paired note-on/note-off events
    Gate {
        #[serde(default)]
        voice: VoiceMode,
    },
    /// Flip on/off on every note-on
    Toggle,
    /// Smoothed value moving between `off_value` and `on_value * velocity`
    Value {
        #[serde(default)]
        off_value: f32,
        #[serde(default = "default_one")]
        on_value: f32,
        #[serde(default)]
        smoothing: SmoothingConfig,
    },
}

/// Voice allocation for gate mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceMode {
    /// One note at a time; a new note ends the previous one
    #[default]
    Mono,
    /// Every note independently
    Poly,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::NoteName;
    use crate::smoothing::InterpolationKind;

    #[test]
    fn test_default_host_config() {
        let config: HostConfig = serde_yaml::from_str("port: nanoKONTROL").unwrap();
        assert_eq!(config.frame_rate, 60.0);
        assert_eq!(config.port.as_deref(), Some("nanoKONTROL"));
    }

    #[test]
    fn test_knob_config() {
        let yaml = r#"
name: cutoff
channel: 2
knob: 74
curve:
  type: power
  exponent: 2.0
mode:
  type: value
  low: 100.0
  high: 8000.0
  smoothing:
    kind: exponential
    speed: 12.0
"#;
        let config: KnobConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.name, "cutoff");
        assert_eq!(config.channel, Channel::Only(2));
        assert_eq!(config.knob, 74);
        assert_eq!(config.curve, ResponseCurve::Power { exponent: 2.0 });
        match config.mode {
            KnobMode::Value { low, high, smoothing } => {
                assert_eq!(low, 100.0);
                assert_eq!(high, 8000.0);
                assert_eq!(smoothing.kind, InterpolationKind::Exponential);
                assert_eq!(smoothing.speed, 12.0);
            }
            other => panic!("unexpected mode {:?}", other),
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_knob_config_defaults() {
        let yaml = r#"
name: mute
knob: 8
mode:
  type: toggle
"#;
        let config: KnobConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.channel, Channel::All);
        assert_eq!(config.curve, ResponseCurve::Linear);
        assert_eq!(config.mode, KnobMode::Toggle);
    }

    #[test]
    fn test_note_config() {
        let yaml = r#"
name: kick
channel: 9
filter:
  type: note_name
  name: c
velocity_offset: 0.2
mode:
  type: gate
  voice: poly
"#;
        let config: NoteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.channel, Channel::Only(9));
        assert_eq!(config.filter, NoteFilter::NoteName { name: NoteName::C });
        assert_eq!(config.velocity_offset, 0.2);
        assert_eq!(config.mode, NoteMode::Gate { voice: VoiceMode::Poly });
    }

    #[test]
    fn test_note_value_defaults() {
        let config: NoteConfig = serde_yaml::from_str("name: pad\nmode:\n  type: value").unwrap();
        match config.mode {
            NoteMode::Value {
                off_value,
                on_value,
                smoothing,
            } => {
                assert_eq!(off_value, 0.0);
                assert_eq!(on_value, 1.0);
                assert!(!smoothing.is_enabled());
            }
            other => panic!("unexpected mode {:?}", other),
        }
    }

    fn knob(name: &str) -> KnobConfig {
        KnobConfig {
            name: name.to_string(),
            channel: Channel::All,
            knob: 1,
            curve: ResponseCurve::Linear,
            mode: KnobMode::Trigger,
        }
    }

    fn note(name: &str) -> NoteConfig {
        NoteConfig {
            name: name.to_string(),
            channel: Channel::All,
            filter: NoteFilter::Off,
            velocity_offset: 0.0,
            mode: NoteMode::Trigger,
        }
    }

    #[test]
    fn test_config_validation() {
        let config = MapConfig {
            host: HostConfig::default(),
            knobs: vec![knob("a")],
            notes: vec![note("b")],
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let config = MapConfig {
            host: HostConfig::default(),
            knobs: vec![knob("same")],
            notes: vec![note("same")],
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateName("same".to_string()))
        );
    }

    #[test]
    fn test_bad_frame_rate_rejected() {
        let config = MapConfig {
            host: HostConfig {
                frame_rate: 0.0,
                port: None,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_velocity_offset_rejected() {
        let mut config = note("n");
        config.velocity_offset = 1.5;
        assert_eq!(
            config.validate(),
            Err(ConfigError::VelocityOffsetOutOfRange(1.5))
        );
    }

    #[test]
    fn test_bad_smoothing_rejected() {
        let mut config = knob("k");
        config.mode = KnobMode::Value {
            low: 0.0,
            high: 1.0,
            smoothing: SmoothingConfig::exponential(0.0),
        };
        assert_eq!(config.validate(), Err(ConfigError::UnsupportedSpeed(0.0)));
    }
}
