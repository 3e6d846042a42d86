//! Channel and controller filtering
//!
//! Decides whether an incoming hardware message belongs to a mapper.
//! Pure predicates, evaluated before any mapper state is touched.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// MIDI channel selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "ChannelRepr", into = "ChannelRepr")]
pub enum Channel {
    /// Listen on every channel
    #[default]
    All,
    /// Listen on a single channel (0-15)
    Only(u8),
}

impl Channel {
    /// Check an incoming channel against this selector
    pub fn accepts(&self, channel: u8) -> bool {
        match *self {
            Channel::All => true,
            Channel::Only(ch) => ch == channel,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::All => write!(f, "all"),
            Channel::Only(ch) => write!(f, "{}", ch),
        }
    }
}

/// YAML face of a channel: either `all` or a number
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ChannelRepr {
    Number(u8),
    Name(String),
}

impl TryFrom<ChannelRepr> for Channel {
    type Error = ConfigError;

    fn try_from(repr: ChannelRepr) -> Result<Self> {
        match repr {
            ChannelRepr::Number(ch) if ch <= 15 => Ok(Channel::Only(ch)),
            ChannelRepr::Number(ch) => Err(ConfigError::ChannelOutOfRange(ch)),
            ChannelRepr::Name(name) if name.eq_ignore_ascii_case("all") => Ok(Channel::All),
            ChannelRepr::Name(name) => Err(ConfigError::UnknownChannel(name)),
        }
    }
}

impl From<Channel> for ChannelRepr {
    fn from(channel: Channel) -> Self {
        match channel {
            Channel::All => ChannelRepr::Name("all".to_string()),
            Channel::Only(ch) => ChannelRepr::Number(ch),
        }
    }
}

/// Pitch class of a note, C = 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteName {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl NoteName {
    /// Semitone offset within an octave
    pub fn pitch_class(self) -> u8 {
        self as u8
    }
}

/// Note filter as written in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NoteFilter {
    /// Every note passes
    #[default]
    Off,
    /// Notes whose pitch class equals `name`, in any octave
    NoteName { name: NoteName },
    /// Notes within `low..=high`
    NoteNumber { low: u8, high: u8 },
}

/// What a mapper listens to on its channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    /// No identity check
    Any,
    /// Exact controller number
    Controller(u8),
    /// Pitch class match
    NoteName(NoteName),
    /// Inclusive note number range
    NoteRange { low: u8, high: u8 },
}

impl Identity {
    /// Check an incoming controller/note number against this identity
    pub fn accepts(&self, number: u8) -> bool {
        match *self {
            Identity::Any => true,
            Identity::Controller(cc) => cc == number,
            Identity::NoteName(name) => number % 12 == name.pitch_class(),
            Identity::NoteRange { low, high } => low <= number && number <= high,
        }
    }

    /// A note number this identity lets through, used by the debug key.
    /// Range filters give their low end, note names their pitch in the
    /// octave starting at middle C, and anything else middle C.
    pub fn representative_note(&self) -> u8 {
        match *self {
            Identity::Any | Identity::Controller(_) => 60,
            Identity::NoteName(name) => 60 + name.pitch_class(),
            Identity::NoteRange { low, .. } => low,
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            Identity::Controller(cc) if cc > 127 => Err(ConfigError::ControllerOutOfRange(cc)),
            Identity::NoteRange { low, high } => {
                if high > 127 {
                    return Err(ConfigError::NoteOutOfRange(high));
                }
                if low > high {
                    return Err(ConfigError::NoteRangeInverted { low, high });
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl From<NoteFilter> for Identity {
    fn from(filter: NoteFilter) -> Self {
        match filter {
            NoteFilter::Off => Identity::Any,
            NoteFilter::NoteName { name } => Identity::NoteName(name),
            NoteFilter::NoteNumber { low, high } => Identity::NoteRange { low, high },
        }
    }
}

/// Where a mapper's hardware input comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceAddress {
    pub channel: Channel,
    pub identity: Identity,
}

impl SourceAddress {
    /// Address of a single knob
    pub fn knob(channel: Channel, number: u8) -> Self {
        Self {
            channel,
            identity: Identity::Controller(number),
        }
    }

    /// Address of a set of notes
    pub fn notes(channel: Channel, filter: NoteFilter) -> Self {
        Self {
            channel,
            identity: filter.into(),
        }
    }

    /// Does an incoming message belong to this address?
    pub fn matches(&self, channel: u8, number: u8) -> bool {
        self.channel.accepts(channel) && self.identity.accepts(number)
    }

    /// Check the address can ever be satisfied
    pub fn validate(&self) -> Result<()> {
        if let Channel::Only(ch) = self.channel {
            if ch > 15 {
                return Err(ConfigError::ChannelOutOfRange(ch));
            }
        }
        self.identity.validate()
    }
}
