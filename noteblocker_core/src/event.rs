// Event types flowing through the pipeline.
//
// `RawEvent` is the decoder's output: one channel message with the time since
// the previous raw event. `NoteEvent` is a resolved onset with its absolute
// scheduled time, and a `Frame` groups the onsets that share one scheduled
// time. `TempoModifier` is the validated divisor applied to every raw delta.
//
// Time is measured in seconds of the source piece (divided by the tempo
// modifier). The layout clock advances in tenths of that unit, which is one
// repeater tick on the target.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};

/// What a raw event carries. Anything the pipeline does not use is `Other`;
/// it is skipped but its delta still advances time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawEventKind {
    NoteOn { key: u8 },
    NoteOff { key: u8 },
    ProgramChange { program: u8 },
    Other,
}

/// One timed channel event in arrival order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// MIDI channel, 0-15.
    pub channel: u8,
    /// Time since the previous raw event, in seconds.
    pub delta: f64,
    pub kind: RawEventKind,
}

impl RawEvent {
    pub fn note_on(channel: u8, key: u8, delta: f64) -> Self {
        Self {
            channel,
            delta,
            kind: RawEventKind::NoteOn { key },
        }
    }

    pub fn note_off(channel: u8, key: u8, delta: f64) -> Self {
        Self {
            channel,
            delta,
            kind: RawEventKind::NoteOff { key },
        }
    }

    pub fn program_change(channel: u8, program: u8, delta: f64) -> Self {
        Self {
            channel,
            delta,
            kind: RawEventKind::ProgramChange { program },
        }
    }
}

/// A single note onset, ready for layout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// MIDI pitch (semitones).
    pub pitch: u8,
    /// Program active on the note's channel when it was played.
    pub program: u8,
    /// Cumulative time from the start of the piece, tempo-scaled.
    pub scheduled_time: f64,
    /// Raw delta of the source event, before tempo scaling.
    pub inter_event_gap: f64,
}

/// Onsets that share one scheduled time, in arrival order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub time: f64,
    pub events: Vec<NoteEvent>,
}

impl Frame {
    pub fn width(&self) -> usize {
        self.events.len()
    }
}

/// Divisor applied to raw time deltas. 2.0 plays twice as fast, 0.5 half as
/// fast. Always finite and strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct TempoModifier(f64);

impl TempoModifier {
    pub const NORMAL: TempoModifier = TempoModifier(1.0);

    pub fn new(value: f64) -> Result<Self, ConvertError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(ConvertError::InvalidTempoModifier(value))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Scale a raw delta. Negative or non-finite deltas do not advance time.
    pub fn scale(self, delta: f64) -> f64 {
        if delta.is_finite() && delta > 0.0 {
            delta / self.0
        } else {
            0.0
        }
    }
}

impl Default for TempoModifier {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<f64> for TempoModifier {
    type Error = ConvertError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TempoModifier> for f64 {
    fn from(value: TempoModifier) -> Self {
        value.0
    }
}
