// noteblocker_midi — Standard MIDI File decoding for noteblocker.
//
// Reads an SMF with `midly` and flattens it into the single ordered stream of
// `RawEvent`s the conversion pipeline consumes: every track merged by
// absolute tick, each event carrying its delta from the previous event in
// seconds.
//
// Merge order is (absolute tick, track index, position in track), so events
// at the same instant keep the order the file lists them in, track by track.
//
// Tick -> second conversion:
// - Metrical timing: `ticks * (us_per_quarter / 1e6) / ticks_per_quarter`,
//   with tempo meta events applied as they occur in the merged stream
//   (default 500_000 us per quarter, i.e. 120 BPM).
// - Timecode timing: `ticks / (frames_per_second * ticks_per_frame)`.
//
// Channel messages map to `RawEventKind`; a note-on with velocity 0 is a
// note-off. Meta and SysEx events emit nothing, but their time is carried
// into the next emitted event so no delay is lost.

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use noteblocker_core::event::{RawEvent, RawEventKind};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Tempo assumed until the first tempo event: 120 BPM.
pub const DEFAULT_US_PER_QUARTER: u32 = 500_000;

#[derive(Debug, Error)]
pub enum MidiError {
    #[error("failed to read MIDI file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed MIDI file: {0}")]
    Parse(#[from] midly::Error),

    #[error("unsupported MIDI timing: {0}")]
    UnsupportedTiming(String),
}

/// Read and decode a MIDI file.
pub fn load(path: &Path) -> Result<Vec<RawEvent>, MidiError> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Decode SMF bytes into raw events.
pub fn decode(bytes: &[u8]) -> Result<Vec<RawEvent>, MidiError> {
    let smf = Smf::parse(bytes)?;
    let events = smf_to_events(&smf)?;
    debug!(
        tracks = smf.tracks.len(),
        events = events.len(),
        "decoded MIDI file"
    );
    Ok(events)
}

/// Converts elapsed ticks to seconds under the file's timing mode.
#[derive(Clone, Copy, Debug)]
enum TickClock {
    Metrical { ticks_per_quarter: f64, us_per_quarter: f64 },
    Timecode { ticks_per_second: f64 },
}

impl TickClock {
    fn new(timing: Timing) -> Result<Self, MidiError> {
        match timing {
            Timing::Metrical(ticks) => {
                let ticks_per_quarter = ticks.as_int();
                if ticks_per_quarter == 0 {
                    return Err(MidiError::UnsupportedTiming("zero ticks per quarter note".into()));
                }
                Ok(TickClock::Metrical {
                    ticks_per_quarter: f64::from(ticks_per_quarter),
                    us_per_quarter: f64::from(DEFAULT_US_PER_QUARTER),
                })
            }
            Timing::Timecode(fps, subframes) => {
                let ticks_per_second = f64::from(fps.as_f32()) * f64::from(subframes);
                if ticks_per_second <= 0.0 {
                    return Err(MidiError::UnsupportedTiming("zero ticks per frame".into()));
                }
                Ok(TickClock::Timecode { ticks_per_second })
            }
        }
    }

    fn seconds(&self, ticks: u64) -> f64 {
        match *self {
            TickClock::Metrical {
                ticks_per_quarter,
                us_per_quarter,
            } => ticks as f64 * (us_per_quarter / 1_000_000.0) / ticks_per_quarter,
            TickClock::Timecode { ticks_per_second } => ticks as f64 / ticks_per_second,
        }
    }

    /// Tempo only affects metrical timing.
    fn set_tempo(&mut self, us: u32) {
        if let TickClock::Metrical { us_per_quarter, .. } = self {
            *us_per_quarter = f64::from(us);
        }
    }
}

fn raw_kind(message: MidiMessage) -> RawEventKind {
    match message {
        MidiMessage::NoteOn { key, vel } if vel.as_int() == 0 => {
            RawEventKind::NoteOff { key: key.as_int() }
        }
        MidiMessage::NoteOn { key, .. } => RawEventKind::NoteOn { key: key.as_int() },
        MidiMessage::NoteOff { key, .. } => RawEventKind::NoteOff { key: key.as_int() },
        MidiMessage::ProgramChange { program } => RawEventKind::ProgramChange {
            program: program.as_int(),
        },
        _ => RawEventKind::Other,
    }
}

/// Merge all tracks and convert to timed raw events.
fn smf_to_events(smf: &Smf<'_>) -> Result<Vec<RawEvent>, MidiError> {
    let mut clock = TickClock::new(smf.header.timing)?;

    let mut merged = Vec::new();
    for (track_index, track) in smf.tracks.iter().enumerate() {
        let mut tick: u64 = 0;
        for (event_index, event) in track.iter().enumerate() {
            tick += u64::from(event.delta.as_int());
            merged.push((tick, track_index, event_index, event.kind));
        }
    }
    merged.sort_by_key(|&(tick, track_index, event_index, _)| (tick, track_index, event_index));

    let mut events = Vec::new();
    let mut last_tick: u64 = 0;
    let mut carried = 0.0_f64;
    for (tick, _, _, kind) in merged {
        carried += clock.seconds(tick - last_tick);
        last_tick = tick;
        match kind {
            TrackEventKind::Midi { channel, message } => {
                events.push(RawEvent {
                    channel: channel.as_int(),
                    delta: carried,
                    kind: raw_kind(message),
                });
                carried = 0.0;
            }
            TrackEventKind::Meta(MetaMessage::Tempo(us)) => clock.set_tempo(us.as_int()),
            _ => {}
        }
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::num::{u4, u7, u15, u24, u28};
    use midly::{Format, Header, Track, TrackEvent};

    fn midi(delta: u32, channel: u8, message: MidiMessage) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(channel),
                message,
            },
        }
    }

    fn note_on(delta: u32, key: u8, vel: u8) -> TrackEvent<'static> {
        midi(
            delta,
            0,
            MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(vel),
            },
        )
    }

    fn meta(delta: u32, message: MetaMessage<'static>) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Meta(message),
        }
    }

    fn smf(tracks: Vec<Track<'static>>) -> Smf<'static> {
        let mut smf = Smf::new(Header::new(Format::Parallel, Timing::Metrical(u15::new(480))));
        smf.tracks = tracks;
        smf
    }

    #[test]
    fn default_tempo_is_half_a_second_per_quarter() {
        let smf = smf(vec![vec![note_on(0, 60, 100), note_on(480, 62, 100)]]);
        let events = smf_to_events(&smf).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].delta, 0.0);
        assert_eq!(events[1].delta, 0.5);
    }

    #[test]
    fn tempo_changes_apply_from_their_position() {
        let smf = smf(vec![vec![
            note_on(0, 60, 100),
            // 60 BPM from tick 480 onwards.
            meta(480, MetaMessage::Tempo(u24::new(1_000_000))),
            note_on(480, 62, 100),
        ]]);
        let events = smf_to_events(&smf).unwrap();
        assert_eq!(events.len(), 2);
        // 0.5s at 120 BPM, carried across the tempo event, then 1.0s at 60 BPM.
        assert_eq!(events[1].delta, 1.5);
    }

    #[test]
    fn tracks_merge_by_absolute_tick() {
        let smf = smf(vec![
            vec![meta(0, MetaMessage::TrackName(b"conductor"))],
            vec![note_on(0, 60, 100), note_on(960, 64, 100)],
            vec![note_on(480, 62, 100), note_on(0, 67, 100)],
        ]);
        let events = smf_to_events(&smf).unwrap();
        let keys: Vec<RawEventKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            keys,
            vec![
                RawEventKind::NoteOn { key: 60 },
                RawEventKind::NoteOn { key: 62 },
                RawEventKind::NoteOn { key: 67 },
                RawEventKind::NoteOn { key: 64 },
            ]
        );
        let deltas: Vec<f64> = events.iter().map(|e| e.delta).collect();
        assert_eq!(deltas, vec![0.0, 0.5, 0.0, 0.5]);
    }

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        let smf = smf(vec![vec![note_on(0, 60, 100), note_on(240, 60, 0)]]);
        let events = smf_to_events(&smf).unwrap();
        assert_eq!(events[1].kind, RawEventKind::NoteOff { key: 60 });
    }

    #[test]
    fn program_and_controller_messages() {
        let smf = smf(vec![vec![
            midi(
                0,
                3,
                MidiMessage::ProgramChange {
                    program: u7::new(33),
                },
            ),
            midi(
                0,
                3,
                MidiMessage::Controller {
                    controller: u7::new(7),
                    value: u7::new(100),
                },
            ),
        ]]);
        let events = smf_to_events(&smf).unwrap();
        assert_eq!(events[0].channel, 3);
        assert_eq!(events[0].kind, RawEventKind::ProgramChange { program: 33 });
        assert_eq!(events[1].kind, RawEventKind::Other);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(decode(b"not a midi file"), Err(MidiError::Parse(_))));
    }

    #[test]
    fn decode_round_trips_written_file() {
        let smf = smf(vec![vec![
            note_on(0, 60, 100),
            note_on(480, 64, 100),
            meta(0, MetaMessage::EndOfTrack),
        ]]);
        let mut buf = Vec::new();
        smf.write(&mut buf).unwrap();
        let events = decode(&buf).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind, RawEventKind::NoteOn { key: 64 });
    }
}
