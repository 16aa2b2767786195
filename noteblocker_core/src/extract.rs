// Event extraction: raw channel events -> frames of simultaneous onsets.
//
// Walks the raw events once, in arrival order, carrying two accumulators:
// the active program per channel and the running scheduled time. Each note-on
// becomes a `NoteEvent` stamped with the running time *before* its own delta
// is added, so an event's delta separates it from the *next* event. Note-offs
// and unrecognized events only advance time.
//
// Onsets are then split into frames wherever the scheduled time changes.
// Frame membership uses exact equality: every member of a frame was stamped
// with the same accumulated value.

use crate::event::{Frame, NoteEvent, RawEvent, RawEventKind, TempoModifier};
use std::collections::BTreeMap;
use tracing::debug;

/// Program assumed for channels that have not seen a program change.
pub const DEFAULT_PROGRAM: u8 = 0;

/// Resolve instruments and times for every onset, in arrival order.
pub fn note_events(raw_events: &[RawEvent], tempo: TempoModifier) -> Vec<NoteEvent> {
    let mut channel_program: BTreeMap<u8, u8> = BTreeMap::new();
    let mut elapsed = 0.0_f64;
    let mut notes = Vec::new();

    for raw in raw_events {
        match raw.kind {
            RawEventKind::ProgramChange { program } => {
                channel_program.insert(raw.channel, program);
            }
            RawEventKind::NoteOn { key } => {
                let program = channel_program
                    .get(&raw.channel)
                    .copied()
                    .unwrap_or(DEFAULT_PROGRAM);
                notes.push(NoteEvent {
                    pitch: key,
                    program,
                    scheduled_time: elapsed,
                    inter_event_gap: raw.delta,
                });
            }
            RawEventKind::NoteOff { .. } | RawEventKind::Other => {}
        }
        elapsed += tempo.scale(raw.delta);
    }

    notes
}

/// Group consecutive onsets with identical scheduled time into frames.
pub fn group_frames(notes: Vec<NoteEvent>) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();
    for note in notes {
        match frames.last_mut() {
            Some(frame) if frame.time == note.scheduled_time => frame.events.push(note),
            _ => frames.push(Frame {
                time: note.scheduled_time,
                events: vec![note],
            }),
        }
    }
    frames
}

/// Raw events -> ordered frames of note onsets.
pub fn extract(raw_events: &[RawEvent], tempo: TempoModifier) -> Vec<Frame> {
    let notes = note_events(raw_events, tempo);
    let note_count = notes.len();
    let frames = group_frames(notes);
    debug!(
        raw_events = raw_events.len(),
        notes = note_count,
        frames = frames.len(),
        "extracted note frames"
    );
    frames
}
