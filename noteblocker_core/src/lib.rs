// noteblocker_core — MIDI note events to noteblock structures.
//
// Turns a decoded sequence of timed MIDI events into a lane-based layout of
// noteblocks and repeaters, then into absolute `setblock` placements. The
// crate is pure computation plus one narrow I/O seam (`execute.rs`): it never
// reads files or talks to a server on its own.
//
// Pipeline, leaves first:
// - `instrument.rs`: Program number -> instrument -> block material, and MIDI
//                    pitch -> noteblock pitch (0-24) by octave transposition.
// - `event.rs`:      RawEvent (decoder output), NoteEvent, Frame, TempoModifier.
// - `extract.rs`:    Raw events -> frames of simultaneous onsets.
// - `layout.rs`:     Frames -> lanes of NoteGroup / Placeholder / Delay ops via
//                    a 0.1-unit quantized clock with repeater compression.
// - `placement.rs`:  Lanes + origin + direction -> ordered block placements.
// - `execute.rs`:    The `Executor` capability and in-order dispatch.
// - `config.rs`:     ConvertConfig, loaded from JSON.
// - `pipeline.rs`:   `Conversion` — one run of the whole pipeline.
// - `error.rs`:      ConvertError / ExecuteError.
//
// **Critical constraint: determinism.** Identical input and config always
// produce an identical instruction sequence. No `HashMap`, no system time,
// no randomness. Use `BTreeMap` for keyed state.

pub mod config;
pub mod error;
pub mod event;
pub mod execute;
pub mod extract;
pub mod instrument;
pub mod layout;
pub mod pipeline;
pub mod placement;

pub use config::ConvertConfig;
pub use error::{ConvertError, ExecuteError};
pub use pipeline::Conversion;
