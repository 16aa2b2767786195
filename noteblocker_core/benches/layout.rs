// Benchmarks for lane layout and placement on a synthetic piece.
//
// The piece is ~3 minutes of dense four-voice chords with occasional wide
// frames, which is about the size of a typical pop-song MIDI.

use criterion::{Criterion, criterion_group, criterion_main};
use noteblocker_core::event::{RawEvent, TempoModifier};
use noteblocker_core::extract::extract;
use noteblocker_core::layout::generate;
use noteblocker_core::placement::{BlockPos, Direction, FacingTable, place};
use std::hint::black_box;

fn synthetic_piece() -> Vec<RawEvent> {
    let mut raw = Vec::new();
    for beat in 0..720u32 {
        let voices = if beat % 16 == 0 { 7 } else { 4 };
        for voice in 0..voices {
            let delta = if voice + 1 == voices { 0.25 } else { 0.0 };
            let key = 48 + ((beat * 5 + voice * 7) % 36) as u8;
            raw.push(RawEvent::note_on((voice % 4) as u8, key, delta));
        }
    }
    raw
}

fn bench_layout(c: &mut Criterion) {
    let raw = synthetic_piece();
    let frames = extract(&raw, TempoModifier::NORMAL);

    c.bench_function("extract", |b| {
        b.iter(|| extract(black_box(&raw), TempoModifier::NORMAL))
    });

    c.bench_function("generate", |b| b.iter(|| generate(black_box(&frames))));

    let structure = generate(&frames);
    c.bench_function("place", |b| {
        b.iter(|| {
            place(
                black_box(&structure),
                BlockPos::new(0, 64, 0),
                Direction::North,
                FacingTable::Corrected,
            )
        })
    });
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
