// Instrument and pitch mapping.
//
// Maps General MIDI program numbers onto the ten noteblock instruments, each
// instrument onto the block material that selects it when placed under a
// noteblock, and MIDI pitches onto the 25-step noteblock pitch range.
//
// Program lookup walks `PROGRAM_RULES` in order and the first rule whose set
// contains the program wins. Uncovered programs fall back to piano. The sets
// are literal lists, not ranges, because the mapping has gaps (e.g. program
// 21 is a guitar but 17-20 are not).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest MIDI pitch that maps to noteblock pitch 0 (F#3).
pub const PITCH_OFFSET: i32 = 54;

/// Highest noteblock pitch (two octaves above 0).
pub const MAX_NOTEBLOCK_PITCH: i32 = 24;

/// Instrument categories a noteblock can play.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    #[default]
    Piano,
    Bass,
    Snare,
    Hat,
    Basedrum,
    Bell,
    Flute,
    Chime,
    Guitar,
    Xylophone,
}

impl Instrument {
    pub const ALL: [Instrument; 10] = [
        Instrument::Piano,
        Instrument::Bass,
        Instrument::Snare,
        Instrument::Hat,
        Instrument::Basedrum,
        Instrument::Bell,
        Instrument::Flute,
        Instrument::Chime,
        Instrument::Guitar,
        Instrument::Xylophone,
    ];

    /// Name used in the noteblock `instrument=` block state.
    pub fn name(self) -> &'static str {
        match self {
            Instrument::Piano => "piano",
            Instrument::Bass => "bass",
            Instrument::Snare => "snare",
            Instrument::Hat => "hat",
            Instrument::Basedrum => "basedrum",
            Instrument::Bell => "bell",
            Instrument::Flute => "flute",
            Instrument::Chime => "chime",
            Instrument::Guitar => "guitar",
            Instrument::Xylophone => "xylophone",
        }
    }

    /// The block placed beneath a noteblock to select this instrument.
    pub fn material(self) -> Material {
        match self {
            Instrument::Piano => Material::IronBlock,
            Instrument::Bass => Material::OakPlanks,
            Instrument::Snare => Material::Sand,
            Instrument::Hat => Material::Glass,
            Instrument::Basedrum => Material::Stone,
            Instrument::Bell => Material::GoldBlock,
            Instrument::Flute => Material::Clay,
            Instrument::Chime => Material::PackedIce,
            Instrument::Guitar => Material::WhiteWool,
            Instrument::Xylophone => Material::BoneBlock,
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Solid block materials the placer emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    IronBlock,
    OakPlanks,
    Sand,
    Glass,
    Stone,
    GoldBlock,
    Clay,
    PackedIce,
    WhiteWool,
    BoneBlock,
}

impl Material {
    /// Block id as used in `setblock`.
    pub fn id(self) -> &'static str {
        match self {
            Material::IronBlock => "iron_block",
            Material::OakPlanks => "oak_planks",
            Material::Sand => "sand",
            Material::Glass => "glass",
            Material::Stone => "stone",
            Material::GoldBlock => "gold_block",
            Material::Clay => "clay",
            Material::PackedIce => "packed_ice",
            Material::WhiteWool => "white_wool",
            Material::BoneBlock => "bone_block",
        }
    }

    /// Loose materials fall unless something solid sits underneath.
    pub fn needs_support(self) -> bool {
        matches!(self, Material::Sand)
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Ordered program -> instrument rules. First match wins.
const PROGRAM_RULES: &[(&[u8], Instrument)] = &[
    (&[0, 1, 2, 3, 4, 5, 6], Instrument::Piano),
    (&[7, 8], Instrument::Guitar),
    (&[9, 10, 11, 12], Instrument::Chime),
    (&[13, 14], Instrument::Xylophone),
    (&[15], Instrument::Bell),
    (&[16], Instrument::Guitar),
    (&[25, 26, 27, 28, 29, 30, 31, 21], Instrument::Guitar),
    (&[33, 34, 35, 36], Instrument::Bass),
    (&[37, 38], Instrument::Basedrum),
    (&[39, 40], Instrument::Bass),
    (&[113], Instrument::Bell),
    (&[114], Instrument::Hat),
    (&[115], Instrument::Basedrum),
    (&[116], Instrument::Hat),
    (&[117], Instrument::Snare),
    (&[118], Instrument::Basedrum),
    (&[119], Instrument::Snare),
];

/// Instrument for a MIDI program number; piano when no rule covers it.
pub fn instrument_for(program: u8) -> Instrument {
    PROGRAM_RULES
        .iter()
        .find(|(programs, _)| programs.contains(&program))
        .map(|&(_, instrument)| instrument)
        .unwrap_or_default()
}

/// Material for a MIDI program number.
pub fn block_for(program: u8) -> Material {
    instrument_for(program).material()
}

/// Transpose a MIDI pitch by whole octaves into the noteblock range 0-24.
///
/// Pitches below the range land in its bottom octave (0-11), pitches above it
/// in its top octave (13-24).
pub fn noteblock_pitch(raw_pitch: i32) -> u8 {
    let max = i64::from(MAX_NOTEBLOCK_PITCH);
    let top_octave = max - 11;
    let pitch = i64::from(raw_pitch) - i64::from(PITCH_OFFSET);
    let folded = if pitch < 0 {
        pitch.rem_euclid(12)
    } else if pitch > max {
        top_octave + (pitch - top_octave).rem_euclid(12)
    } else {
        pitch
    };
    // Always within 0..=24.
    folded as u8
}
