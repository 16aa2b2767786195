// Block placement: lanes -> absolute `setblock` instructions.
//
// Columns (time) run along the build direction's forward vector from the
// origin; lanes run along the sideways vector (forward turned 90 degrees
// clockwise), 3 blocks apart. Each op is realized at its lane/column base
// position `b` (y = origin y):
//
//   Delay(t)      b+1: support block    b+2: repeater (delay t, facing)
//   Placeholder   b+2: support block
//   NoteGroup     per onset, side by side along sideways (starting one block
//                 back when the group has more than one onset):
//                 b+0: support block, only under loose materials
//                 b+1: instrument material
//                 b+2: noteblock (pitch, instrument unless piano)
//
// Instructions come out column by column, lanes in order within a column,
// onsets in group order within a lane.
//
// Coordinates follow the target's convention: X east, Y up, Z south.

use crate::instrument::{Instrument, Material, instrument_for, noteblock_pitch};
use crate::layout::{LaneOp, Structure};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Spacing between adjacent lanes, in blocks.
pub const LANE_SPACING: i32 = 3;

/// Block used to hold up repeaters, placeholders, and loose materials.
pub const SUPPORT_MATERIAL: Material = Material::IronBlock;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// An absolute block position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Move `distance` steps along a horizontal `(dx, dz)` vector.
    pub const fn step(self, (dx, dz): (i32, i32), distance: i32) -> Self {
        self.offset(dx * distance, 0, dz * distance)
    }

    pub const fn up(self, dy: i32) -> Self {
        self.offset(0, dy, 0)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

/// Horizontal build direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    South,
    West,
    North,
    East,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::South,
        Direction::West,
        Direction::North,
        Direction::East,
    ];

    /// Unit `(dx, dz)` vector this direction points along.
    pub const fn forward(self) -> (i32, i32) {
        match self {
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::North => (0, -1),
            Direction::East => (1, 0),
        }
    }

    /// The direction 90 degrees clockwise (seen from above).
    pub const fn clockwise(self) -> Direction {
        match self {
            Direction::South => Direction::West,
            Direction::West => Direction::North,
            Direction::North => Direction::East,
            Direction::East => Direction::South,
        }
    }

    /// Unit `(dx, dz)` vector along which lanes are spaced.
    pub const fn sideways(self) -> (i32, i32) {
        self.clockwise().forward()
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::North => Direction::South,
            Direction::East => Direction::West,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::South => "south",
            Direction::West => "west",
            Direction::North => "north",
            Direction::East => "east",
        }
    }

    pub fn from_name(name: &str) -> Option<Direction> {
        let name = name.trim();
        Direction::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::from_name(s)
            .ok_or_else(|| format!("unknown direction '{s}' (expected north, east, south or west)"))
    }
}

/// How a build direction becomes a repeater's `facing` block state.
///
/// Some server versions place repeaters pointing backwards for the facing
/// they are given; `Corrected` compensates by asking for the opposite one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacingTable {
    Literal,
    #[default]
    Corrected,
}

impl FacingTable {
    pub fn facing(self, direction: Direction) -> Direction {
        match self {
            FacingTable::Literal => direction,
            FacingTable::Corrected => direction.opposite(),
        }
    }
}

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

/// What to place at a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    Solid(Material),
    Repeater { facing: Direction, delay: u8 },
    NoteBlock { note: u8, instrument: Option<Instrument> },
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::Solid(material) => write!(f, "{material}"),
            Block::Repeater { facing, delay } => {
                write!(f, "repeater[facing={facing},delay={delay}]")
            }
            Block::NoteBlock {
                note,
                instrument: Some(instrument),
            } => write!(f, "note_block[note={note},instrument={instrument}]"),
            Block::NoteBlock {
                note,
                instrument: None,
            } => write!(f, "note_block[note={note}]"),
        }
    }
}

/// One block placement at an absolute position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementInstruction {
    pub pos: BlockPos,
    pub block: Block,
}

impl PlacementInstruction {
    pub fn new(pos: BlockPos, block: Block) -> Self {
        Self { pos, block }
    }

    /// The server command that performs this placement (no leading slash).
    pub fn to_command(&self) -> String {
        format!("setblock {} {}", self.pos, self.block)
    }
}

// ---------------------------------------------------------------------------
// Placer
// ---------------------------------------------------------------------------

/// Realize a structure as ordered placements starting at `origin`.
pub fn place(
    structure: &Structure,
    origin: BlockPos,
    direction: Direction,
    facing_table: FacingTable,
) -> Vec<PlacementInstruction> {
    let forward = direction.forward();
    let sideways = direction.sideways();
    let facing = facing_table.facing(direction);
    let mut out = Vec::new();

    for column in 0..structure.column_count() {
        let column_base = origin.step(forward, column as i32);
        for (lane_index, lane) in structure.lanes().iter().enumerate() {
            let Some(op) = lane.ops().get(column) else {
                continue;
            };
            let base = column_base.step(sideways, LANE_SPACING * lane_index as i32);
            match op {
                LaneOp::Delay(ticks) => {
                    out.push(PlacementInstruction::new(base.up(1), Block::Solid(SUPPORT_MATERIAL)));
                    out.push(PlacementInstruction::new(
                        base.up(2),
                        Block::Repeater {
                            facing,
                            delay: *ticks,
                        },
                    ));
                }
                LaneOp::Placeholder => {
                    out.push(PlacementInstruction::new(
                        base.up(2),
                        Block::Solid(SUPPORT_MATERIAL),
                    ));
                }
                LaneOp::NoteGroup(events) => {
                    let mut pos = if events.len() > 1 {
                        base.step(sideways, -1)
                    } else {
                        base
                    };
                    for event in events {
                        let instrument = instrument_for(event.program);
                        let material = instrument.material();
                        if material.needs_support() {
                            out.push(PlacementInstruction::new(
                                pos,
                                Block::Solid(SUPPORT_MATERIAL),
                            ));
                        }
                        out.push(PlacementInstruction::new(pos.up(1), Block::Solid(material)));
                        out.push(PlacementInstruction::new(
                            pos.up(2),
                            Block::NoteBlock {
                                note: noteblock_pitch(i32::from(event.pitch)),
                                instrument: (instrument != Instrument::Piano).then_some(instrument),
                            },
                        ));
                        pos = pos.step(sideways, 1);
                    }
                }
            }
        }
    }

    debug!(
        instructions = out.len(),
        columns = structure.column_count(),
        lanes = structure.lane_count(),
        %origin,
        %direction,
        "placed structure"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Frame, NoteEvent};
    use crate::layout::generate;

    fn timed_note(pitch: u8, program: u8, time: f64) -> NoteEvent {
        NoteEvent {
            pitch,
            program,
            scheduled_time: time,
            inter_event_gap: 0.0,
        }
    }

    fn note(pitch: u8, program: u8) -> NoteEvent {
        timed_note(pitch, program, 0.0)
    }

    fn single_frame(events: Vec<NoteEvent>) -> Structure {
        generate(&[Frame { time: 0.0, events }])
    }

    #[test]
    fn sideways_is_clockwise_of_forward() {
        assert_eq!(Direction::South.sideways(), (-1, 0));
        assert_eq!(Direction::West.sideways(), (0, -1));
        assert_eq!(Direction::North.sideways(), (1, 0));
        assert_eq!(Direction::East.sideways(), (0, 1));
        for d in Direction::ALL {
            let (fx, fz) = d.forward();
            let (sx, sz) = d.sideways();
            // Perpendicular unit vectors.
            assert_eq!(fx * sx + fz * sz, 0);
            assert_eq!(sx.abs() + sz.abs(), 1);
        }
    }

    #[test]
    fn direction_parses_names() {
        assert_eq!("north".parse::<Direction>(), Ok(Direction::North));
        assert_eq!(" East ".parse::<Direction>(), Ok(Direction::East));
        assert!("up".parse::<Direction>().is_err());
        assert_eq!(Direction::West.to_string(), "west");
    }

    #[test]
    fn corrected_facing_is_opposite() {
        for d in Direction::ALL {
            assert_eq!(FacingTable::Literal.facing(d), d);
            assert_eq!(FacingTable::Corrected.facing(d), d.opposite());
        }
    }

    #[test]
    fn block_strings_match_target_syntax() {
        assert_eq!(Block::Solid(Material::IronBlock).to_string(), "iron_block");
        assert_eq!(
            Block::Repeater {
                facing: Direction::North,
                delay: 4
            }
            .to_string(),
            "repeater[facing=north,delay=4]"
        );
        assert_eq!(
            Block::NoteBlock {
                note: 6,
                instrument: Some(Instrument::Bass)
            }
            .to_string(),
            "note_block[note=6,instrument=bass]"
        );
        assert_eq!(
            Block::NoteBlock {
                note: 13,
                instrument: None
            }
            .to_string(),
            "note_block[note=13]"
        );
        let instr =
            PlacementInstruction::new(BlockPos::new(-3, 64, 10), Block::Solid(Material::Sand));
        assert_eq!(instr.to_command(), "setblock -3 64 10 sand");
    }

    #[test]
    fn empty_structure_places_nothing() {
        let out = place(
            &Structure::default(),
            BlockPos::default(),
            Direction::South,
            FacingTable::Literal,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn delay_column_places_support_and_repeater() {
        let structure = single_frame(vec![note(60, 0)]);
        let out = place(
            &structure,
            BlockPos::new(10, 4, 20),
            Direction::East,
            FacingTable::Literal,
        );
        // Column 0 is the leading one-tick repeater.
        assert_eq!(
            out[0],
            PlacementInstruction::new(BlockPos::new(10, 5, 20), Block::Solid(SUPPORT_MATERIAL))
        );
        assert_eq!(
            out[1],
            PlacementInstruction::new(
                BlockPos::new(10, 6, 20),
                Block::Repeater {
                    facing: Direction::East,
                    delay: 1
                }
            )
        );
        // Column 1 holds the single note one block east, not shifted sideways.
        assert_eq!(out[2].pos, BlockPos::new(11, 5, 20));
        assert_eq!(out[3].pos, BlockPos::new(11, 6, 20));
    }

    #[test]
    fn groups_are_centered_on_the_lane() {
        let structure = single_frame(vec![note(60, 0), note(64, 0), note(67, 0)]);
        let out = place(&structure, BlockPos::new(0, 0, 0), Direction::South, FacingTable::Literal);
        let noteblocks: Vec<BlockPos> = out
            .iter()
            .filter(|i| matches!(i.block, Block::NoteBlock { .. }))
            .map(|i| i.pos)
            .collect();
        // South: sideways is west (-x); the group starts one block east.
        assert_eq!(
            noteblocks,
            vec![BlockPos::new(1, 2, 1), BlockPos::new(0, 2, 1), BlockPos::new(-1, 2, 1)]
        );
    }

    #[test]
    fn loose_materials_get_support_and_instrument_tag() {
        // Program 117 is a snare on sand.
        let structure = single_frame(vec![note(60, 117)]);
        let out = place(&structure, BlockPos::new(0, 0, 0), Direction::North, FacingTable::Literal);
        let column: Vec<String> = out[2..].iter().take(3).map(|i| i.to_command()).collect();
        assert_eq!(
            column,
            vec![
                "setblock 0 0 -1 iron_block",
                "setblock 0 1 -1 sand",
                "setblock 0 2 -1 note_block[note=6,instrument=snare]",
            ]
        );
    }

    #[test]
    fn lanes_are_spaced_three_apart() {
        let events: Vec<NoteEvent> = (0..4).map(|i| note(60 + i, 0)).collect();
        let structure = single_frame(events);
        assert_eq!(structure.lane_count(), 2);
        let out = place(
            &structure,
            BlockPos::new(0, 0, 0),
            Direction::North,
            FacingTable::Corrected,
        );
        // Column 2 is the trailing repeater for both lanes; North's sideways is east.
        let repeaters: Vec<&PlacementInstruction> = out
            .iter()
            .filter(|i| i.pos.z == -2 && matches!(i.block, Block::Repeater { .. }))
            .collect();
        assert_eq!(repeaters.len(), 2);
        assert_eq!(repeaters[0].pos, BlockPos::new(0, 2, -2));
        assert_eq!(repeaters[1].pos, BlockPos::new(3, 2, -2));
        assert_eq!(
            repeaters[0].block,
            Block::Repeater {
                facing: Direction::South,
                delay: 1
            }
        );
    }

    #[test]
    fn placeholder_is_a_raised_support_block() {
        let frames = vec![
            Frame {
                time: 0.0,
                events: (0..4).map(|i| timed_note(60 + i, 0, 0.0)).collect(),
            },
            Frame {
                time: 0.5,
                events: vec![timed_note(72, 0, 0.5)],
            },
        ];
        let structure = generate(&frames);
        assert_eq!(structure.lane_count(), 2);
        // The late note is due at step 6: lane 0 plays it in column 4 while
        // lane 1 holds a placeholder there.
        let placeholder_column = structure.lanes()[1]
            .ops()
            .iter()
            .position(|op| matches!(op, LaneOp::Placeholder));
        assert_eq!(placeholder_column, Some(4));

        let out = place(
            &structure,
            BlockPos::new(0, 0, 0),
            Direction::South,
            FacingTable::Literal,
        );
        // South: lane 1 sits at x = -3, column 4 at z = 4.
        let at_lane_one: Vec<&PlacementInstruction> =
            out.iter().filter(|i| i.pos.x == -3 && i.pos.z == 4).collect();
        assert_eq!(at_lane_one.len(), 1);
        assert_eq!(
            *at_lane_one[0],
            PlacementInstruction::new(BlockPos::new(-3, 2, 4), Block::Solid(SUPPORT_MATERIAL))
        );
    }
}
