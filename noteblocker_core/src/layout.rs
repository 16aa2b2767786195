// Lane layout: frames -> parallel lanes of placement ops.
//
// The structure is a fixed number of parallel lanes. Each lane is a timeline
// of `LaneOp`s that the placer lays down one column at a time:
// - `NoteGroup`: up to three noteblocks played together.
// - `Placeholder`: a solid block that keeps a lane continuous in a column
//   where another lane plays notes.
// - `Delay(ticks)`: one repeater set to 1-4 ticks.
//
// Layout is a quantized simulation. A virtual clock starts at 0 and steps by
// 0.1 time units (one repeater tick). At each step, every pending onset whose
// scheduled time is strictly before the clock is due; due onsets are chunked
// into groups of three and dealt out to lanes in order, with placeholders for
// the lanes left over. Then every lane receives one tick of delay. Adjacent
// delay ticks compress into the lane's trailing repeater until it reaches 4,
// at which point a new repeater starts.
//
// Lane count is `ceil(max frame width / 3)`. Several frames can fall due on
// one step, so a step may have more groups than there are lanes; the groups
// past the last lane are dropped (and logged), never deferred.
//
// The simulation stops on the first step whose clock is past the latest
// scheduled time.
//
// The clock is derived from an integer step counter (`step / 10`) so long
// pieces do not accumulate floating-point drift.

use crate::event::{Frame, NoteEvent};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

/// Clock steps per time unit. One step is one repeater tick.
pub const STEPS_PER_UNIT: f64 = 10.0;

/// Maximum onsets in one note group (one lane, one column).
pub const LANE_CAPACITY: usize = 3;

/// Maximum delay of a single repeater.
pub const MAX_DELAY_TICKS: u8 = 4;

/// The onsets of one note group; never more than `LANE_CAPACITY`.
pub type NoteGroup = SmallVec<[NoteEvent; LANE_CAPACITY]>;

/// One unit of a lane's timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LaneOp {
    NoteGroup(NoteGroup),
    Placeholder,
    Delay(u8),
}

/// One parallel timeline of the structure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    ops: Vec<LaneOp>,
}

impl Lane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[LaneOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Append a note group of 1-3 onsets.
    ///
    /// # Panics
    /// If the group is empty or larger than `LANE_CAPACITY`.
    pub fn add_group(&mut self, events: &[NoteEvent]) {
        assert!(
            !events.is_empty() && events.len() <= LANE_CAPACITY,
            "note group must hold 1-{LANE_CAPACITY} events, got {}",
            events.len()
        );
        self.ops.push(LaneOp::NoteGroup(events.iter().copied().collect()));
    }

    pub fn add_placeholder(&mut self) {
        self.ops.push(LaneOp::Placeholder);
    }

    /// Append `ticks` of delay, topping up a trailing repeater first and
    /// opening new repeaters of at most `MAX_DELAY_TICKS` for the rest.
    pub fn add_delay(&mut self, ticks: u32) {
        let mut remaining = ticks;
        if let Some(LaneOp::Delay(current)) = self.ops.last_mut() {
            let room = u32::from(MAX_DELAY_TICKS.saturating_sub(*current));
            let take = room.min(remaining);
            // `take` fits: it is at most MAX_DELAY_TICKS.
            *current += take as u8;
            remaining -= take;
        }
        while remaining > 0 {
            let take = remaining.min(u32::from(MAX_DELAY_TICKS));
            self.ops.push(LaneOp::Delay(take as u8));
            remaining -= take;
        }
    }

    /// Total repeater ticks in this lane.
    pub fn total_delay_ticks(&self) -> u32 {
        self.ops
            .iter()
            .map(|op| match op {
                LaneOp::Delay(ticks) => u32::from(*ticks),
                _ => 0,
            })
            .sum()
    }
}

/// The complete set of lanes for one piece.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    lanes: Vec<Lane>,
}

impl Structure {
    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Number of columns: the length of the longest lane.
    pub fn column_count(&self) -> usize {
        self.lanes.iter().map(Lane::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}

/// Lane count needed for a widest frame of `max_frame_width` onsets.
pub fn lane_count_for(max_frame_width: usize) -> usize {
    max_frame_width.div_ceil(LANE_CAPACITY)
}

/// Lay out frames into lanes. Frames must be in non-decreasing time order,
/// as produced by `extract`.
pub fn generate(frames: &[Frame]) -> Structure {
    let max_width = frames.iter().map(Frame::width).max().unwrap_or(0);
    let lane_count = lane_count_for(max_width);
    if lane_count == 0 {
        debug!("no onsets to lay out");
        return Structure::default();
    }

    let pool: Vec<NoteEvent> = frames.iter().flat_map(|f| f.events.iter().copied()).collect();
    let max_time = pool
        .iter()
        .map(|e| e.scheduled_time)
        .fold(f64::NEG_INFINITY, f64::max);
    let step_capacity = lane_count * LANE_CAPACITY;

    let mut lanes = vec![Lane::new(); lane_count];
    let mut next = 0;
    let mut step: u64 = 0;
    let mut dropped = 0;

    loop {
        let clock = step as f64 / STEPS_PER_UNIT;

        let due_end = next
            + pool[next..]
                .iter()
                .take_while(|e| e.scheduled_time < clock)
                .count();
        let due = &pool[next..due_end];
        next = due_end;

        if !due.is_empty() {
            trace!(step, due = due.len(), "dealing note groups");
            if due.len() > step_capacity {
                let lost = due.len() - step_capacity;
                warn!(step, dropped = lost, "more note groups than lanes; dropping the rest");
                dropped += lost;
            }
            let mut groups = due.chunks(LANE_CAPACITY);
            for lane in &mut lanes {
                match groups.next() {
                    Some(group) => lane.add_group(group),
                    None => lane.add_placeholder(),
                }
            }
        }

        for lane in &mut lanes {
            lane.add_delay(1);
        }

        if clock > max_time {
            break;
        }
        step += 1;
    }

    debug!(
        lanes = lane_count,
        columns = lanes.iter().map(Lane::len).max().unwrap_or(0),
        steps = step + 1,
        dropped,
        "generated lane layout"
    );
    Structure { lanes }
}
