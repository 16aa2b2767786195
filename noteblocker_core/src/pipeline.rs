// One conversion run.
//
// `Conversion::run` threads raw events through extraction, layout, and
// placement, keeping every intermediate product. All per-run state (channel
// programs, running time, the pending onset pool) lives inside those calls
// and ends with them; a `Conversion` is built fresh for every request and
// nothing is shared between runs.

use crate::config::ConvertConfig;
use crate::error::ConvertError;
use crate::event::{Frame, RawEvent};
use crate::execute::{Executor, dispatch};
use crate::extract::extract;
use crate::layout::{Structure, generate};
use crate::placement::{PlacementInstruction, place};
use std::time::Duration;
use tracing::info;

/// The products of one pipeline run.
#[derive(Clone, Debug)]
pub struct Conversion {
    pub frames: Vec<Frame>,
    pub structure: Structure,
    pub instructions: Vec<PlacementInstruction>,
}

impl Conversion {
    pub fn run(raw_events: &[RawEvent], config: &ConvertConfig) -> Self {
        let frames = extract(raw_events, config.tempo_modifier);
        let structure = generate(&frames);
        let instructions = place(
            &structure,
            config.origin,
            config.direction,
            config.facing_table,
        );
        info!(
            frames = frames.len(),
            lanes = structure.lane_count(),
            columns = structure.column_count(),
            instructions = instructions.len(),
            "conversion complete"
        );
        Self {
            frames,
            structure,
            instructions,
        }
    }

    /// Send every instruction to `executor`, in order, pausing `delay`
    /// between them. Stops at the first failure.
    pub fn build<E: Executor + ?Sized>(
        &self,
        executor: &mut E,
        delay: Duration,
    ) -> Result<usize, ConvertError> {
        dispatch(&self.instructions, executor, delay)
    }
}
