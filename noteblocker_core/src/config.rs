// Conversion configuration.
//
// `ConvertConfig` holds the knobs a user can turn for one conversion: tempo
// scaling, where and which way to build, which repeater facing table to use,
// and how fast to feed placements to the target. It loads from JSON; any
// field left out takes its default, so a config file only needs to name what
// it changes. Command-line flags are applied on top by the CLI.
//
// Layout constants (0.1-unit clock step, 3 onsets per group, 4-tick repeater
// cap, 3-block lane spacing) are not configurable; see `layout.rs` and
// `placement.rs`.

use crate::error::ConvertError;
use crate::event::TempoModifier;
use crate::placement::{BlockPos, Direction, FacingTable};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Divisor applied to every raw time delta (2.0 = twice as fast).
    pub tempo_modifier: TempoModifier,

    /// Repeater facing table. `corrected` compensates for servers that place
    /// repeaters backwards.
    pub facing_table: FacingTable,

    /// Pause after each dispatched placement, in milliseconds.
    pub command_delay_ms: u64,

    /// Where column 0 of lane 0 sits. Blocks occupy `origin.y` to `origin.y + 2`.
    pub origin: BlockPos,

    /// Direction the structure grows in as time advances.
    pub direction: Direction,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            tempo_modifier: TempoModifier::NORMAL,
            facing_table: FacingTable::Corrected,
            command_delay_ms: 0,
            origin: BlockPos::new(0, 0, 0),
            direction: Direction::South,
        }
    }
}

impl ConvertConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConvertError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConvertError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn command_delay(&self) -> Duration {
        Duration::from_millis(self.command_delay_ms)
    }
}
