// Executing placements against a target.
//
// The `Executor` trait is the single capability the pipeline needs from the
// outside world: carry out one placement, synchronously, before returning.
// `dispatch` feeds instructions to an executor strictly in order, optionally
// sleeping between them to respect the target's throughput. The first
// failure stops dispatch and is returned with its index; already-placed
// blocks stay placed.
//
// Provided executors:
// - `CommandWriter`: writes one `setblock` command per line to any
//   `io::Write` (a server console pipe, a `.mcfunction` file, stdout),
//   flushing after every command so a live target sees each one promptly.
// - `Recorder`: collects instructions in memory (dry runs, tests).

use crate::error::{ConvertError, ExecuteError};
use crate::placement::PlacementInstruction;
use std::io::Write;
use std::time::Duration;
use tracing::{trace, warn};

/// Something that can carry out one placement.
pub trait Executor {
    fn execute(&mut self, instruction: &PlacementInstruction) -> Result<(), ExecuteError>;
}

/// Writes each instruction as a `setblock` command line.
pub struct CommandWriter<W: Write> {
    writer: W,
}

impl<W: Write> CommandWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Executor for CommandWriter<W> {
    fn execute(&mut self, instruction: &PlacementInstruction) -> Result<(), ExecuteError> {
        writeln!(self.writer, "{}", instruction.to_command())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps every instruction it is given.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    pub instructions: Vec<PlacementInstruction>,
}

impl Executor for Recorder {
    fn execute(&mut self, instruction: &PlacementInstruction) -> Result<(), ExecuteError> {
        self.instructions.push(*instruction);
        Ok(())
    }
}

/// Execute instructions in order. Returns the number executed.
pub fn dispatch<E: Executor + ?Sized>(
    instructions: &[PlacementInstruction],
    executor: &mut E,
    delay: Duration,
) -> Result<usize, ConvertError> {
    for (index, instruction) in instructions.iter().enumerate() {
        trace!(index, command = %instruction.to_command(), "dispatch");
        if let Err(source) = executor.execute(instruction) {
            warn!(index, error = %source, "placement failed; stopping");
            return Err(ConvertError::Execute { index, source });
        }
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
    Ok(instructions.len())
}
