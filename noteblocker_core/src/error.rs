// Error types for the conversion pipeline.
//
// Extraction, layout, and placement are pure and cannot fail on validated
// input. Failures come from three places only: an invalid tempo modifier
// (rejected when a `TempoModifier` is built), config loading, and the
// executor that carries out placements. Executor failures stop dispatch
// immediately; nothing already placed is undone.

use thiserror::Error;

/// A failure reported by an `Executor` for a single instruction.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("failed to write command: {0}")]
    Io(#[from] std::io::Error),

    #[error("instruction rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ConvertError {
    /// The tempo modifier must be a finite, strictly positive number.
    #[error("invalid tempo modifier {0}: must be finite and greater than zero")]
    InvalidTempoModifier(f64),

    /// Dispatch stopped at instruction `index`; earlier ones were executed.
    #[error("placement failed at instruction {index}")]
    Execute {
        index: usize,
        #[source]
        source: ExecuteError,
    },

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
