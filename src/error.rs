//! Error types shared by the price series engine.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while loading, synthesizing, resampling, or assembling price series.
#[derive(Debug, Error)]
pub enum PriceError {
    /// A caller-supplied series does not cover the simulation horizon.
    #[error(
        "provided {series} data do not match the number of timesteps in the simulation horizon \
         (number of timesteps: {expected}, length of price data: {actual})"
    )]
    Configuration {
        series: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A packaged reference dataset could not be read.
    #[error("cannot read reference data \"{}\": {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A packaged reference dataset has an unparsable row.
    #[error("malformed reference data \"{}\" at line {line}: {message}", path.display())]
    MalformedData {
        path: PathBuf,
        line: u64,
        message: String,
    },

    /// Programming error, e.g. an unknown resampling mode.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A requested window extends past the end of a resampled series.
    #[error("requested timesteps {offset}..{end} exceed the available {available} samples")]
    IndexOutOfRange {
        offset: usize,
        end: usize,
        available: usize,
    },
}

/// Invalid timer construction parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("`step_size` must be a positive factor of 3600 (1h), got {0}")]
    StepSize(u32),

    #[error(
        "the difference from the start of the simulation to the beginning of the year \
         must be a multiple of `step_size` ({step_size}s)"
    )]
    Misaligned { step_size: u32 },

    #[error("`op_horizon` must be > 0")]
    EmptyHorizon,
}
