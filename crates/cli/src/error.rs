//! Structured CLI errors with meaningful exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: simulation error (bad dimensions, view, timestep or radius)
//! - 11: I/O error (snapshot, seed file read or write)
//! - 12: input error (bad JSON params, malformed seed, unknown scenario)
//! - 13: serialization error

use ripple_core::SimError;
use thiserror::Error;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Sim(SimError),
    /// File read or write, snapshot encoding.
    #[error("{0}")]
    Io(String),
    /// Bad JSON params, malformed seed file, unknown scenario.
    #[error("{0}")]
    Input(String),
    #[error("{0}")]
    Serialization(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Sim(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl From<SimError> for CliError {
    fn from(e: SimError) -> Self {
        match e {
            SimError::Io(msg) => CliError::Io(msg),
            other => CliError::Sim(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
