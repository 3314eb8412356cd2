//! Crate-level error type.

use crate::cp::ModelError;
use crate::roster::InputShapeError;
use std::path::PathBuf;

/// Errors raised before or around a solve.
///
/// Infeasible and inconclusive solves are not errors; see
/// [`RosterOutcome`](crate::roster::RosterOutcome).
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error(transparent)]
    InputShape(#[from] InputShapeError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid model: {0}")]
    Model(#[from] ModelError),

    #[error("the solver rejected the model")]
    SolverRejected,

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
