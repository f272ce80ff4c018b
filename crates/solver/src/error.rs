use std::path::PathBuf;

use thiserror::Error;

use crate::config::SolverKind;

/// Errors from solver interaction.
///
/// None of these abort a fuzzing run: adapters record them as
/// `Verdict::Error` for the backend that produced them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// Solver binary not found at the specified path.
    #[error("{0} binary not found at: {path}", path = .1.display())]
    NotFound(SolverKind, PathBuf),
    /// Process failed to start, crashed, or exited without an answer.
    #[error("solver process failed: {0}")]
    ProcessError(String),
    /// Failed to parse solver output.
    #[error("unparseable solver output: {0}")]
    ParseError(String),
    /// The solver answered with an `(error ...)` response.
    #[error("solver reported an error: {0}")]
    Reported(String),
}
