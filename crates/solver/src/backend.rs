//! Abstraction over SMT solver backends.
//!
//! Callers hold a `dyn SolverBackend` so that subprocess solvers and
//! in-process test doubles are interchangeable.

use std::sync::Arc;

use typefuzz_smtlib::script::Script;

use crate::cancel::CancellationToken;
use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::result::Verdict;
use crate::solver::CliSolver;

/// Trait abstracting over different SMT solver backends.
///
/// Implementations must be callable from several threads at once.
pub trait SolverBackend: Send + Sync {
    /// Check satisfiability of the given SMT script.
    ///
    /// Returns:
    /// - `Ok(Verdict::Sat(model))` if satisfiable
    /// - `Ok(Verdict::Unsat)` if unsatisfiable
    /// - `Ok(Verdict::Unknown(reason))` on timeout, cancellation or an
    ///   inconclusive solver answer
    /// - `Err(SolverError)` if the invocation itself failed
    fn check_sat(&self, script: &Script, cancel: &CancellationToken)
    -> Result<Verdict, SolverError>;
}

impl SolverBackend for CliSolver {
    fn check_sat(
        &self,
        script: &Script,
        cancel: &CancellationToken,
    ) -> Result<Verdict, SolverError> {
        CliSolver::check_sat(self, script, cancel)
    }
}

/// Create a shareable backend for the given configuration.
///
/// Fails if the configured binary does not exist.
pub fn create_backend(config: SolverConfig) -> Result<Arc<dyn SolverBackend>, SolverError> {
    config.validate()?;
    tracing::debug!(
        "Using {} subprocess backend at {}",
        config.kind,
        config.program.display()
    );
    Ok(Arc::new(CliSolver::new(config)))
}
