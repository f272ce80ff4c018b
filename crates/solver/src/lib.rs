//! # typefuzz-solver
//!
//! SMT solver plumbing for typefuzz.
//!
//! Solvers are spawned as external processes and fed SMT-LIB2 text on stdin.
//! Every `check-sat` call is bounded by a wall-clock timeout and observes a
//! run-level [`CancellationToken`]; the child process is killed and reaped on
//! every exit path.
//!
//! ## Usage
//!
//! ```no_run
//! use typefuzz_solver::{CancellationToken, CliSolver, SolverKind, Verdict};
//!
//! let solver = CliSolver::locate(SolverKind::Z3).unwrap();
//! let verdict = solver.check_sat_raw("
//!     (declare-const x Int)
//!     (assert (> x 0))
//!     (assert (< x 10))
//!     (check-sat)
//!     (get-model)
//! ", &CancellationToken::new()).unwrap();
//!
//! match verdict {
//!     Verdict::Sat(model) => println!("SAT: {model:?}"),
//!     Verdict::Unsat => println!("UNSAT"),
//!     other => println!("inconclusive: {other}"),
//! }
//! ```

pub mod backend;
pub mod cancel;
pub mod config;
pub mod error;
pub mod model;
mod parser;
pub mod result;
pub mod solver;

// Re-export primary types for ergonomic use
pub use backend::{SolverBackend, create_backend};
pub use cancel::CancellationToken;
pub use config::{SolverConfig, SolverKind};
pub use error::SolverError;
pub use model::Model;
pub use result::{UnknownReason, Verdict};
pub use solver::CliSolver;
