//! # typefuzz-engine
//!
//! Type-directed differential fuzzing of SMT solvers.
//!
//! - [`generator`]: seeded random generation of well-sorted test cases
//! - [`adapter`]: the [`SolverAdapter`] interface and its SMT-LIB2 implementation
//! - [`oracle`]: verdict comparison and model validation
//! - [`runner`]: parallel campaigns with time budget and early stop
//! - [`report`]: serializable findings and summary
//!
//! ```no_run
//! use typefuzz_engine::{BackendSpec, Campaign, CampaignConfig, resolve_backends};
//!
//! let config = CampaignConfig { seed: 42, iterations: 10, ..CampaignConfig::default() };
//! let specs: Vec<BackendSpec> = vec!["z3".parse().unwrap(), "cvc5".parse().unwrap()];
//! let backends = resolve_backends(&specs, config.timeout_ms, config.validate_models).unwrap();
//! let report = Campaign::new(config, backends).unwrap().run().unwrap();
//! println!("{} strong disagreements", report.summary.strong);
//! ```

pub mod adapter;
pub mod case;
pub mod encode;
pub mod error;
pub mod eval;
pub mod expr;
pub mod generator;
pub mod oracle;
pub mod report;
pub mod runner;

pub use adapter::{
    AdapterFactory, BackendSpec, BackendVerdict, SmtLibAdapter, SmtLibAdapterFactory,
    SolverAdapter, resolve_backends,
};
pub use case::TestCase;
pub use error::{ConfigError, GenerationError, RunError, SortError};
pub use expr::{BinaryOp, Expr, ExprKind, Literal, Sort, UnaryOp, Variable};
pub use generator::{Generator, GeneratorConfig, MAX_DEPTH, generate};
pub use oracle::{CaseOutcome, CaseReport, Classification, ModelViolation, Oracle, classify};
pub use report::{Finding, Report, Summary, VerdictRecord};
pub use runner::{Campaign, CampaignConfig};
