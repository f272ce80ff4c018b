//! Uniform interface between the oracle and solver backends.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use typefuzz_solver::{
    CancellationToken, SolverBackend, SolverConfig, SolverError, SolverKind, Verdict,
    create_backend,
};

use crate::encode;
use crate::error::ConfigError;
use crate::expr::{Expr, Variable};

/// One backend's session for a single test case.
///
/// The oracle calls `reset`, then `declare` for every variable, `assert` for
/// every assertion, and finally `check_sat`. Failures never escape:
/// crashes, malformed output and the like come back as
/// [`Verdict::Error`], timeouts as [`Verdict::Unknown`].
pub trait SolverAdapter: Send {
    fn name(&self) -> &str;
    fn reset(&mut self);
    fn declare(&mut self, variable: &Variable);
    fn assert(&mut self, expr: &Expr);
    fn check_sat(&mut self) -> Verdict;
}

/// Creates a fresh adapter per test case so adapters never share state.
pub trait AdapterFactory: Send + Sync {
    fn name(&self) -> &str;
    fn create(&self, cancel: &CancellationToken) -> Box<dyn SolverAdapter>;
}

/// A verdict tagged with its backend and wall-clock cost.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendVerdict {
    pub backend: String,
    pub verdict: Verdict,
    pub elapsed: Duration,
}

/// Adapter that accumulates an SMT-LIB2 script and runs it on a
/// [`SolverBackend`] at `check_sat`.
pub struct SmtLibAdapter {
    name: String,
    backend: Arc<dyn SolverBackend>,
    cancel: CancellationToken,
    produce_models: bool,
    variables: Vec<Variable>,
    assertions: Vec<Expr>,
}

impl SmtLibAdapter {
    pub fn new(
        name: impl Into<String>,
        backend: Arc<dyn SolverBackend>,
        cancel: CancellationToken,
        produce_models: bool,
    ) -> Self {
        Self {
            name: name.into(),
            backend,
            cancel,
            produce_models,
            variables: Vec::new(),
            assertions: Vec::new(),
        }
    }
}

impl SolverAdapter for SmtLibAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) {
        self.variables.clear();
        self.assertions.clear();
    }

    fn declare(&mut self, variable: &Variable) {
        if !self.variables.contains(variable) {
            self.variables.push(variable.clone());
        }
    }

    fn assert(&mut self, expr: &Expr) {
        self.assertions.push(expr.clone());
    }

    fn check_sat(&mut self) -> Verdict {
        let script = encode::script(&self.variables, &self.assertions, self.produce_models);
        match self.backend.check_sat(&script, &self.cancel) {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!(backend = %self.name, "backend failed: {e}");
                Verdict::Error(e.to_string())
            }
        }
    }
}

/// Builds [`SmtLibAdapter`]s sharing one backend.
pub struct SmtLibAdapterFactory {
    name: String,
    backend: Arc<dyn SolverBackend>,
    produce_models: bool,
}

impl SmtLibAdapterFactory {
    pub fn new(
        name: impl Into<String>,
        backend: Arc<dyn SolverBackend>,
        produce_models: bool,
    ) -> Self {
        Self {
            name: name.into(),
            backend,
            produce_models,
        }
    }
}

impl AdapterFactory for SmtLibAdapterFactory {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&self, cancel: &CancellationToken) -> Box<dyn SolverAdapter> {
        Box::new(SmtLibAdapter::new(
            self.name.clone(),
            Arc::clone(&self.backend),
            cancel.clone(),
            self.produce_models,
        ))
    }
}

/// A backend named on the command line: `z3`, `cvc5`, `yices`, or
/// `cmd:<program> [args...]` for any stdin-driven SMT-LIB2 program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendSpec {
    Builtin(SolverKind),
    Command { program: String, args: Vec<String> },
}

impl BackendSpec {
    /// Display name, unique per distinct backend.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Locate the binary and build a factory for it.
    pub fn resolve(
        &self,
        timeout_ms: u64,
        produce_models: bool,
    ) -> Result<SmtLibAdapterFactory, ConfigError> {
        let unavailable = |e: SolverError| ConfigError::BackendUnavailable {
            name: self.name(),
            reason: e.to_string(),
        };
        let config = match self {
            BackendSpec::Builtin(kind) => SolverConfig::locate(*kind),
            BackendSpec::Command { program, args } => SolverConfig::custom(program, args.clone()),
        }
        .map_err(unavailable)?
        .with_timeout(timeout_ms)
        .with_models(produce_models);

        let backend = create_backend(config).map_err(unavailable)?;
        Ok(SmtLibAdapterFactory::new(self.name(), backend, produce_models))
    }
}

impl fmt::Display for BackendSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendSpec::Builtin(kind) => f.write_str(kind.name()),
            BackendSpec::Command { program, args } => {
                write!(f, "cmd:{program}")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for BackendSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(command) = s.strip_prefix("cmd:") {
            let mut words = command.split_whitespace().map(str::to_string);
            let program = words
                .next()
                .ok_or_else(|| ConfigError::UnknownBackend(s.to_string()))?;
            return Ok(BackendSpec::Command {
                program,
                args: words.collect(),
            });
        }
        s.parse::<SolverKind>()
            .map(BackendSpec::Builtin)
            .map_err(|_| ConfigError::UnknownBackend(s.to_string()))
    }
}

/// Parse, de-duplicate and resolve a backend list.
///
/// Fails on an empty list, an unknown or repeated name, or a binary that
/// cannot be found. A single backend is allowed; it still exercises model
/// validation.
pub fn resolve_backends(
    specs: &[BackendSpec],
    timeout_ms: u64,
    produce_models: bool,
) -> Result<Vec<Arc<dyn AdapterFactory>>, ConfigError> {
    if specs.is_empty() {
        return Err(ConfigError::NoBackends);
    }
    for (i, spec) in specs.iter().enumerate() {
        if specs[..i].contains(spec) {
            return Err(ConfigError::DuplicateBackend(spec.name()));
        }
    }
    let mut factories: Vec<Arc<dyn AdapterFactory>> = Vec::with_capacity(specs.len());
    for spec in specs {
        factories.push(Arc::new(spec.resolve(timeout_ms, produce_models)?));
    }
    if factories.len() < 2 {
        tracing::warn!("only one backend configured; only model validation can find bugs");
    }
    Ok(factories)
}
