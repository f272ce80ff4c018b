//! Which solver program to run and how to invoke it.

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::SolverError;

/// Directories searched after `PATH` comes up empty.
const FALLBACK_DIRS: &[&str] = &["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin"];

/// Solvers with built-in command lines, plus `Custom` for anything else that
/// reads SMT-LIB2 on stdin and prints `sat`/`unsat`/`unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverKind {
    Z3,
    Cvc5,
    Yices,
    Custom,
}

impl SolverKind {
    /// Short name, as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            SolverKind::Z3 => "z3",
            SolverKind::Cvc5 => "cvc5",
            SolverKind::Yices => "yices",
            SolverKind::Custom => "custom",
        }
    }

    /// Executable looked up when no explicit path is given.
    pub fn program(self) -> &'static str {
        match self {
            // the plain `yices` binary speaks its own language, not SMT-LIB2
            SolverKind::Yices => "yices-smt2",
            kind => kind.name(),
        }
    }

    /// Flags that put the solver into incremental stdin mode.
    fn base_args(self) -> &'static [&'static str] {
        match self {
            SolverKind::Z3 => &["-in"],
            SolverKind::Cvc5 => &["--lang", "smt2", "--produce-models", "--incremental"],
            SolverKind::Yices => &["--incremental"],
            SolverKind::Custom => &[],
        }
    }

    /// The solver's own soft limit. The hard limit is the adapter killing
    /// the process, so a `Custom` program without one is still bounded.
    pub fn limit_arg(self, timeout_ms: u64) -> Option<String> {
        match (self, timeout_ms) {
            (_, 0) | (SolverKind::Custom, _) => None,
            (SolverKind::Z3, ms) => Some(format!("-t:{ms}")),
            (SolverKind::Cvc5, ms) => Some(format!("--tlimit-per={ms}")),
            // whole seconds only
            (SolverKind::Yices, ms) => Some(format!("--timeout={}", ms.div_ceil(1000))),
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SolverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "z3" => Ok(SolverKind::Z3),
            "cvc5" => Ok(SolverKind::Cvc5),
            "yices" | "yices2" | "yices-smt2" => Ok(SolverKind::Yices),
            _ => Err(format!("unknown solver `{s}` (expected z3, cvc5 or yices)")),
        }
    }
}

/// One resolved solver invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub kind: SolverKind,
    pub program: PathBuf,
    /// Per `check-sat` limit in milliseconds; 0 disables it.
    pub timeout_ms: u64,
    /// Appended after the built-in flags.
    pub args: Vec<String>,
    /// Send `(get-model)` after a `sat` answer.
    pub produce_models: bool,
}

impl SolverConfig {
    pub fn new(kind: SolverKind, program: PathBuf) -> Self {
        Self {
            kind,
            program,
            timeout_ms: 0,
            args: Vec::new(),
            produce_models: true,
        }
    }

    /// Find the executable for a built-in solver.
    pub fn locate(kind: SolverKind) -> Result<Self, SolverError> {
        let program = kind.program();
        find_program(program, env::var_os("PATH"), true)
            .map(|path| Self::new(kind, path))
            .ok_or_else(|| SolverError::NotFound(kind, PathBuf::from(program)))
    }

    /// An arbitrary program. Anything without a directory part is looked up
    /// on `PATH`.
    pub fn custom(program: &str, args: Vec<String>) -> Result<Self, SolverError> {
        let program = if Path::new(program).components().count() > 1 {
            PathBuf::from(program)
        } else {
            find_program(program, env::var_os("PATH"), false)
                .ok_or_else(|| SolverError::NotFound(SolverKind::Custom, PathBuf::from(program)))?
        };
        Ok(Self {
            args,
            ..Self::new(SolverKind::Custom, program)
        })
    }

    pub fn with_timeout(self, timeout_ms: u64) -> Self {
        Self { timeout_ms, ..self }
    }

    pub fn with_models(self, produce_models: bool) -> Self {
        Self {
            produce_models,
            ..self
        }
    }

    /// Arguments passed to the program, in order.
    pub fn command_line(&self) -> Vec<String> {
        self.kind
            .base_args()
            .iter()
            .map(|a| a.to_string())
            .chain(self.kind.limit_arg(self.timeout_ms))
            .chain(self.args.iter().cloned())
            .collect()
    }

    pub fn validate(&self) -> Result<(), SolverError> {
        if self.program.exists() {
            Ok(())
        } else {
            Err(SolverError::NotFound(self.kind, self.program.clone()))
        }
    }
}

/// `search_path` first (executables only), then the install prefixes.
fn find_program(
    name: &str,
    search_path: Option<OsString>,
    use_fallbacks: bool,
) -> Option<PathBuf> {
    let on_path = search_path.and_then(|paths| which::which_in(name, Some(paths), ".").ok());
    if on_path.is_some() {
        return on_path;
    }
    if !use_fallbacks {
        return None;
    }
    FALLBACK_DIRS
        .iter()
        .map(|dir| Path::new(dir).join(name))
        .find(|candidate| candidate.is_file())
}
