use std::fmt;

use crate::model::Model;

/// Why a solver answer is inconclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownReason {
    /// The per-call timeout elapsed (ours or the solver's own).
    Timeout,
    /// The run was cancelled while the call was in flight.
    Cancelled,
    /// The solver answered `unknown` for its own reason.
    Solver(String),
}

impl fmt::Display for UnknownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownReason::Timeout => write!(f, "timeout"),
            UnknownReason::Cancelled => write!(f, "cancelled"),
            UnknownReason::Solver(reason) => write!(f, "{reason}"),
        }
    }
}

/// A backend's satisfiability answer for one script.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Satisfiable, with the model when one was requested and parsed.
    Sat(Option<Model>),
    /// Unsatisfiable.
    Unsat,
    /// Solver couldn't determine (timeout, cancellation, resource limit, etc.).
    Unknown(UnknownReason),
    /// The backend crashed, could not be started, or produced malformed output.
    Error(String),
}

impl Verdict {
    /// A `sat` answer, with or without a model.
    pub fn is_sat(&self) -> bool {
        matches!(self, Verdict::Sat(_))
    }

    pub fn is_unsat(&self) -> bool {
        matches!(self, Verdict::Unsat)
    }

    /// `Sat` or `Unsat`.
    pub fn is_definite(&self) -> bool {
        self.is_sat() || self.is_unsat()
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Verdict::Unknown(UnknownReason::Cancelled))
    }

    /// The model of a `sat` answer, if one was returned.
    pub fn model(&self) -> Option<&Model> {
        match self {
            Verdict::Sat(Some(model)) => Some(model),
            _ => None,
        }
    }

    /// Short lowercase name: `sat`, `unsat`, `unknown` or `error`.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Sat(_) => "sat",
            Verdict::Unsat => "unsat",
            Verdict::Unknown(_) => "unknown",
            Verdict::Error(_) => "error",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Sat(_) | Verdict::Unsat => write!(f, "{}", self.label()),
            Verdict::Unknown(reason) => write!(f, "unknown ({reason})"),
            Verdict::Error(message) => write!(f, "error: {message}"),
        }
    }
}
