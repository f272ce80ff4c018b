//! Error types for the fuzzing engine.

use thiserror::Error;

use crate::expr::{BinaryOp, Sort, UnaryOp};

/// An attempt to build an ill-typed expression or test case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    #[error("operator `{op}` expects {expected} operand, found {found}")]
    Unary {
        op: UnaryOp,
        expected: Sort,
        found: Sort,
    },
    #[error("operator `{op}` expects ({expected}, {expected}) operands, found ({left}, {right})")]
    Binary {
        op: BinaryOp,
        expected: Sort,
        left: Sort,
        right: Sort,
    },
    #[error("assertion #{index} has sort {found}, expected Bool")]
    NonBooleanAssertion { index: usize, found: Sort },
    #[error("variable `{name}` is used but not declared")]
    UndeclaredVariable { name: String },
    #[error("variable `{name}` is declared twice")]
    DuplicateVariable { name: String },
}

/// The generator produced something it should not have.
///
/// Always a bug in the generator's operator tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("generator produced an ill-typed tree (seed {seed}): {source}")]
pub struct GenerationError {
    pub seed: u64,
    #[source]
    pub source: SortError,
}

/// Invalid run or generator configuration, reported before any generation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("no backends configured")]
    NoBackends,
    #[error("unknown backend `{0}` (expected z3, cvc5, yices or cmd:<program> [args])")]
    UnknownBackend(String),
    #[error("backend `{0}` listed more than once")]
    DuplicateBackend(String),
    #[error("backend `{name}` is unavailable: {reason}")]
    BackendUnavailable { name: String, reason: String },
    #[error("depth {depth} exceeds the maximum of {max}")]
    DepthTooLarge { depth: usize, max: usize },
    #[error("empty integer literal range [{min}, {max}]")]
    EmptyIntRange { min: i64, max: i64 },
    #[error("edge literal ratio {0} is outside [0, 1]")]
    RatioOutOfRange(f64),
    #[error("`{0}` must be greater than zero")]
    Zero(&'static str),
}

/// A campaign that could not run to completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_error_messages() {
        let err = SortError::Binary {
            op: BinaryOp::Add,
            expected: Sort::Integer,
            left: Sort::Integer,
            right: Sort::Boolean,
        };
        assert_eq!(
            err.to_string(),
            "operator `+` expects (Int, Int) operands, found (Int, Bool)"
        );

        let err = SortError::Unary {
            op: UnaryOp::Not,
            expected: Sort::Boolean,
            found: Sort::Integer,
        };
        assert_eq!(
            err.to_string(),
            "operator `not` expects Bool operand, found Int"
        );
    }

    #[test]
    fn generation_error_carries_seed() {
        let err = GenerationError {
            seed: 7,
            source: SortError::NonBooleanAssertion {
                index: 0,
                found: Sort::Integer,
            },
        };
        assert!(err.to_string().contains("seed 7"));
    }

    #[test]
    fn config_error_messages() {
        assert_eq!(
            ConfigError::Zero("iterations").to_string(),
            "`iterations` must be greater than zero"
        );
        assert_eq!(
            ConfigError::EmptyIntRange { min: 5, max: 1 }.to_string(),
            "empty integer literal range [5, 1]"
        );
    }
}
