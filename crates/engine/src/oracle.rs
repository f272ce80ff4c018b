//! Differential oracle: run one test case on every backend and compare.
//!
//! # Classification
//!
//! | verdicts                                   | classification        |
//! |--------------------------------------------|-----------------------|
//! | some `sat` and some `unsat`                | strong disagreement   |
//! | otherwise a definite verdict next to an `unknown`/`error` | weak disagreement |
//! | all `sat`, all `unsat`, or all inconclusive | agreement            |
//!
//! Independently of the comparison, every `sat` model is checked against
//! the assertions. A model that falsifies an assertion is a soundness bug
//! in that backend even when all backends agree.

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use typefuzz_solver::Verdict;

use crate::adapter::{BackendVerdict, SolverAdapter};
use crate::case::TestCase;
use crate::eval::{Assignment, Value, eval};

/// How the verdicts of one case relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Agreement,
    WeakDisagreement,
    StrongDisagreement,
}

impl Classification {
    pub fn is_disagreement(self) -> bool {
        self != Classification::Agreement
    }
}

/// Classify a set of verdicts.
pub fn classify(verdicts: &[BackendVerdict]) -> Classification {
    let any = |pred: fn(&Verdict) -> bool| verdicts.iter().any(|v| pred(&v.verdict));

    if any(Verdict::is_sat) && any(Verdict::is_unsat) {
        Classification::StrongDisagreement
    } else if any(Verdict::is_definite) && any(|v: &Verdict| !v.is_definite()) {
        Classification::WeakDisagreement
    } else {
        Classification::Agreement
    }
}

/// A `sat` model under which an assertion evaluates to false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelViolation {
    pub backend: String,
    pub assertion_index: usize,
}

/// Result of checking one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseOutcome {
    Classified(Classification),
    /// A backend call was cancelled, so the verdict set is incomplete.
    Interrupted,
}

/// Everything the oracle learned about one test case.
#[derive(Debug, Clone)]
pub struct CaseReport {
    pub case: TestCase,
    pub verdicts: Vec<BackendVerdict>,
    pub outcome: CaseOutcome,
    pub violations: Vec<ModelViolation>,
}

impl CaseReport {
    pub fn classification(&self) -> Option<Classification> {
        match self.outcome {
            CaseOutcome::Classified(c) => Some(c),
            CaseOutcome::Interrupted => None,
        }
    }

    /// A disagreement or a model violation.
    pub fn is_finding(&self) -> bool {
        self.classification()
            .is_some_and(Classification::is_disagreement)
            || !self.violations.is_empty()
    }
}

/// Drives adapters through a case and classifies the result.
#[derive(Debug, Clone, Copy)]
pub struct Oracle {
    validate_models: bool,
}

impl Default for Oracle {
    fn default() -> Self {
        Self {
            validate_models: true,
        }
    }
}

impl Oracle {
    pub fn new(validate_models: bool) -> Self {
        Self { validate_models }
    }

    /// Run `case` on every adapter in parallel and classify the verdicts.
    ///
    /// Returns only after every adapter has answered, timed out, or been
    /// cancelled.
    pub fn run(&self, case: &TestCase, adapters: &mut [Box<dyn SolverAdapter>]) -> CaseReport {
        let verdicts: Vec<BackendVerdict> = adapters
            .par_iter_mut()
            .map(|adapter| check_one(adapter.as_mut(), case))
            .collect();

        if verdicts.iter().any(|v| v.verdict.is_cancelled()) {
            tracing::debug!(seed = case.seed(), "case interrupted by cancellation");
            return CaseReport {
                case: case.clone(),
                verdicts,
                outcome: CaseOutcome::Interrupted,
                violations: Vec::new(),
            };
        }

        let classification = classify(&verdicts);
        let violations = if self.validate_models {
            find_violations(case, &verdicts)
        } else {
            Vec::new()
        };

        CaseReport {
            case: case.clone(),
            verdicts,
            outcome: CaseOutcome::Classified(classification),
            violations,
        }
    }
}

fn check_one(adapter: &mut dyn SolverAdapter, case: &TestCase) -> BackendVerdict {
    let start = Instant::now();
    adapter.reset();
    for variable in case.variables() {
        adapter.declare(variable);
    }
    for assertion in case.assertions() {
        adapter.assert(assertion);
    }
    let verdict = adapter.check_sat();
    let elapsed = start.elapsed();

    tracing::debug!(
        backend = adapter.name(),
        seed = case.seed(),
        %verdict,
        elapsed_ms = elapsed.as_millis() as u64,
        "backend answered"
    );
    BackendVerdict {
        backend: adapter.name().to_string(),
        verdict,
        elapsed,
    }
}

/// Check every `sat` model against the case's assertions.
///
/// Assertions that cannot be evaluated under a model are skipped.
pub fn find_violations(case: &TestCase, verdicts: &[BackendVerdict]) -> Vec<ModelViolation> {
    let mut violations = Vec::new();
    for verdict in verdicts {
        let Some(model) = verdict.verdict.model() else {
            continue;
        };
        let assignment = Assignment::from_model(model);
        for (index, assertion) in case.assertions().iter().enumerate() {
            if eval(assertion, &assignment) == Some(Value::Bool(false)) {
                tracing::warn!(
                    backend = %verdict.backend,
                    seed = case.seed(),
                    assertion = index,
                    "model falsifies assertion"
                );
                violations.push(ModelViolation {
                    backend: verdict.backend.clone(),
                    assertion_index: index,
                });
            }
        }
    }
    violations
}
