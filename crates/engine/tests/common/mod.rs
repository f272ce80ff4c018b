//! In-process adapters shared by the engine integration tests.
//!
//! `Reference` decides satisfiability by brute force over a small domain
//! (integers in `-3..=3`, both Booleans), so two instances always agree with
//! each other. `AlwaysSat` is a deliberately broken backend.

#![allow(dead_code)]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use typefuzz_engine::eval::{Assignment, Value, eval};
use typefuzz_engine::{AdapterFactory, Expr, Sort, SolverAdapter, Variable};
use typefuzz_solver::{CancellationToken, Model, UnknownReason, Verdict};

const DOMAIN: std::ops::RangeInclusive<i128> = -3..=3;

#[derive(Default)]
struct Session {
    variables: Vec<Variable>,
    assertions: Vec<Expr>,
}

impl Session {
    fn reset(&mut self) {
        self.variables.clear();
        self.assertions.clear();
    }
}

pub struct Reference {
    name: String,
    session: Session,
}

impl Reference {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            session: Session::default(),
        }
    }
}

/// Search every assignment over the bounded domain.
pub fn brute_force(variables: &[Variable], assertions: &[Expr]) -> Option<Assignment> {
    fn search(
        variables: &[Variable],
        assertions: &[Expr],
        assignment: &mut Assignment,
    ) -> bool {
        let Some((first, rest)) = variables.split_first() else {
            return assertions
                .iter()
                .all(|a| eval(a, assignment) == Some(Value::Bool(true)));
        };
        let values: Vec<Value> = match first.sort() {
            Sort::Integer => DOMAIN.map(Value::Int).collect(),
            Sort::Boolean => vec![Value::Bool(false), Value::Bool(true)],
        };
        for value in values {
            assignment.set(first.name(), value);
            if search(rest, assertions, assignment) {
                return true;
            }
        }
        false
    }

    let mut assignment = Assignment::new();
    search(variables, assertions, &mut assignment).then_some(assignment)
}

fn to_model(variables: &[Variable], assignment: &Assignment) -> Model {
    variables
        .iter()
        .filter_map(|v| {
            let text = match assignment.get(v.name())? {
                Value::Int(n) if n < 0 => format!("(- {})", n.unsigned_abs()),
                Value::Int(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
            };
            Some((v.name().to_string(), text))
        })
        .collect()
}

impl SolverAdapter for Reference {
    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) {
        self.session.reset();
    }

    fn declare(&mut self, variable: &Variable) {
        self.session.variables.push(variable.clone());
    }

    fn assert(&mut self, expr: &Expr) {
        self.session.assertions.push(expr.clone());
    }

    fn check_sat(&mut self) -> Verdict {
        match brute_force(&self.session.variables, &self.session.assertions) {
            Some(assignment) => Verdict::Sat(Some(to_model(&self.session.variables, &assignment))),
            None => Verdict::Unsat,
        }
    }
}

/// Claims every input is satisfiable.
pub struct AlwaysSat;

impl SolverAdapter for AlwaysSat {
    fn name(&self) -> &str {
        "always-sat"
    }
    fn reset(&mut self) {}
    fn declare(&mut self, _: &Variable) {}
    fn assert(&mut self, _: &Expr) {}
    fn check_sat(&mut self) -> Verdict {
        Verdict::Sat(None)
    }
}

/// Never answers until cancelled.
pub struct Hang {
    cancel: CancellationToken,
}

impl SolverAdapter for Hang {
    fn name(&self) -> &str {
        "hang"
    }
    fn reset(&mut self) {}
    fn declare(&mut self, _: &Variable) {}
    fn assert(&mut self, _: &Expr) {}
    fn check_sat(&mut self) -> Verdict {
        while !self.cancel.is_cancelled() {
            thread::sleep(Duration::from_millis(5));
        }
        Verdict::Unknown(UnknownReason::Cancelled)
    }
}

pub enum Kind {
    Reference,
    AlwaysSat,
    Hang,
}

pub struct Factory {
    name: String,
    kind: Kind,
}

impl AdapterFactory for Factory {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&self, cancel: &CancellationToken) -> Box<dyn SolverAdapter> {
        match self.kind {
            Kind::Reference => Box::new(Reference::new(&self.name)),
            Kind::AlwaysSat => Box::new(AlwaysSat),
            Kind::Hang => Box::new(Hang {
                cancel: cancel.clone(),
            }),
        }
    }
}

pub fn factory(name: &str, kind: Kind) -> Arc<dyn AdapterFactory> {
    Arc::new(Factory {
        name: name.to_string(),
        kind,
    })
}
