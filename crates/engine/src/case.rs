use std::collections::HashSet;

use typefuzz_smtlib::{Command, Script};

use crate::encode;
use crate::error::SortError;
use crate::expr::{Expr, Sort, Variable};

/// One generated input: declared variables plus ordered Boolean assertions.
///
/// A `TestCase` always type-checks: every assertion is Boolean and every
/// variable it mentions is declared exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    seed: u64,
    depth: usize,
    variables: Vec<Variable>,
    assertions: Vec<Expr>,
}

impl TestCase {
    pub fn new(
        seed: u64,
        depth: usize,
        variables: Vec<Variable>,
        assertions: Vec<Expr>,
    ) -> Result<Self, SortError> {
        let mut declared = HashSet::new();
        for variable in &variables {
            if !declared.insert(variable.name()) {
                return Err(SortError::DuplicateVariable {
                    name: variable.name().to_string(),
                });
            }
        }

        for (index, assertion) in assertions.iter().enumerate() {
            if assertion.sort() != Sort::Boolean {
                return Err(SortError::NonBooleanAssertion {
                    index,
                    found: assertion.sort(),
                });
            }
            if let Some(missing) = assertion
                .variables()
                .into_iter()
                .find(|v| !variables.contains(*v))
            {
                return Err(SortError::UndeclaredVariable {
                    name: missing.name().to_string(),
                });
            }
        }

        Ok(Self {
            seed,
            depth,
            variables,
            assertions,
        })
    }

    /// Seed that regenerates this case.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn assertions(&self) -> &[Expr] {
        &self.assertions
    }

    /// Largest assertion height.
    pub fn height(&self) -> usize {
        self.assertions.iter().map(Expr::height).max().unwrap_or(0)
    }

    /// Self-contained SMT-LIB2 script, ending with `(check-sat)` and, when
    /// `produce_models` is set, `(get-model)`.
    pub fn to_script(&self, produce_models: bool) -> Script {
        let mut script = encode::script(&self.variables, &self.assertions, produce_models);
        script.push(Command::CheckSat);
        if produce_models {
            script.push(Command::GetModel);
        }
        script
    }

    /// Reproduction script text with a header naming the seed.
    pub fn render(&self, produce_models: bool) -> String {
        let mut script = Script::new();
        script.push(Command::Comment(format!(
            "typefuzz case seed={} depth={}",
            self.seed, self.depth
        )));
        script.extend(self.to_script(produce_models).into_commands());
        script.to_string()
    }
}
