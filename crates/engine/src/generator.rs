//! Seeded, type-directed random generation of test cases.
//!
//! Generation is recursive descent over the requested sort. At remaining
//! depth `d > 0` a terminal is emitted with probability `1 / (d + 1)`;
//! otherwise an operator whose result sort matches is picked uniformly and
//! each operand is generated at `d - 1`. Depth 0 always yields a terminal,
//! so every tree has height at most the depth bound.
//!
//! Every node is built through the checked [`Expr`] constructors. The same
//! `(config, seed)` pair always yields the same [`TestCase`].
//!
//! Expected tree size grows by roughly 1.7x per level, so the depth bound is
//! capped at [`MAX_DEPTH`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::case::TestCase;
use crate::error::{ConfigError, GenerationError, SortError};
use crate::expr::{BinaryOp, Expr, Sort, UnaryOp, Variable};

/// Integer literals that commonly expose overflow and sign bugs.
pub const EDGE_LITERALS: [i64; 8] = [
    0,
    1,
    -1,
    i32::MAX as i64,
    i32::MIN as i64,
    i32::MAX as i64 + 1,
    i64::MAX,
    i64::MIN,
];

/// Largest accepted depth bound. A depth-24 case already averages around
/// half a million nodes.
pub const MAX_DEPTH: usize = 24;

/// Shape of the generated test cases.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratorConfig {
    /// Maximum assertion height.
    pub depth: usize,
    /// Inclusive range for ordinary integer literals.
    pub int_min: i64,
    pub int_max: i64,
    /// Assertions per test case.
    pub assertions: usize,
    /// Size of the `x0..` Integer variable pool.
    pub int_vars: usize,
    /// Size of the `b0..` Boolean variable pool.
    pub bool_vars: usize,
    /// Probability that an integer literal comes from [`EDGE_LITERALS`].
    pub edge_literal_ratio: f64,
    /// Generate `div` and `mod`.
    pub division: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            depth: 3,
            int_min: -100,
            int_max: 100,
            assertions: 3,
            int_vars: 3,
            bool_vars: 2,
            edge_literal_ratio: 0.0,
            division: false,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth > MAX_DEPTH {
            return Err(ConfigError::DepthTooLarge {
                depth: self.depth,
                max: MAX_DEPTH,
            });
        }
        if self.int_min > self.int_max {
            return Err(ConfigError::EmptyIntRange {
                min: self.int_min,
                max: self.int_max,
            });
        }
        if !(0.0..=1.0).contains(&self.edge_literal_ratio) {
            return Err(ConfigError::RatioOutOfRange(self.edge_literal_ratio));
        }
        if self.assertions == 0 {
            return Err(ConfigError::Zero("assertions"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Operator {
    Unary(UnaryOp),
    Binary(BinaryOp),
}

/// Test case generator for a fixed configuration.
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
    int_ops: Vec<Operator>,
    bool_ops: Vec<Operator>,
    int_vars: Vec<Variable>,
    bool_vars: Vec<Variable>,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: GeneratorConfig) -> Self {
        let ops_for = |sort: Sort| -> Vec<Operator> {
            let unary = UnaryOp::ALL
                .into_iter()
                .filter(|op| op.result_sort() == sort)
                .map(Operator::Unary);
            let binary = BinaryOp::ALL
                .into_iter()
                .filter(|op| op.result_sort() == sort)
                .filter(|op| config.division || !op.is_division())
                .map(Operator::Binary);
            unary.chain(binary).collect()
        };
        let pool = |prefix: &str, count: usize, sort: Sort| -> Vec<Variable> {
            (0..count)
                .map(|i| Variable::new(format!("{prefix}{i}"), sort))
                .collect()
        };

        Self {
            int_ops: ops_for(Sort::Integer),
            bool_ops: ops_for(Sort::Boolean),
            int_vars: pool("x", config.int_vars, Sort::Integer),
            bool_vars: pool("b", config.bool_vars, Sort::Boolean),
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the test case for `seed`.
    pub fn generate(&self, seed: u64) -> Result<TestCase, GenerationError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let depth = self.config.depth;
        let into_generation_error = |source: SortError| GenerationError { seed, source };

        let assertions = (0..self.config.assertions)
            .map(|_| self.expr(&mut rng, Sort::Boolean, depth))
            .collect::<Result<Vec<_>, _>>()
            .map_err(into_generation_error)?;

        let variables = self.int_vars.iter().chain(&self.bool_vars).cloned().collect();
        TestCase::new(seed, depth, variables, assertions).map_err(into_generation_error)
    }

    fn expr(&self, rng: &mut StdRng, sort: Sort, depth: usize) -> Result<Expr, SortError> {
        if depth == 0 || rng.gen_bool(1.0 / (depth as f64 + 1.0)) {
            return Ok(self.terminal(rng, sort));
        }

        let ops = match sort {
            Sort::Integer => &self.int_ops,
            Sort::Boolean => &self.bool_ops,
        };
        match ops[rng.gen_range(0..ops.len())] {
            Operator::Unary(op) => {
                let (operand_sort, _) = op.signature();
                let operand = self.expr(rng, operand_sort, depth - 1)?;
                Expr::unary(op, operand)
            }
            Operator::Binary(op) => {
                let operand_sort = op.operand_sort();
                let left = self.expr(rng, operand_sort, depth - 1)?;
                let right = self.expr(rng, operand_sort, depth - 1)?;
                Expr::binary(op, left, right)
            }
        }
    }

    fn terminal(&self, rng: &mut StdRng, sort: Sort) -> Expr {
        let pool = match sort {
            Sort::Integer => &self.int_vars,
            Sort::Boolean => &self.bool_vars,
        };
        if !pool.is_empty() && rng.gen_bool(0.5) {
            return Expr::var(pool[rng.gen_range(0..pool.len())].clone());
        }

        match sort {
            Sort::Boolean => Expr::bool(rng.r#gen()),
            Sort::Integer => {
                let ratio = self.config.edge_literal_ratio;
                if ratio > 0.0 && rng.gen_bool(ratio) {
                    Expr::int(EDGE_LITERALS[rng.gen_range(0..EDGE_LITERALS.len())])
                } else {
                    Expr::int(rng.gen_range(self.config.int_min..=self.config.int_max))
                }
            }
        }
    }
}

/// Generate a test case with default shape and the given depth bound.
///
/// Bounds above [`MAX_DEPTH`] are clamped to it.
pub fn generate(depth_bound: usize, seed: u64) -> Result<TestCase, GenerationError> {
    Generator::from_valid(GeneratorConfig {
        depth: depth_bound.min(MAX_DEPTH),
        ..GeneratorConfig::default()
    })
    .generate(seed)
}
