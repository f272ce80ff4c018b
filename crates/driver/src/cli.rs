//! Command-line arguments.
//!
//! Every option can also be set through a `TYPEFUZZ_*` environment variable;
//! an explicit flag wins over the environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use typefuzz_engine::{BackendSpec, CampaignConfig, GeneratorConfig};

const LONG_ABOUT: &str = "Type-directed differential fuzzer for SMT solvers.\n\n\
    Generates random well-sorted Int/Bool formulas from a seed, runs them on\n\
    several solvers and reports verdicts that contradict each other, plus\n\
    models that falsify their own assertions.\n\n\
    Replay a finding with the same shape options and:\n  \
    typefuzz --seed <case seed> --iterations 1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored progress and summary on stderr
    Text,
    /// Full report as JSON on stdout
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "typefuzz")]
#[command(about = "Type-directed differential fuzzer for SMT solvers")]
#[command(long_about = LONG_ABOUT)]
#[command(version)]
pub struct Cli {
    /// Run seed; case i uses seed + i (default: derived from the clock)
    #[arg(long, env = "TYPEFUZZ_SEED")]
    pub seed: Option<u64>,

    /// Maximum expression depth
    #[arg(long, env = "TYPEFUZZ_DEPTH", default_value_t = 3)]
    pub depth: usize,

    /// Comma-separated backends: z3, cvc5, yices or cmd:<program> [args]
    #[arg(
        long,
        env = "TYPEFUZZ_BACKENDS",
        value_delimiter = ',',
        default_value = "z3,cvc5"
    )]
    pub backends: Vec<BackendSpec>,

    /// Per check-sat timeout in milliseconds
    #[arg(long, env = "TYPEFUZZ_TIMEOUT_MS", default_value_t = 5000)]
    pub timeout_ms: u64,

    /// Number of test cases
    #[arg(long, env = "TYPEFUZZ_ITERATIONS", default_value_t = 100)]
    pub iterations: u64,

    /// Assertions per test case
    #[arg(long, env = "TYPEFUZZ_ASSERTIONS", default_value_t = 3)]
    pub assertions: usize,

    /// Integer variables per test case
    #[arg(long, env = "TYPEFUZZ_INT_VARS", default_value_t = 3)]
    pub int_vars: usize,

    /// Boolean variables per test case
    #[arg(long, env = "TYPEFUZZ_BOOL_VARS", default_value_t = 2)]
    pub bool_vars: usize,

    /// Smallest ordinary integer literal
    #[arg(long, env = "TYPEFUZZ_INT_MIN", default_value_t = -100, allow_negative_numbers = true)]
    pub int_min: i64,

    /// Largest ordinary integer literal
    #[arg(long, env = "TYPEFUZZ_INT_MAX", default_value_t = 100, allow_negative_numbers = true)]
    pub int_max: i64,

    /// Probability of drawing a boundary literal (0.0 to 1.0)
    #[arg(long, env = "TYPEFUZZ_EDGE_RATIO", default_value_t = 0.0)]
    pub edge_ratio: f64,

    /// Generate div and mod
    #[arg(long, env = "TYPEFUZZ_DIVISION")]
    pub division: bool,

    /// Worker threads (default: available parallelism)
    #[arg(long, short = 'j', env = "TYPEFUZZ_JOBS")]
    pub jobs: Option<usize>,

    /// Neither request nor validate models
    #[arg(long, env = "TYPEFUZZ_NO_MODELS")]
    pub no_models: bool,

    /// Stop at the first strong disagreement
    #[arg(long, env = "TYPEFUZZ_STOP_ON_STRONG")]
    pub stop_on_strong: bool,

    /// Wall-clock budget for the whole run, in seconds
    #[arg(long, env = "TYPEFUZZ_TIME_BUDGET_SECS")]
    pub time_budget_secs: Option<u64>,

    /// Report agreements and per-backend timing too
    #[arg(long, short = 'v', env = "TYPEFUZZ_VERBOSE")]
    pub verbose: bool,

    /// Report format
    #[arg(long, env = "TYPEFUZZ_OUTPUT_FORMAT", value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    /// Append one JSON line per retained case to this file
    #[arg(long, env = "TYPEFUZZ_JSON_LOG")]
    pub json_log: Option<PathBuf>,
}

impl Cli {
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            depth: self.depth,
            int_min: self.int_min,
            int_max: self.int_max,
            assertions: self.assertions,
            int_vars: self.int_vars,
            bool_vars: self.bool_vars,
            edge_literal_ratio: self.edge_ratio,
            division: self.division,
        }
    }

    /// Campaign settings for a run with the given seed. Validation is left
    /// to the engine.
    pub fn campaign_config(&self, seed: u64) -> CampaignConfig {
        let defaults = CampaignConfig::default();
        CampaignConfig {
            generator: self.generator_config(),
            seed,
            iterations: self.iterations,
            jobs: self.jobs.unwrap_or(defaults.jobs),
            timeout_ms: self.timeout_ms,
            validate_models: !self.no_models,
            stop_on_strong: self.stop_on_strong,
            time_budget: self.time_budget_secs.map(Duration::from_secs),
            retain_agreements: self.verbose,
        }
    }
}
