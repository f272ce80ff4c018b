//! typefuzz: type-directed differential fuzzing of SMT solvers.
//!
//! Usage:
//!   typefuzz --backends z3,cvc5 --iterations 1000 --depth 4
//!
//! Exit status is 0 when the run found nothing, 1 when it found a strong
//! disagreement or a model violation, and 2 when it could not start.

use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use typefuzz_driver::cli::{Cli, OutputFormat};
use typefuzz_driver::error::DriverError;
use typefuzz_driver::json_output::{self, JsonLog};
use typefuzz_driver::output;
use typefuzz_engine::{Campaign, Finding, Report, resolve_backends};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(report) => {
            match cli.output_format {
                OutputFormat::Text => output::print_summary(&report),
                OutputFormat::Json => json_output::print_json_report(&report),
            }
            if report.summary.has_bugs() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<Report, DriverError> {
    let seed = cli.seed.unwrap_or_else(clock_seed);
    if cli.seed.is_none() {
        tracing::info!(seed, "no --seed given, using clock-derived seed");
    }

    let config = cli.campaign_config(seed);
    config.validate()?;
    let backends = resolve_backends(&cli.backends, config.timeout_ms, config.validate_models)?;
    let campaign = Campaign::new(config, backends)?;

    let log = cli
        .json_log
        .as_deref()
        .map(|path| {
            JsonLog::create(path).map_err(|source| DriverError::Log {
                path: path.to_path_buf(),
                source,
            })
        })
        .transpose()?;

    let text = cli.output_format == OutputFormat::Text;
    let on_finding = |finding: &Finding| {
        if text {
            output::print_finding(finding, cli.verbose);
        }
        if let Some(log) = &log {
            if let Err(e) = log.append(finding) {
                tracing::warn!(seed = finding.seed, "failed to write JSON log: {e}");
            }
        }
    };

    Ok(campaign.run_with(on_finding)?)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}
