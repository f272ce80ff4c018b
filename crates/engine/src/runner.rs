//! Campaign runner: many test cases on a bounded worker pool.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use typefuzz_solver::CancellationToken;

use crate::adapter::{AdapterFactory, SolverAdapter};
use crate::error::{ConfigError, RunError};
use crate::generator::{Generator, GeneratorConfig};
use crate::oracle::{CaseReport, Classification, Oracle};
use crate::report::{Finding, Report, Summary, millis};

/// Settings for one fuzzing run.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignConfig {
    pub generator: GeneratorConfig,
    /// Run seed; case `i` is generated from `seed + i` (wrapping).
    pub seed: u64,
    pub iterations: u64,
    /// Worker threads, which also bounds concurrent solver processes.
    pub jobs: usize,
    /// Per `check-sat` timeout handed to the backends.
    pub timeout_ms: u64,
    /// Request models and check them against the assertions.
    pub validate_models: bool,
    /// Cancel the run at the first strong disagreement.
    pub stop_on_strong: bool,
    /// Wall-clock budget for the whole run.
    pub time_budget: Option<Duration>,
    /// Keep agreeing cases in the report too.
    pub retain_agreements: bool,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            seed: 0,
            iterations: 100,
            jobs: std::thread::available_parallelism().map_or(1, |n| n.get()),
            timeout_ms: 5000,
            validate_models: true,
            stop_on_strong: false,
            time_budget: None,
            retain_agreements: false,
        }
    }
}

impl CampaignConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator.validate()?;
        if self.iterations == 0 {
            return Err(ConfigError::Zero("iterations"));
        }
        if self.jobs == 0 {
            return Err(ConfigError::Zero("jobs"));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Zero("timeout-ms"));
        }
        Ok(())
    }
}

/// A validated run, ready to execute.
pub struct Campaign {
    config: CampaignConfig,
    generator: Generator,
    factories: Vec<Arc<dyn AdapterFactory>>,
    oracle: Oracle,
}

struct RunState {
    summary: Summary,
    findings: Vec<Finding>,
}

impl Campaign {
    pub fn new(
        config: CampaignConfig,
        factories: Vec<Arc<dyn AdapterFactory>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if factories.is_empty() {
            return Err(ConfigError::NoBackends);
        }
        Ok(Self {
            generator: Generator::new(config.generator.clone())?,
            oracle: Oracle::new(config.validate_models),
            config,
            factories,
        })
    }

    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }

    pub fn backend_names(&self) -> Vec<String> {
        self.factories.iter().map(|f| f.name().to_string()).collect()
    }

    /// Run every case and return the report.
    pub fn run(&self) -> Result<Report, RunError> {
        self.run_with(|_| {})
    }

    /// Run every case, calling `on_finding` for each retained case as soon
    /// as it is classified.
    ///
    /// Once the time budget elapses or `stop_on_strong` fires, no new cases
    /// start and in-flight solver calls are killed.
    pub fn run_with<F>(&self, on_finding: F) -> Result<Report, RunError>
    where
        F: Fn(&Finding) + Sync,
    {
        let started = Instant::now();
        let cancel = match self.config.time_budget {
            Some(budget) => CancellationToken::with_deadline(started + budget),
            None => CancellationToken::new(),
        };

        tracing::info!(
            seed = self.config.seed,
            iterations = self.config.iterations,
            jobs = self.config.jobs,
            backends = ?self.backend_names(),
            "starting campaign"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.jobs)
            .build()
            .map_err(|e| RunError::ThreadPool(e.to_string()))?;

        let state = Mutex::new(RunState {
            summary: Summary::default(),
            findings: Vec::new(),
        });

        pool.install(|| {
            (0..self.config.iterations)
                .into_par_iter()
                .try_for_each(|i| -> Result<(), RunError> {
                    if cancel.is_cancelled() {
                        return Ok(());
                    }
                    let seed = self.config.seed.wrapping_add(i);
                    let case = self.generator.generate(seed)?;
                    let mut adapters: Vec<Box<dyn SolverAdapter>> = self
                        .factories
                        .iter()
                        .map(|factory| factory.create(&cancel))
                        .collect();
                    let report = self.oracle.run(&case, &mut adapters);
                    self.record(report, &state, &cancel, &on_finding);
                    Ok(())
                })
        })?;

        let mut state = state.into_inner().unwrap_or_else(PoisonError::into_inner);
        state.summary.elapsed_ms = millis(started.elapsed());
        state.findings.sort_by_key(|f| f.seed);

        let summary = state.summary;
        tracing::info!(
            cases = summary.cases,
            agreements = summary.agreements,
            weak = summary.weak,
            strong = summary.strong,
            model_violations = summary.model_violations,
            interrupted = summary.interrupted,
            elapsed_ms = summary.elapsed_ms,
            "campaign finished"
        );

        Ok(Report {
            seed: self.config.seed,
            backends: self.backend_names(),
            generator: self.config.generator.clone(),
            summary,
            findings: state.findings,
        })
    }

    fn record<F>(
        &self,
        report: CaseReport,
        state: &Mutex<RunState>,
        cancel: &CancellationToken,
        on_finding: &F,
    ) where
        F: Fn(&Finding) + Sync,
    {
        let seed = report.case.seed();
        let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
        state.summary.record(&report);

        match report.classification() {
            None => return,
            Some(Classification::Agreement) => {
                tracing::debug!(seed, "backends agree");
            }
            Some(Classification::WeakDisagreement) => {
                tracing::info!(seed, "weak disagreement");
            }
            Some(Classification::StrongDisagreement) => {
                tracing::warn!(seed, "strong disagreement");
                if self.config.stop_on_strong {
                    tracing::info!("stopping at first strong disagreement");
                    cancel.cancel();
                }
            }
        }

        if report.is_finding() || self.config.retain_agreements {
            if let Some(finding) = Finding::from_case(&report, self.config.validate_models) {
                on_finding(&finding);
                state.findings.push(finding);
            }
        }
    }
}
