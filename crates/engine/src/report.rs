//! Serializable run report.
//!
//! One [`Finding`] per retained case (disagreements, model violations and,
//! in verbose runs, agreements) plus a [`Summary`] of the whole run.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use typefuzz_solver::{UnknownReason, Verdict};

use crate::adapter::BackendVerdict;
use crate::generator::GeneratorConfig;
use crate::oracle::{CaseReport, Classification, ModelViolation};

/// Per-backend verdict as recorded in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerdictRecord {
    pub backend: String,
    /// `sat`, `unsat`, `unknown` or `error`.
    pub verdict: String,
    /// Unknown reason or error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<BTreeMap<String, String>>,
}

impl From<&BackendVerdict> for VerdictRecord {
    fn from(v: &BackendVerdict) -> Self {
        let detail = match &v.verdict {
            Verdict::Unknown(UnknownReason::Timeout) => Some("timeout".to_string()),
            Verdict::Unknown(UnknownReason::Cancelled) => Some("cancelled".to_string()),
            Verdict::Unknown(UnknownReason::Solver(reason)) => Some(reason.clone()),
            Verdict::Error(message) => Some(message.clone()),
            Verdict::Sat(_) | Verdict::Unsat => None,
        };
        Self {
            backend: v.backend.clone(),
            verdict: v.verdict.label().to_string(),
            detail,
            elapsed_ms: millis(v.elapsed),
            model: v
                .verdict
                .model()
                .map(|m| m.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()),
        }
    }
}

/// A retained test case with everything needed to reproduce it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    /// Seed that regenerates this exact case.
    pub seed: u64,
    pub depth: usize,
    pub classification: Classification,
    pub assertions: Vec<String>,
    pub script: String,
    pub verdicts: Vec<VerdictRecord>,
    pub violations: Vec<ModelViolation>,
}

impl Finding {
    /// Build from a classified case. Interrupted cases have no finding.
    pub fn from_case(report: &CaseReport, produce_models: bool) -> Option<Self> {
        let classification = report.classification()?;
        Some(Self {
            seed: report.case.seed(),
            depth: report.case.depth(),
            classification,
            assertions: report
                .case
                .assertions()
                .iter()
                .map(ToString::to_string)
                .collect(),
            script: report.case.render(produce_models),
            verdicts: report.verdicts.iter().map(VerdictRecord::from).collect(),
            violations: report.violations.clone(),
        })
    }
}

/// Counts over the whole run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub cases: u64,
    pub agreements: u64,
    pub weak: u64,
    pub strong: u64,
    pub model_violations: u64,
    pub interrupted: u64,
    pub elapsed_ms: u64,
}

impl Summary {
    pub fn record(&mut self, report: &CaseReport) {
        self.cases += 1;
        match report.classification() {
            None => self.interrupted += 1,
            Some(Classification::Agreement) => self.agreements += 1,
            Some(Classification::WeakDisagreement) => self.weak += 1,
            Some(Classification::StrongDisagreement) => self.strong += 1,
        }
        self.model_violations += report.violations.len() as u64;
    }

    /// Strong disagreements or model violations were found.
    pub fn has_bugs(&self) -> bool {
        self.strong > 0 || self.model_violations > 0
    }
}

/// Full report of a campaign.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub seed: u64,
    pub backends: Vec<String>,
    pub generator: GeneratorConfig,
    pub summary: Summary,
    pub findings: Vec<Finding>,
}

impl Report {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::TestCase;
    use crate::expr::{BinaryOp, Expr, Sort, Variable};
    use crate::oracle::CaseOutcome;
    use typefuzz_solver::Model;

    fn case_report(outcome: CaseOutcome, verdicts: Vec<BackendVerdict>) -> CaseReport {
        let x = Variable::new("x0", Sort::Integer);
        let a = Expr::binary(BinaryOp::Lt, Expr::var(x.clone()), Expr::var(x.clone())).unwrap();
        CaseReport {
            case: TestCase::new(77, 2, vec![x], vec![a]).unwrap(),
            verdicts,
            outcome,
            violations: Vec::new(),
        }
    }

    fn bv(backend: &str, verdict: Verdict, ms: u64) -> BackendVerdict {
        BackendVerdict {
            backend: backend.into(),
            verdict,
            elapsed: Duration::from_millis(ms),
        }
    }

    #[test]
    fn finding_serializes_reproduction_data() {
        let model = Model::from_iter([("x0", "(- 1)")]);
        let report = case_report(
            CaseOutcome::Classified(Classification::StrongDisagreement),
            vec![
                bv("z3", Verdict::Unsat, 12),
                bv("faulty", Verdict::Sat(Some(model)), 3),
            ],
        );
        let finding = Finding::from_case(&report, true).unwrap();
        let json: serde_json::Value = serde_json::to_value(&finding).unwrap();

        assert_eq!(json["seed"], 77);
        assert_eq!(json["classification"], "strong_disagreement");
        assert_eq!(json["assertions"][0], "(< x0 x0)");
        assert!(
            json["script"]
                .as_str()
                .unwrap()
                .contains("(declare-const x0 Int)")
        );
        assert_eq!(json["verdicts"][0]["verdict"], "unsat");
        assert_eq!(json["verdicts"][0]["elapsed_ms"], 12);
        assert!(json["verdicts"][0].get("model").is_none());
        assert_eq!(json["verdicts"][1]["model"]["x0"], "(- 1)");
    }

    #[test]
    fn inconclusive_verdicts_carry_detail() {
        let record = VerdictRecord::from(&bv(
            "cvc5",
            Verdict::Unknown(UnknownReason::Timeout),
            5000,
        ));
        assert_eq!(record.verdict, "unknown");
        assert_eq!(record.detail.as_deref(), Some("timeout"));

        let record = VerdictRecord::from(&bv("z3", Verdict::Error("boom".into()), 1));
        assert_eq!(record.verdict, "error");
        assert_eq!(record.detail.as_deref(), Some("boom"));
    }

    #[test]
    fn interrupted_case_has_no_finding() {
        let report = case_report(CaseOutcome::Interrupted, vec![]);
        assert!(Finding::from_case(&report, true).is_none());
    }

    #[test]
    fn summary_counts() {
        let mut summary = Summary::default();
        summary.record(&case_report(
            CaseOutcome::Classified(Classification::Agreement),
            vec![],
        ));
        summary.record(&case_report(
            CaseOutcome::Classified(Classification::WeakDisagreement),
            vec![],
        ));
        summary.record(&case_report(CaseOutcome::Interrupted, vec![]));
        assert_eq!(summary.cases, 3);
        assert_eq!(summary.agreements, 1);
        assert_eq!(summary.weak, 1);
        assert_eq!(summary.interrupted, 1);
        assert!(!summary.has_bugs());

        summary.record(&case_report(
            CaseOutcome::Classified(Classification::StrongDisagreement),
            vec![],
        ));
        assert!(summary.has_bugs());
    }
}
