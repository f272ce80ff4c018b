/// Colored campaign output on stderr.
///
/// One block per retained case as it is classified:
///   [STRONG] seed (red)
///   [WEAK]   seed (yellow)
///   [MODEL]  backend and falsified assertion (magenta)
///   [AGREE]  seed (dimmed, verbose only)
/// followed by a summary line once the run ends.
use colored::Colorize;
use typefuzz_engine::{Classification, Finding, GeneratorConfig, Report, Summary, VerdictRecord};

/// Lines describing one retained case.
///
/// ```text
///   [STRONG]  seed 1042 (depth 3): z3 sat, cvc5 unsat
///   [MODEL]   seed 1042: z3 model falsifies assertion 1
/// ```
///
/// In verbose mode the verdicts carry timings and the script follows.
pub fn format_finding(finding: &Finding, verbose: bool) -> Vec<String> {
    let tag = match finding.classification {
        Classification::StrongDisagreement => pad("[STRONG]").as_str().red().bold(),
        Classification::WeakDisagreement => pad("[WEAK]").as_str().yellow().bold(),
        Classification::Agreement if finding.violations.is_empty() => {
            pad("[AGREE]").as_str().dimmed()
        }
        Classification::Agreement => pad("[MODEL]").as_str().magenta().bold(),
    };
    let verdicts: Vec<String> = finding
        .verdicts
        .iter()
        .map(|v| format_verdict(v, verbose))
        .collect();

    let mut lines = vec![format!(
        "  {} seed {} (depth {}): {}",
        tag,
        finding.seed,
        finding.depth,
        verdicts.join(", ")
    )];

    for violation in &finding.violations {
        lines.push(format!(
            "  {} seed {}: {} model falsifies assertion {}",
            pad("[MODEL]").as_str().magenta().bold(),
            finding.seed,
            violation.backend,
            violation.assertion_index,
        ));
    }

    if verbose {
        lines.extend(finding.script.lines().map(|l| format!("      {}", l.dimmed())));
    }
    lines
}

/// Pad before coloring; escape codes would skew `{:<8}` on the colored text.
fn pad(tag: &str) -> String {
    format!("{tag:<8}")
}

fn format_verdict(record: &VerdictRecord, verbose: bool) -> String {
    let mut text = format!("{} {}", record.backend, record.verdict);
    if let Some(detail) = &record.detail {
        text.push_str(&format!(" ({detail})"));
    }
    if verbose {
        text.push_str(&format!(" {}ms", record.elapsed_ms));
    }
    text
}

pub fn print_finding(finding: &Finding, verbose: bool) {
    for line in format_finding(finding, verbose) {
        eprintln!("{line}");
    }
}

/// The closing summary line.
///
/// ```text
/// Summary: 100 cases: 97 agree, 2 WEAK, 1 STRONG, 0 MODEL, 0 interrupted (1234ms)
/// ```
pub fn format_summary(summary: &Summary) -> String {
    let count = |n: u64, label: colored::ColoredString| {
        if n > 0 {
            format!("{n} {label}")
        } else {
            format!("{n} {}", label.clear())
        }
    };
    format!(
        "Summary: {} cases: {} agree, {}, {}, {}, {} interrupted ({}ms)",
        summary.cases,
        summary.agreements,
        count(summary.weak, "WEAK".yellow()),
        count(summary.strong, "STRONG".red()),
        count(summary.model_violations, "MODEL".magenta()),
        summary.interrupted,
        summary.elapsed_ms,
    )
}

/// Summary plus a replay hint for the first bug, if any.
pub fn print_summary(report: &Report) {
    eprintln!();
    eprintln!("{}", format_summary(&report.summary));

    let first_bug = report.findings.iter().find(|f| {
        f.classification == Classification::StrongDisagreement || !f.violations.is_empty()
    });
    if let Some(finding) = first_bug {
        eprintln!("Replay: {}", replay_command(finding.seed, &report.generator));
    } else if report.summary.cases > 0 {
        eprintln!("{}", "No bugs found.".green());
    }
}

/// Command line that regenerates the case with `seed`: the depth plus every
/// shape option that differs from its default.
pub fn replay_command(seed: u64, generator: &GeneratorConfig) -> String {
    let defaults = GeneratorConfig::default();
    let mut command = format!(
        "typefuzz --seed {seed} --iterations 1 --depth {}",
        generator.depth
    );
    let mut flag = |name: &str, value: String| command.push_str(&format!(" --{name} {value}"));
    if generator.int_min != defaults.int_min {
        flag("int-min", generator.int_min.to_string());
    }
    if generator.int_max != defaults.int_max {
        flag("int-max", generator.int_max.to_string());
    }
    if generator.assertions != defaults.assertions {
        flag("assertions", generator.assertions.to_string());
    }
    if generator.int_vars != defaults.int_vars {
        flag("int-vars", generator.int_vars.to_string());
    }
    if generator.bool_vars != defaults.bool_vars {
        flag("bool-vars", generator.bool_vars.to_string());
    }
    if generator.edge_literal_ratio != defaults.edge_literal_ratio {
        flag("edge-ratio", generator.edge_literal_ratio.to_string());
    }
    if generator.division {
        command.push_str(" --division");
    }
    command
}
