//! Integration tests for the subprocess solver interface.
//!
//! Most tests drive `sh` as a stand-in solver so they exercise process
//! handling without any SMT solver installed. The `z3_*` tests run only
//! when a z3 binary can be found.

use std::thread;
use std::time::{Duration, Instant};

use typefuzz_smtlib::command::Command as SmtCmd;
use typefuzz_smtlib::script::Script;
use typefuzz_smtlib::sort::Sort;
use typefuzz_smtlib::term::{Op, Term};

use typefuzz_solver::{
    CancellationToken, CliSolver, SolverConfig, SolverError, SolverKind, UnknownReason, Verdict,
};

// ---- Helpers ----

#[cfg(unix)]
fn shell(script: &str) -> CliSolver {
    let config = SolverConfig::custom("sh", vec!["-c".to_string(), script.to_string()])
        .expect("sh should be on PATH");
    CliSolver::new(config)
}

fn z3() -> Option<CliSolver> {
    match CliSolver::locate(SolverKind::Z3) {
        Ok(solver) => Some(solver),
        Err(_) => {
            eprintln!("z3 not found, skipping");
            None
        }
    }
}

fn range_script(lo: i128, hi: i128) -> Script {
    [
        SmtCmd::SetLogic("QF_LIA".to_string()),
        SmtCmd::DeclareConst("x".to_string(), Sort::Int),
        SmtCmd::Assert(Term::binary(Op::Gt, Term::symbol("x"), Term::Int(lo))),
        SmtCmd::Assert(Term::binary(Op::Lt, Term::symbol("x"), Term::Int(hi))),
    ]
    .into_iter()
    .collect()
}

// ============================================================
// Process handling with a stand-in solver
// ============================================================

#[cfg(unix)]
#[test]
fn reads_script_and_answers_unsat() {
    let verdict = shell("cat >/dev/null; echo unsat")
        .check_sat(&range_script(5, 3), &CancellationToken::new())
        .unwrap();
    assert_eq!(verdict, Verdict::Unsat);
}

#[cfg(unix)]
#[test]
fn parses_model_from_stand_in() {
    let solver = shell(
        "cat >/dev/null; printf 'sat\\n(\\n  (define-fun x () Int\\n    (- 4))\\n)\\n'",
    );
    let verdict = solver
        .check_sat(&range_script(-10, 0), &CancellationToken::new())
        .unwrap();
    let model = verdict.model().expect("model should be parsed");
    assert_eq!(model.get("x"), Some("(- 4)"));
}

#[cfg(unix)]
#[test]
fn hung_solver_times_out_promptly() {
    let config = SolverConfig::custom("sh", vec!["-c".into(), "exec sleep 5".into()])
        .unwrap()
        .with_timeout(200);
    let solver = CliSolver::new(config);

    let started = Instant::now();
    let verdict = solver
        .check_sat(&range_script(0, 10), &CancellationToken::new())
        .unwrap();

    assert_eq!(verdict, Verdict::Unknown(UnknownReason::Timeout));
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "timeout took {:?}",
        started.elapsed()
    );
}

#[cfg(unix)]
#[test]
fn cancellation_stops_in_flight_call() {
    let solver = shell("exec sleep 5");
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        trigger.cancel();
    });

    let started = Instant::now();
    let verdict = solver.check_sat(&range_script(0, 10), &cancel).unwrap();
    canceller.join().unwrap();

    assert_eq!(verdict, Verdict::Unknown(UnknownReason::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(2));
}

/// Whether `pid` is still running (zombies count as gone).
#[cfg(target_os = "linux")]
fn process_alive(pid: &str) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.split_whitespace().next())
            .is_some_and(|state| state != "Z"),
        Err(_) => false,
    }
}

/// Run `script` (which records a background `sleep` in `$PIDFILE`) and
/// return that pid once the call is over.
#[cfg(target_os = "linux")]
fn leftover_pid(script: &str, timeout_ms: u64) -> (Verdict, String) {
    let dir = tempfile::tempdir().unwrap();
    let pidfile = dir.path().join("child.pid");
    let script = script.replace("$PIDFILE", &pidfile.display().to_string());
    let config = SolverConfig::custom("sh", vec!["-c".into(), script])
        .unwrap()
        .with_timeout(timeout_ms);

    let verdict = CliSolver::new(config)
        .check_sat(&range_script(0, 10), &CancellationToken::new())
        .unwrap();
    let pid = std::fs::read_to_string(&pidfile).unwrap().trim().to_string();
    (verdict, pid)
}

#[cfg(target_os = "linux")]
fn wait_until_gone(pid: &str) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if !process_alive(pid) {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    false
}

#[cfg(target_os = "linux")]
#[test]
fn timeout_kills_processes_started_by_wrapper() {
    let (verdict, pid) = leftover_pid(
        "sleep 30 >/dev/null 2>&1 & echo $! > $PIDFILE; wait; echo sat",
        300,
    );
    assert_eq!(verdict, Verdict::Unknown(UnknownReason::Timeout));
    assert!(wait_until_gone(&pid), "sleep {pid} survived the timeout");
}

#[cfg(target_os = "linux")]
#[test]
fn normal_exit_kills_processes_left_behind() {
    let (verdict, pid) = leftover_pid(
        "sleep 30 >/dev/null 2>&1 & echo $! > $PIDFILE; cat >/dev/null; echo unsat",
        5_000,
    );
    assert_eq!(verdict, Verdict::Unsat);
    assert!(wait_until_gone(&pid), "sleep {pid} outlived its wrapper");
}

#[cfg(unix)]
#[test]
fn silent_nonzero_exit_is_process_error() {
    let err = shell("cat >/dev/null; exit 3")
        .check_sat(&range_script(0, 10), &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, SolverError::ProcessError(_)), "got {err:?}");
}

#[cfg(unix)]
#[test]
fn garbage_output_is_parse_error() {
    let err = shell("echo garbage")
        .check_sat(&range_script(0, 10), &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, SolverError::ParseError(_)), "got {err:?}");
}

#[cfg(unix)]
#[test]
fn early_exit_without_reading_stdin_is_not_fatal() {
    // Large script so the writer is still busy when the child exits.
    let mut script = range_script(0, 10);
    for i in 0..20_000 {
        script.push(SmtCmd::Comment(format!("padding line {i}")));
    }
    let verdict = shell("echo sat")
        .check_sat(&script, &CancellationToken::new())
        .unwrap();
    assert_eq!(verdict, Verdict::Sat(None));
}

// ============================================================
// Real z3 (skipped when absent)
// ============================================================

#[test]
fn z3_simple_sat_with_model() {
    let Some(solver) = z3() else { return };
    let verdict = solver
        .check_sat(&range_script(0, 10), &CancellationToken::new())
        .unwrap();

    let model = verdict.model().expect("Expected model in SAT result");
    let x: i64 = model
        .get("x")
        .expect("Model should contain x")
        .parse()
        .expect("x should be a plain integer");
    assert!(x > 0 && x < 10, "x = {x}, expected 0 < x < 10");
}

#[test]
fn z3_simple_unsat() {
    let Some(solver) = z3() else { return };
    let verdict = solver
        .check_sat(&range_script(5, 3), &CancellationToken::new())
        .unwrap();
    assert_eq!(verdict, Verdict::Unsat);
}

#[test]
fn z3_negative_model_value() {
    let Some(solver) = z3() else { return };
    let verdict = solver
        .check_sat(&range_script(-10, -5), &CancellationToken::new())
        .unwrap();
    let value = verdict.model().and_then(|m| m.get("x")).unwrap_or("");
    assert!(value.starts_with("(- "), "expected negative literal, got {value}");
}

#[test]
fn z3_undeclared_constant_is_reported() {
    let Some(solver) = z3() else { return };
    let err = solver
        .check_sat_raw("(assert (> y 0))\n(check-sat)\n", &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, SolverError::Reported(_)), "got {err:?}");
}
