use std::io::{self, Read, Write};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use typefuzz_smtlib::command::Command as SmtCmd;
use typefuzz_smtlib::script::Script;
use wait_timeout::ChildExt;

use crate::cancel::CancellationToken;
use crate::config::{SolverConfig, SolverKind};
use crate::error::SolverError;
use crate::parser::parse_solver_output;
use crate::result::{UnknownReason, Verdict};

/// Longest single wait on the child before re-checking cancellation.
const POLL_SLICE: Duration = Duration::from_millis(15);

/// How long to wait for the output pipes to drain once the child has exited.
///
/// A grandchild that inherited the pipes can keep them open indefinitely;
/// after this grace period whatever was read so far is used.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Subprocess-based SMT solver (Z3, CVC5, Yices, or any stdin-driven program).
///
/// Every call spawns a fresh process, so one instance can be shared freely
/// across threads.
#[derive(Debug, Clone)]
pub struct CliSolver {
    config: SolverConfig,
}

impl CliSolver {
    /// Create a new `CliSolver` with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Create a `CliSolver` for the given kind with auto-detected binary path.
    pub fn locate(kind: SolverKind) -> Result<Self, SolverError> {
        let config = SolverConfig::locate(kind)?;
        Ok(Self { config })
    }

    /// Get a reference to the solver configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Check satisfiability of a Script.
    ///
    /// Appends `(check-sat)`, `(get-model)` (when models are enabled) and
    /// `(exit)` if the script does not already end that way.
    pub fn check_sat(
        &self,
        script: &Script,
        cancel: &CancellationToken,
    ) -> Result<Verdict, SolverError> {
        let mut smtlib = script.to_string();
        ensure_check_sat_and_get_model(&mut smtlib, script, self.config.produce_models);
        self.check_sat_raw(&smtlib, cancel)
    }

    /// Check satisfiability from a raw SMT-LIB2 string.
    ///
    /// The call returns `Unknown(Timeout)` once `timeout_ms` has elapsed and
    /// `Unknown(Cancelled)` as soon as `cancel` fires. In both cases the
    /// process is killed before returning.
    pub fn check_sat_raw(
        &self,
        smtlib: &str,
        cancel: &CancellationToken,
    ) -> Result<Verdict, SolverError> {
        self.config.validate()?;

        if cancel.is_cancelled() {
            return Ok(Verdict::Unknown(UnknownReason::Cancelled));
        }

        let kind = self.config.kind;
        let args = self.config.command_line();
        tracing::debug!(
            solver = %kind,
            path = %self.config.program.display(),
            ?args,
            "spawning solver"
        );

        let mut command = Command::new(&self.config.program);
        command
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Own process group, so wrapper scripts can be torn down with
        // everything they started.
        #[cfg(unix)]
        std::os::unix::process::CommandExt::process_group(&mut command, 0);
        let child = command
            .spawn()
            .map_err(|e| SolverError::ProcessError(format!("Failed to start {kind}: {e}")))?;
        let mut guard = ChildGuard::new(child);

        let stdin = guard
            .child
            .stdin
            .take()
            .ok_or_else(|| SolverError::ProcessError(format!("Failed to open {kind} stdin")))?;
        let writer = spawn_writer(stdin, smtlib.to_owned());
        let stdout = spawn_reader(guard.child.stdout.take());
        let stderr = spawn_reader(guard.child.stderr.take());

        let started = Instant::now();
        let deadline =
            (self.config.timeout_ms > 0).then(|| started + Duration::from_millis(self.config.timeout_ms));

        let status = match wait_for_exit(&mut guard.child, deadline, cancel)? {
            Wait::Exited(status) => status,
            Wait::TimedOut => {
                guard.terminate();
                tracing::debug!(solver = %kind, elapsed = ?started.elapsed(), "solver timed out");
                return Ok(Verdict::Unknown(UnknownReason::Timeout));
            }
            Wait::Cancelled => {
                guard.terminate();
                tracing::debug!(solver = %kind, "solver call cancelled");
                return Ok(Verdict::Unknown(UnknownReason::Cancelled));
            }
        };
        guard.reaped = true;
        // Whatever a wrapper script left running.
        guard.kill_group();

        check_writer(writer, kind);
        let stdout = collect(stdout);
        let stderr = collect(stderr);

        if stdout.trim().is_empty() && !status.success() {
            return Err(SolverError::ProcessError(format!(
                "{kind} exited with {status} and no answer. stderr: {}",
                stderr.trim()
            )));
        }

        parse_solver_output(&stdout, &stderr)
    }
}

/// Append `(check-sat)`, `(get-model)` and `(exit)` to the SMT-LIB text
/// when the script does not already carry them.
fn ensure_check_sat_and_get_model(smtlib: &mut String, script: &Script, produce_models: bool) {
    if !script.contains(&SmtCmd::CheckSat) {
        push_line(smtlib, "(check-sat)");
    }
    if produce_models && !script.contains(&SmtCmd::GetModel) {
        push_line(smtlib, "(get-model)");
    }
    if !script.contains(&SmtCmd::Exit) {
        push_line(smtlib, "(exit)");
    }
    if !smtlib.ends_with('\n') {
        smtlib.push('\n');
    }
}

fn push_line(smtlib: &mut String, line: &str) {
    if !smtlib.is_empty() && !smtlib.ends_with('\n') {
        smtlib.push('\n');
    }
    smtlib.push_str(line);
}

enum Wait {
    Exited(ExitStatus),
    TimedOut,
    Cancelled,
}

fn wait_for_exit(
    child: &mut Child,
    deadline: Option<Instant>,
    cancel: &CancellationToken,
) -> Result<Wait, SolverError> {
    loop {
        if cancel.is_cancelled() {
            return Ok(Wait::Cancelled);
        }
        let slice = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return Ok(Wait::TimedOut);
                }
                (deadline - now).min(POLL_SLICE)
            }
            None => POLL_SLICE,
        };
        match child.wait_timeout(slice) {
            Ok(Some(status)) => return Ok(Wait::Exited(status)),
            Ok(None) => {}
            Err(e) => {
                return Err(SolverError::ProcessError(format!(
                    "Failed to wait for solver: {e}"
                )));
            }
        }
    }
}

/// Kills the child's process group and reaps the child on drop unless it
/// already exited normally.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }

    /// SIGKILL everything left in the child's process group.
    #[cfg(unix)]
    fn kill_group(&self) {
        let Ok(pgid) = libc::pid_t::try_from(self.child.id()) else {
            return;
        };
        // SAFETY: kill(2) takes plain integers and touches no memory of ours.
        // The group id cannot be reused while the unreaped child or any
        // leftover member still holds it; an empty group yields ESRCH.
        if unsafe { libc::kill(-pgid, libc::SIGKILL) } != 0 {
            tracing::trace!(pgid, "process group already gone");
        }
    }

    #[cfg(not(unix))]
    fn kill_group(&self) {}

    fn terminate(&mut self) {
        if self.reaped {
            return;
        }
        self.kill_group();
        if let Err(e) = self.child.kill() {
            tracing::debug!("kill failed (process likely already exited): {e}");
        }
        if let Err(e) = self.child.wait() {
            tracing::warn!("failed to reap solver process: {e}");
        }
        self.reaped = true;
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Feed the script on a separate thread so a solver that answers before
/// reading all of its input cannot deadlock us on a full pipe.
fn spawn_writer(mut stdin: ChildStdin, input: String) -> JoinHandle<io::Result<()>> {
    thread::spawn(move || {
        stdin.write_all(input.as_bytes())?;
        stdin.flush()
        // stdin dropped here: the solver sees EOF
    })
}

fn check_writer(writer: JoinHandle<io::Result<()>>, kind: SolverKind) {
    // An unfinished writer is blocked on a pipe some grandchild still holds.
    if !writer.is_finished() {
        return;
    }
    match writer.join() {
        Ok(Ok(())) => {}
        // The solver exited before consuming the whole script.
        Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!(solver = %kind, "solver closed stdin early");
        }
        Ok(Err(e)) => tracing::warn!(solver = %kind, "failed to write script: {e}"),
        Err(_) => tracing::warn!(solver = %kind, "stdin writer thread panicked"),
    }
}

fn spawn_reader<R>(pipe: Option<R>) -> Receiver<Vec<u8>>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            // Partial output is still useful if the read fails midway.
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send(buf);
    });
    rx
}

fn collect(rx: Receiver<Vec<u8>>) -> String {
    match rx.recv_timeout(DRAIN_GRACE) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => {
            tracing::warn!("solver output pipe still open after exit; ignoring remaining output");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typefuzz_smtlib::sort::Sort;
    use typefuzz_smtlib::term::{Op, Term};

    fn sample_script() -> Script {
        [
            SmtCmd::SetLogic("QF_LIA".to_string()),
            SmtCmd::DeclareConst("x".to_string(), Sort::Int),
            SmtCmd::Assert(Term::binary(Op::Gt, Term::symbol("x"), Term::Int(0))),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn ensure_appends_check_sat_model_and_exit() {
        let script = sample_script();
        let mut text = script.to_string();
        ensure_check_sat_and_get_model(&mut text, &script, true);
        assert!(text.ends_with("(check-sat)\n(get-model)\n(exit)\n"));
    }

    #[test]
    fn ensure_skips_get_model_when_disabled() {
        let script = sample_script();
        let mut text = script.to_string();
        ensure_check_sat_and_get_model(&mut text, &script, false);
        assert!(!text.contains("(get-model)"));
        assert!(text.ends_with("(check-sat)\n(exit)\n"));
    }

    #[test]
    fn ensure_does_not_duplicate_check_sat() {
        let mut script = sample_script();
        script.push(SmtCmd::CheckSat);
        let mut text = script.to_string();
        ensure_check_sat_and_get_model(&mut text, &script, true);
        assert_eq!(text.matches("(check-sat)").count(), 1);
    }

    #[test]
    fn missing_binary_is_not_found() {
        let solver = CliSolver::new(SolverConfig::new(
            SolverKind::Z3,
            "/nonexistent/z3".into(),
        ));
        let err = solver
            .check_sat(&sample_script(), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, SolverError::NotFound(SolverKind::Z3, _)));
    }

    #[cfg(unix)]
    #[test]
    fn already_cancelled_token_skips_spawn() {
        let config = SolverConfig::custom("sh", vec!["-c".into(), "echo sat".into()]).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let verdict = CliSolver::new(config)
            .check_sat_raw("(check-sat)", &cancel)
            .unwrap();
        assert!(verdict.is_cancelled());
    }
}
