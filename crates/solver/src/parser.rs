use crate::error::SolverError;
use crate::model::Model;
use crate::result::{UnknownReason, Verdict};

/// Parse a solver's stdout into a [`Verdict`].
///
/// The first meaningful line decides the answer:
/// - `sat`, optionally followed by a `(get-model)` response
/// - `unsat`
/// - `unknown`, optionally followed by a reason
/// - `timeout` (some solvers print this instead of `unknown`)
/// - `(error "...")`, reported as [`SolverError::Reported`]
///
/// `success` acknowledgements are skipped.
pub fn parse_solver_output(stdout: &str, stderr: &str) -> Result<Verdict, SolverError> {
    let stdout = stdout.trim();

    if stdout.is_empty() {
        if stderr.to_lowercase().contains("timeout") {
            return Ok(Verdict::Unknown(UnknownReason::Timeout));
        }
        return Err(SolverError::ParseError(format!(
            "Empty solver output. stderr: {}",
            stderr.trim()
        )));
    }

    let first_line = stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && *line != "success")
        .unwrap_or("");

    if first_line.starts_with("(error") {
        return Err(SolverError::Reported(error_message(first_line)));
    }

    match first_line {
        "unsat" => Ok(Verdict::Unsat),
        "sat" => Ok(Verdict::Sat(parse_model(stdout))),
        "unknown" => Ok(Verdict::Unknown(unknown_reason(stdout, stderr))),
        "timeout" => Ok(Verdict::Unknown(UnknownReason::Timeout)),
        _ => Err(SolverError::ParseError(format!(
            "Unexpected solver output: {first_line}"
        ))),
    }
}

/// Pull the quoted message out of `(error "...")`.
fn error_message(line: &str) -> String {
    let inner = line
        .trim_start_matches("(error")
        .trim_end_matches(')')
        .trim();
    inner.trim_matches('"').to_string()
}

/// Classify the text that follows `unknown`.
///
/// z3 prints `(:reason-unknown "timeout")` or `(timeout)` after `unknown`
/// when asked; cvc5 reports `--tlimit-per` expiry the same way.
fn unknown_reason(stdout: &str, stderr: &str) -> UnknownReason {
    let after_unknown = stdout
        .lines()
        .map(str::trim)
        .skip_while(|line| *line != "unknown")
        .skip(1)
        .find(|line| !line.is_empty() && !line.starts_with("(error"));

    let reason = match after_unknown {
        Some(line) => line
            .trim_start_matches('(')
            .trim_end_matches(')')
            .trim_start_matches(":reason-unknown")
            .trim()
            .trim_matches('"')
            .to_string(),
        None if !stderr.trim().is_empty() => stderr.trim().to_string(),
        None => return UnknownReason::Solver("unknown".to_string()),
    };

    let lowered = reason.to_lowercase();
    if lowered.contains("timeout") || lowered.contains("canceled") {
        UnknownReason::Timeout
    } else {
        UnknownReason::Solver(reason)
    }
}

/// Parse the `(get-model)` response that follows `sat`.
///
/// Both layouts solvers use are accepted:
///
/// ```text
/// (model
///   (define-fun x () Int 5)
/// )
/// ```
///
/// ```text
/// (
///   (define-fun x () Int
///     (- 5))
/// )
/// ```
///
/// Only nullary `define-fun`s (constants) are collected. A response with no
/// constants yields `None`; a malformed one is treated the same way rather
/// than failing the whole answer.
fn parse_model(output: &str) -> Option<Model> {
    if !output.contains("(define-fun ") {
        return None;
    }

    let model_text = find_model_block(output);
    let mut assignments = Vec::new();
    let mut pos = 0;

    while let Some(offset) = model_text[pos..].find("(define-fun ") {
        let start = pos + offset;
        let after_keyword = start + "(define-fun ".len();
        match find_sexp_end(model_text, start) {
            Some(end) => {
                if let Some(pair) = parse_define_fun(&model_text[after_keyword..end - 1]) {
                    assignments.push(pair);
                }
                pos = end;
            }
            None => break,
        }
    }

    if assignments.is_empty() {
        None
    } else {
        Some(assignments.into_iter().collect())
    }
}

/// Locate the model block in the output text.
fn find_model_block(output: &str) -> &str {
    if let Some(start) = output.find("(model") {
        return &output[start..];
    }

    let after_sat = output
        .find("sat")
        .map(|i| output[i + 3..].trim())
        .unwrap_or("");
    if after_sat.starts_with('(') {
        after_sat
    } else {
        output
    }
}

/// Find the end of an S-expression starting at `start`.
/// Returns the index AFTER the closing paren.
fn find_sexp_end(input: &str, start: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.get(start) != Some(&b'(') {
        return None;
    }

    let mut depth = 0usize;
    for (i, byte) in bytes.iter().enumerate().skip(start) {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse the body of one `define-fun` (without the leading `(define-fun `
/// and the closing paren).
///
/// Returns `(name, value)` for constants, e.g. `x () Int (- 3)` gives
/// `("x", "(- 3)")`.
fn parse_define_fun(input: &str) -> Option<(String, String)> {
    let normalized = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let (name, rest) = normalized.split_once(' ')?;

    let rest = rest.strip_prefix("()")?.trim_start();
    let sort_end = skip_sexp(rest, 0)?;
    let value = rest[sort_end..].trim();

    if value.is_empty() {
        return None;
    }
    Some((name.trim_matches('|').to_string(), value.to_string()))
}

/// Skip one S-expression (atom or list) starting at `pos`.
/// Returns the position after it.
fn skip_sexp(input: &str, pos: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    match bytes.get(pos)? {
        b'(' => find_sexp_end(input, pos),
        _ => Some(
            bytes[pos..]
                .iter()
                .position(|b| b.is_ascii_whitespace() || *b == b'(' || *b == b')')
                .map_or(bytes.len(), |offset| pos + offset),
        ),
    }
}
