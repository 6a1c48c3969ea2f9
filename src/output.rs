//! The output conventions of the external tools.
use crate::error::{PipelineError, Tool};

/// The only output the encoder may produce besides nothing at all.
pub const ENCODER_UNSATISFIABLE: &str = "s UNSATISFIABLE\n";

/// The last line the solver prints when it found a model.
pub const SOLVER_SATISFIABLE: &str = "SATISFIABLE";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodeVerdict {
    /// The CNF was written and has to be solved.
    Encoded,
    /// The encoder refuted the problem by itself.
    Unsatisfiable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveVerdict {
    Satisfiable,
    Unsatisfiable,
}

pub fn parse_encoder_output(stdout: &str) -> Result<EncodeVerdict, PipelineError> {
    if stdout.is_empty() {
        Ok(EncodeVerdict::Encoded)
    } else if stdout == ENCODER_UNSATISFIABLE {
        Ok(EncodeVerdict::Unsatisfiable)
    } else {
        Err(PipelineError::UnexpectedToolOutput {
            tool: Tool::Encoder,
            output: stdout.to_owned(),
        })
    }
}

/// Minisat signals SAT with exit code 10, older builds exit with 0 either way. Every other code
/// is a failure of the solver process.
pub fn check_solver_exit(
    code: Option<i32>,
    stdout: &str,
    stderr: &str,
) -> Result<(), PipelineError> {
    match code {
        Some(0 | 10) => Ok(()),
        code => Err(PipelineError::SolverProcessError {
            code,
            stdout: stdout.to_owned(),
            stderr: stderr.to_owned(),
        }),
    }
}

/// The verdict is the last non-empty line of the solver's output. Statistics and banners come
/// before it when the solver is verbose.
pub fn parse_solver_verdict(stdout: &str) -> SolveVerdict {
    match stdout.lines().rev().find(|line| !line.is_empty()) {
        Some(SOLVER_SATISFIABLE) => SolveVerdict::Satisfiable,
        _ => SolveVerdict::Unsatisfiable,
    }
}

/// Extract the CPU time minisat reports in its statistics, which end with
///
/// ```text
/// CPU time              : 0.004 s
///
/// SATISFIABLE
/// ```
///
/// The value is read from the third-last line. If that line does not hold a number, the last line
/// starting with `CPU time` is used instead.
pub fn parse_cpu_time(diagnostics: &str) -> Option<f64> {
    let lines = diagnostics.lines().collect::<Vec<_>>();

    lines
        .len()
        .checked_sub(3)
        .and_then(|idx| second_to_last_number(lines[idx]))
        .or_else(|| {
            lines
                .iter()
                .rev()
                .filter(|line| line.trim_start().starts_with("CPU time"))
                .find_map(|line| second_to_last_number(line))
        })
}

fn second_to_last_number(line: &str) -> Option<f64> {
    let mut tokens = line.split_whitespace().rev();
    let _unit = tokens.next()?;
    tokens.next()?.parse().ok()
}

/// The decoder prints the status on the first line and the values on the second, prefixed with a
/// marker token. The values are in the order of the variable declarations.
pub fn parse_decoder_output(stdout: &str) -> Result<Vec<i64>, PipelineError> {
    let failure = |reason: String| PipelineError::DecodeFailure {
        reason,
        output: stdout.to_owned(),
    };

    if stdout.is_empty() {
        return Err(failure("the decoder printed nothing".to_owned()));
    }

    let values_line = stdout
        .lines()
        .nth(1)
        .ok_or_else(|| failure("missing the line with values".to_owned()))?;

    values_line
        .split_whitespace()
        .skip(1)
        .map(|token| {
            token
                .parse::<i64>()
                .map_err(|_| failure(format!("'{token}' is not an integer")))
        })
        .collect()
}
