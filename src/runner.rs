//! The three external stages of a run: encode the problem to CNF, solve the CNF, and decode the
//! model. Every stage is a blocking child process; nothing is retried.
use std::{
    process::{Command, Stdio},
    time::Instant,
};

use crate::{
    artifacts::{file_size, RunArtifacts},
    config::Config,
    error::{PipelineError, Tool},
    output::{self, EncodeVerdict, SolveVerdict},
    report::{Metrics, Outcome},
};

/// Run all stages on the problem file of `artifacts`. The artifacts must have been claimed.
pub(crate) fn run(
    config: &Config,
    artifacts: &RunArtifacts,
    metrics: &mut Metrics,
) -> Result<Outcome, PipelineError> {
    if encode(config, artifacts, metrics)? == EncodeVerdict::Unsatisfiable {
        log::info!("the encoder reported UNSATISFIABLE");
        return Ok(Outcome::UnsatisfiableAtEncoding);
    }

    if solve(config, artifacts, metrics)? == SolveVerdict::Unsatisfiable {
        log::info!("the solver reported UNSATISFIABLE");
        return Ok(Outcome::UnsatisfiableAtSolving);
    }

    log::info!("the solver reported SATISFIABLE");
    let solution = decode(config, artifacts, metrics)?;
    Ok(Outcome::Satisfiable(solution))
}

fn encode(
    config: &Config,
    artifacts: &RunArtifacts,
    metrics: &mut Metrics,
) -> Result<EncodeVerdict, PipelineError> {
    let mut command = compiler_command(config);
    command
        .arg("-encode")
        .arg(&artifacts.problem)
        .arg(&artifacts.cnf)
        .arg(&artifacts.map);

    let start = Instant::now();
    let output = execute(command)?;
    metrics.csp_to_cnf_time = Some(start.elapsed().as_secs_f64());

    output.require_success(Tool::Encoder)?;
    let verdict = output::parse_encoder_output(&output.stdout)?;

    if verdict == EncodeVerdict::Encoded {
        metrics.cnf_file_size = Some(file_size(&artifacts.cnf)?);
        metrics.map_file_size = Some(file_size(&artifacts.map)?);
    }

    Ok(verdict)
}

fn solve(
    config: &Config,
    artifacts: &RunArtifacts,
    metrics: &mut Metrics,
) -> Result<SolveVerdict, PipelineError> {
    let mut command = Command::new(config.solver());
    if config.quiet_solver() {
        command.arg("-verbosity=0");
    }
    command.arg(&artifacts.cnf).arg(&artifacts.solution);

    let start = Instant::now();
    let output = execute(command)?;
    metrics.solver_time = Some(start.elapsed().as_secs_f64());

    output::check_solver_exit(output.code, &output.stdout, &output.stderr)?;
    let verdict = output::parse_solver_verdict(&output.stdout);

    if verdict == SolveVerdict::Satisfiable {
        metrics.solver_cpu_time = output::parse_cpu_time(&output.diagnostics());
        if metrics.solver_cpu_time.is_none() {
            log::debug!("the solver did not report its cpu time");
        }
    }

    Ok(verdict)
}

fn decode(
    config: &Config,
    artifacts: &RunArtifacts,
    metrics: &mut Metrics,
) -> Result<Vec<i64>, PipelineError> {
    let mut command = compiler_command(config);
    command
        .arg("-competition")
        .arg("-decode")
        .arg(&artifacts.solution)
        .arg(&artifacts.map);

    let start = Instant::now();
    let output = execute(command)?;
    metrics.decode_time = Some(start.elapsed().as_secs_f64());

    output.require_success(Tool::Decoder)?;
    output::parse_decoder_output(&output.stdout)
}

fn compiler_command(config: &Config) -> Command {
    let mut command = Command::new(config.java());
    command.arg("-jar").arg(config.compiler());
    command
}

/// What a finished child process left behind.
struct ToolOutput {
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

impl ToolOutput {
    /// The compiler has no meaningful exit codes besides success.
    fn require_success(&self, tool: Tool) -> Result<(), PipelineError> {
        if self.code == Some(0) {
            Ok(())
        } else {
            Err(PipelineError::CompilerProcessError {
                tool,
                code: self.code,
                stdout: self.stdout.clone(),
                stderr: self.stderr.clone(),
            })
        }
    }

    /// Both streams as one text, the statistics of stderr followed by the verdict on stdout.
    fn diagnostics(&self) -> String {
        let mut diagnostics = self.stderr.clone();
        if !diagnostics.is_empty() && !diagnostics.ends_with('\n') {
            diagnostics.push('\n');
        }
        diagnostics.push_str(&self.stdout);
        diagnostics
    }
}

fn execute(mut command: Command) -> Result<ToolOutput, PipelineError> {
    log::debug!("running {command:?}");

    let output = command
        .stdin(Stdio::null())
        .output()
        .map_err(|source| PipelineError::ToolLaunch {
            program: command.get_program().into(),
            source,
        })?;

    let output = ToolOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    log::debug!("exit code {:?}", output.code);
    if !output.stdout.is_empty() {
        log::debug!("stdout:\n{}", output.stdout.trim_end());
    }
    if !output.stderr.is_empty() {
        log::debug!("stderr:\n{}", output.stderr.trim_end());
    }

    Ok(output)
}
