//! Solve weighted-sum equality problems with sugar and minisat.
//!
//! A run writes the problem in the Sugar CSP format to the scratch directory, lets the sugar jar
//! encode it to CNF, solves the CNF with minisat and lets sugar translate the model back to the
//! problem variables. The tools run one after the other as child processes; runs do not share
//! any state besides the scratch directory, so independent runs may be issued from several
//! threads at once.
//!
//! ```no_run
//! use sugarsat::{Config, Outcome};
//!
//! let config = Config::builder()
//!     .compiler("sugar-v1-15-0.jar")
//!     .scratch_dir("/tmp")
//!     .build()?;
//!
//! let report = sugarsat::solve_weighted_sum(&config, [[1, 2], [1, 2]], 4)?;
//! assert_eq!(Outcome::Satisfiable(vec![2, 2]), report.outcome);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::Path,
    time::Instant,
};

pub mod artifacts;
pub mod config;
mod error;
pub mod output;
mod report;
mod runner;
pub mod termination;

pub use artifacts::{RunArtifacts, RunId};
pub use config::{Config, ConfigBuilder};
pub use error::{ConfigError, PipelineError, Tool};
pub use report::{Metrics, Outcome, Report, RunFailure};
pub use sugarsat_csp::{weighted_sum_to_csp, Domain, EncodeError, Problem};

/// Build the weighted-sum problem and solve it. An empty domain fails before any tool runs.
pub fn solve_weighted_sum<Domains, Values>(
    config: &Config,
    domains: Domains,
    target: i64,
) -> Result<Report, RunFailure>
where
    Domains: IntoIterator<Item = Values>,
    Values: IntoIterator<Item = i64>,
{
    let start = Instant::now();

    match Problem::weighted_sum(domains, target) {
        Ok(problem) => solve(config, &problem),
        Err(e) => Err(RunFailure {
            run_id: RunId::new("invalid"),
            error: e.into(),
            metrics: Metrics {
                overall_time: Some(start.elapsed().as_secs_f64()),
                ..Metrics::default()
            },
        }),
    }
}

/// Solve `problem` under an identifier derived from its encoding.
pub fn solve(config: &Config, problem: &Problem) -> Result<Report, RunFailure> {
    let csp = problem.to_csp();
    let run_id = RunId::from_content(&csp);

    solve_encoded(config, problem, &csp, run_id)
}

/// Solve `problem` under a caller-chosen identifier.
pub fn solve_with_id(
    config: &Config,
    problem: &Problem,
    run_id: RunId,
) -> Result<Report, RunFailure> {
    solve_encoded(config, problem, &problem.to_csp(), run_id)
}

fn solve_encoded(
    config: &Config,
    problem: &Problem,
    csp: &str,
    run_id: RunId,
) -> Result<Report, RunFailure> {
    let artifacts = RunArtifacts::new(config.scratch_dir(), &run_id);

    execute(config, run_id, &artifacts, |metrics| {
        let start = Instant::now();
        write_new_file(&artifacts.problem, csp)?;
        metrics.create_csp_time = Some(start.elapsed().as_secs_f64());
        metrics.csp_file_size = Some(artifacts::file_size(&artifacts.problem)?);

        let outcome = runner::run(config, &artifacts, metrics)?;

        if let Outcome::Satisfiable(solution) = &outcome {
            if !problem.is_solution(solution) {
                return Err(PipelineError::DecodeFailure {
                    reason: format!("{solution:?} does not solve the problem"),
                    output: String::new(),
                });
            }
        }

        Ok(outcome)
    })
}

/// Solve an existing problem file in the Sugar CSP format. The file itself is left alone; the
/// run identifier is derived from its name.
pub fn solve_file(config: &Config, path: impl AsRef<Path>) -> Result<Report, RunFailure> {
    let path = path.as_ref();
    solve_file_with_id(config, path, RunId::from_file(path))
}

pub fn solve_file_with_id(
    config: &Config,
    path: impl AsRef<Path>,
    run_id: RunId,
) -> Result<Report, RunFailure> {
    let artifacts =
        RunArtifacts::for_problem_file(config.scratch_dir(), &run_id, path.as_ref().into());

    execute(config, run_id, &artifacts, |metrics| {
        if !artifacts.problem.is_file() {
            return Err(PipelineError::Io {
                path: artifacts.problem.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such problem file"),
            });
        }

        metrics.csp_file_size = Some(artifacts::file_size(&artifacts.problem)?);
        runner::run(config, &artifacts, metrics)
    })
}

/// Claim the artifacts, run `stages` and clean up after them, whatever the outcome.
fn execute(
    config: &Config,
    run_id: RunId,
    artifacts: &RunArtifacts,
    stages: impl FnOnce(&mut Metrics) -> Result<Outcome, PipelineError>,
) -> Result<Report, RunFailure> {
    let start = Instant::now();
    let mut metrics = Metrics::default();

    log::debug!("starting run {run_id}");

    // Nothing was created yet, so a collision leaves nothing to clean up.
    if let Err(error) = artifacts.claim() {
        return Err(RunFailure {
            run_id,
            error,
            metrics,
        });
    }

    let outcome = stages(&mut metrics);
    match &outcome {
        // Another run created the problem file between the claim and the write, so every
        // artifact with this identifier is theirs.
        Err(PipelineError::ArtifactCollision(path)) => {
            log::warn!("{} appeared during the run, leaving the artifacts", path.display())
        }
        _ => artifacts.cleanup(config.keep_artifacts()),
    }
    metrics.overall_time = Some(start.elapsed().as_secs_f64());

    match outcome {
        Ok(outcome) => Ok(Report {
            run_id,
            outcome,
            metrics,
        }),
        Err(error) => Err(RunFailure {
            run_id,
            error,
            metrics,
        }),
    }
}

fn write_new_file(path: &Path, contents: &str) -> Result<(), PipelineError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => PipelineError::ArtifactCollision(path.to_path_buf()),
            _ => PipelineError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

    file.write_all(contents.as_bytes())
        .map_err(PipelineError::io(path))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn late_collision_leaves_the_other_runs_files() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let jar = dir.path().join("sugar.jar");
        let solver = dir.path().join("minisat");
        fs::write(&jar, "").expect("create jar");
        fs::write(&solver, "").expect("create solver");
        let config = Config::builder()
            .compiler(&jar)
            .solver(&solver)
            .scratch_dir(dir.path())
            .build()
            .expect("valid configuration");

        let artifacts = RunArtifacts::new(dir.path(), &RunId::new("race"));
        let failure = execute(&config, RunId::new("race"), &artifacts, |_| {
            fs::write(&artifacts.problem, "(int V1 D1)").expect("other run writes");
            fs::write(&artifacts.cnf, "p cnf 0 0").expect("other run writes");
            write_new_file(&artifacts.problem, "(int V1 D2)")?;
            Ok(Outcome::UnsatisfiableAtEncoding)
        })
        .expect_err("problem file was taken");

        assert!(matches!(failure.error, PipelineError::ArtifactCollision(_)));
        assert_eq!(
            "(int V1 D1)",
            fs::read_to_string(&artifacts.problem).expect("still there")
        );
        assert!(artifacts.cnf.exists());
    }
}
