use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use sugarsat::{
    termination::Interrupt, Config, Metrics, Outcome, PipelineError, Problem, Report, RunFailure,
};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve problem files with sugar and minisat.
    Solve(SolveArgs),

    /// Print the encoding of weighted-sum problem files without solving them.
    Encode(EncodeArgs),
}

#[derive(Args)]
struct SolveArgs {
    /// Problem files. A `.csp` file is handed to sugar as it is, a `.json` file holds a
    /// weighted-sum problem: `{"domains": [[1, 2], [1, 2]], "target": 4}`.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Folder for temporary files. Should be on a RAM disk for performance.
    #[arg(short, long)]
    tmp_folder: Option<PathBuf>,

    /// The minisat binary to use.
    #[arg(long, env = "SUGARSAT_MINISAT")]
    minisat: Option<PathBuf>,

    /// The sugar jar to use.
    #[arg(long, env = "SUGARSAT_SUGAR_JAR")]
    sugar_jar: Option<PathBuf>,

    /// The program used to run the sugar jar.
    #[arg(long, default_value = "java")]
    java: PathBuf,

    /// Keep the temporary files after each run.
    #[arg(short, long)]
    keep_tmpfiles: bool,

    /// Let minisat print its full statistics.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args)]
struct EncodeArgs {
    /// Weighted-sum problem files in JSON.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Format::Csp)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csp,
    Xcsp,
}

#[derive(Deserialize)]
struct ProblemFile {
    domains: Vec<Vec<i64>>,
    target: i64,
}

fn main() -> ExitCode {
    env_logger::builder()
        .format(|buf, record| writeln!(buf, "c [{}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Solve(args) => solve(args),
        Command::Encode(args) => encode(args),
    }
}

fn solve(args: SolveArgs) -> ExitCode {
    let mut builder = Config::builder()
        .java(args.java)
        .keep_artifacts(args.keep_tmpfiles)
        .quiet_solver(!args.verbose);
    if let Some(minisat) = args.minisat {
        builder = builder.solver(minisat);
    }
    if let Some(sugar_jar) = args.sugar_jar {
        builder = builder.compiler(sugar_jar);
    }
    if let Some(tmp_folder) = args.tmp_folder {
        builder = builder.scratch_dir(tmp_folder);
    }

    let config = match builder.build() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let interrupt = Interrupt::register();
    let mut all_succeeded = true;

    for file in &args.files {
        if interrupt.is_requested() {
            eprintln!("Interrupted, skipping the remaining files.");
            return ExitCode::FAILURE;
        }

        println!(">>> Processing {}", file.display());

        let result = match file.extension() {
            Some(ext) if ext == "csp" => sugarsat::solve_file(&config, file),
            Some(ext) if ext == "json" => match load_problem(file) {
                Ok(problem) => sugarsat::solve(&config, &problem),
                Err(e) => {
                    eprintln!("Error: {e:#}");
                    all_succeeded = false;
                    continue;
                }
            },

            Some(_) | None => {
                eprintln!("The file type of '{}' is not supported.", file.display());
                all_succeeded = false;
                continue;
            }
        };

        match result {
            Ok(report) => print_report(&report),
            Err(failure) => {
                print_failure(&failure);
                all_succeeded = false;
            }
        }

        println!();
    }

    if all_succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn encode(args: EncodeArgs) -> ExitCode {
    let mut all_succeeded = true;

    for file in &args.files {
        match load_problem(file) {
            Ok(problem) => match args.format {
                Format::Csp => println!("{}", problem.to_csp()),
                Format::Xcsp => print!("{}", problem.to_xcsp()),
            },
            Err(e) => {
                eprintln!("Error: {e:#}");
                all_succeeded = false;
            }
        }
    }

    if all_succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn load_problem(path: &Path) -> anyhow::Result<Problem> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let problem_file: ProblemFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))?;

    Problem::weighted_sum(problem_file.domains, problem_file.target)
        .with_context(|| format!("invalid problem in {}", path.display()))
}

fn print_report(report: &Report) {
    let took = report.metrics.overall_time.unwrap_or_default();

    match &report.outcome {
        Outcome::Satisfiable(solution) => println!("SATISFIABLE {solution:?} Took {took:.6}"),
        Outcome::UnsatisfiableAtEncoding => {
            println!("UNSATISFIABLE (refuted by sugar) Took {took:.6}")
        }
        Outcome::UnsatisfiableAtSolving => {
            println!("UNSATISFIABLE (refuted by minisat) Took {took:.6}")
        }
    }

    print_metrics(&report.metrics);
}

fn print_failure(failure: &RunFailure) {
    eprintln!("Error: {failure}");

    let mut source = std::error::Error::source(failure);
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }

    match &failure.error {
        PipelineError::CompilerProcessError { stdout, stderr, .. }
        | PipelineError::SolverProcessError { stdout, stderr, .. } => {
            eprintln!("--- stdout ---\n{stdout}--- stderr ---\n{stderr}");
        }
        PipelineError::UnexpectedToolOutput { output, .. }
        | PipelineError::DecodeFailure { output, .. } => {
            eprintln!("--- output ---\n{output}");
        }
        _ => {}
    }

    print_metrics(&failure.metrics);
}

fn print_metrics(metrics: &Metrics) {
    match serde_json::to_string_pretty(metrics) {
        Ok(json) => println!("{json}"),
        Err(e) => log::warn!("failed to serialize the metrics: {e}"),
    }
}
