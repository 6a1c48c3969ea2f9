use std::{fmt, io, path::PathBuf};

use sugarsat_csp::EncodeError;
use thiserror::Error;

/// The two roles the compiler plays in a run. Solver failures have their own error variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tool {
    /// The compiler, encoding the problem to CNF.
    Encoder,
    /// The compiler, translating a SAT model back to the problem variables.
    Decoder,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tool::Encoder => f.write_str("encoder"),
            Tool::Decoder => f.write_str("decoder"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no path to the sugar jar was given")]
    MissingCompiler,

    #[error("the sugar jar '{}' is not a file", .0.display())]
    CompilerNotFound(PathBuf),

    #[error("could not find a minisat binary (explicit path, working directory or PATH)")]
    SolverNotFound,

    #[error("the scratch directory '{}' does not exist", .0.display())]
    ScratchDirMissing(PathBuf),

    #[error("the scratch directory '{}' is not writable", .0.display())]
    ScratchDirReadOnly(PathBuf),

    #[error("failed to determine the working directory")]
    WorkingDirectory(#[source] io::Error),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration")]
    Configuration(#[from] ConfigError),

    #[error("invalid problem")]
    InvalidInput(#[from] EncodeError),

    #[error("run artifact '{}' already exists", .0.display())]
    ArtifactCollision(PathBuf),

    #[error("failed to launch '{}'", .program.display())]
    ToolLaunch {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("the {tool} exited with {}", describe_exit(.code))]
    CompilerProcessError {
        tool: Tool,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("the {tool} produced unexpected output: {output:?}")]
    UnexpectedToolOutput { tool: Tool, output: String },

    #[error("the solver exited with {}", describe_exit(.code))]
    SolverProcessError {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("failed to decode the solution: {reason}")]
    DecodeFailure { reason: String, output: String },

    #[error("i/o error on '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> PipelineError {
        let path = path.into();
        move |source| PipelineError::Io { path, source }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_owned(),
    }
}
