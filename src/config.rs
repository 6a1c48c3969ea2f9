use std::{
    env,
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use crate::error::ConfigError;

/// The file name the solver is looked up by when no explicit path is usable.
pub const SOLVER_NAME: &str = "minisat";

/// The locations of the external tools and of the scratch directory, validated once and shared
/// by every run.
#[derive(Clone, Debug)]
pub struct Config {
    solver: PathBuf,
    compiler: PathBuf,
    java: PathBuf,
    scratch_dir: PathBuf,
    keep_artifacts: bool,
    quiet_solver: bool,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// The resolved minisat executable.
    pub fn solver(&self) -> &Path {
        &self.solver
    }

    /// The sugar jar, used for both encoding and decoding.
    pub fn compiler(&self) -> &Path {
        &self.compiler
    }

    /// The program that runs the sugar jar.
    pub fn java(&self) -> &Path {
        &self.java
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Whether run artifacts are left in the scratch directory.
    pub fn keep_artifacts(&self) -> bool {
        self.keep_artifacts
    }

    /// Whether the solver is started with `-verbosity=0`.
    pub fn quiet_solver(&self) -> bool {
        self.quiet_solver
    }
}

#[derive(Clone, Debug)]
pub struct ConfigBuilder {
    solver: Option<PathBuf>,
    compiler: Option<PathBuf>,
    java: PathBuf,
    scratch_dir: Option<PathBuf>,
    keep_artifacts: bool,
    quiet_solver: bool,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        ConfigBuilder {
            solver: None,
            compiler: None,
            java: PathBuf::from("java"),
            scratch_dir: None,
            keep_artifacts: false,
            quiet_solver: true,
        }
    }
}

impl ConfigBuilder {
    pub fn solver(mut self, path: impl Into<PathBuf>) -> Self {
        self.solver = Some(path.into());
        self
    }

    pub fn compiler(mut self, path: impl Into<PathBuf>) -> Self {
        self.compiler = Some(path.into());
        self
    }

    pub fn java(mut self, program: impl Into<PathBuf>) -> Self {
        self.java = program.into();
        self
    }

    /// Defaults to the temporary directory of the operating system.
    pub fn scratch_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(path.into());
        self
    }

    pub fn keep_artifacts(mut self, keep: bool) -> Self {
        self.keep_artifacts = keep;
        self
    }

    pub fn quiet_solver(mut self, quiet: bool) -> Self {
        self.quiet_solver = quiet;
        self
    }

    /// Check that the sugar jar and the scratch directory exist and find the solver. All paths
    /// in the resulting configuration are absolute.
    pub fn build(self) -> Result<Config, ConfigError> {
        let cwd = env::current_dir().map_err(ConfigError::WorkingDirectory)?;

        let compiler = cwd.join(self.compiler.ok_or(ConfigError::MissingCompiler)?);
        if !compiler.is_file() {
            return Err(ConfigError::CompilerNotFound(compiler));
        }

        let search_path = env::var_os("PATH");
        let solver = resolve_solver_in(self.solver.as_deref(), &cwd, search_path.as_deref())
            .ok_or(ConfigError::SolverNotFound)?;

        let scratch_dir = cwd.join(self.scratch_dir.unwrap_or_else(env::temp_dir));
        match fs::metadata(&scratch_dir) {
            Ok(metadata) if !metadata.is_dir() => {
                return Err(ConfigError::ScratchDirMissing(scratch_dir))
            }
            Ok(metadata) if metadata.permissions().readonly() => {
                return Err(ConfigError::ScratchDirReadOnly(scratch_dir))
            }
            Ok(_) => {}
            Err(_) => return Err(ConfigError::ScratchDirMissing(scratch_dir)),
        }

        log::debug!(
            "solver {}, sugar jar {}, scratch directory {}",
            solver.display(),
            compiler.display(),
            scratch_dir.display()
        );

        Ok(Config {
            solver,
            compiler,
            java: self.java,
            scratch_dir,
            keep_artifacts: self.keep_artifacts,
            quiet_solver: self.quiet_solver,
        })
    }
}

/// Find the solver: the explicit path if it points to a file, otherwise [`SOLVER_NAME`] in the
/// working directory, otherwise the first [`SOLVER_NAME`] on the search path.
pub fn resolve_solver_in(
    explicit: Option<&Path>,
    cwd: &Path,
    search_path: Option<&OsStr>,
) -> Option<PathBuf> {
    if let Some(path) = explicit.map(|path| cwd.join(path)) {
        if path.is_file() {
            return Some(path);
        }

        log::warn!(
            "the solver '{}' does not exist, looking for '{SOLVER_NAME}' instead",
            path.display()
        );
    }

    let in_cwd = get_executable(cwd.join(SOLVER_NAME));
    if in_cwd.is_file() {
        return Some(in_cwd);
    }

    search_path.and_then(|search_path| {
        env::split_paths(search_path)
            .map(|dir| get_executable(dir.join(SOLVER_NAME)))
            .find(|candidate| candidate.is_file())
    })
}

fn get_executable(path: PathBuf) -> PathBuf {
    if cfg!(windows) {
        path.with_extension("exe")
    } else {
        path
    }
}
