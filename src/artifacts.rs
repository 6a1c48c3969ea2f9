//! Naming and lifetime of the files a run leaves in the scratch directory.
//!
//! Every run gets a [`RunId`], and all of its files are named after it: `{id}.csp` for the problem
//! text, `{id}.cnf` and `{id}.map` for the encoder output, and `{id}.out` for the solver model.
//! Identifiers combine a stem (a hash of the problem text, or the name of the problem file) with
//! the current time, the process id and a per-process sequence number, so runs issued at the same
//! time from one or several processes never share files.
use std::{
    collections::hash_map::DefaultHasher,
    fmt, fs,
    hash::{Hash, Hasher},
    io,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use crate::error::PipelineError;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RunId(String);

impl RunId {
    /// Use a caller-chosen identifier. The caller is responsible for keeping it unique among the
    /// runs sharing a scratch directory.
    pub fn new(id: impl Into<String>) -> RunId {
        RunId(id.into())
    }

    /// An identifier derived from the text of an encoded problem.
    pub fn from_content(content: &str) -> RunId {
        RunId::unique(&format!("{:016x}", content_hash(content)))
    }

    /// An identifier derived from the name of a problem file.
    pub fn from_file(path: &Path) -> RunId {
        let stem = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "problem".to_owned());

        RunId::unique(&stem)
    }

    fn unique(stem: &str) -> RunId {
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_micros())
            .unwrap_or_default();
        let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);

        RunId(format!(
            "{stem}_{micros}_{}_{sequence}",
            std::process::id()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stable hash of the problem text. Equal texts give equal hashes within one build.
pub fn content_hash(content: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}

/// The files belonging to one run.
#[derive(Clone, Debug)]
pub struct RunArtifacts {
    pub problem: PathBuf,
    pub cnf: PathBuf,
    pub map: PathBuf,
    pub solution: PathBuf,
    owns_problem: bool,
}

impl RunArtifacts {
    /// Artifacts for a run which writes its own problem file into the scratch directory.
    pub fn new(scratch_dir: &Path, id: &RunId) -> RunArtifacts {
        RunArtifacts {
            problem: scratch_dir.join(format!("{id}.csp")),
            owns_problem: true,
            ..RunArtifacts::for_problem_file(scratch_dir, id, PathBuf::new())
        }
    }

    /// Artifacts for a run on an existing problem file. That file is never removed.
    pub fn for_problem_file(scratch_dir: &Path, id: &RunId, problem: PathBuf) -> RunArtifacts {
        RunArtifacts {
            problem,
            cnf: scratch_dir.join(format!("{id}.cnf")),
            map: scratch_dir.join(format!("{id}.map")),
            solution: scratch_dir.join(format!("{id}.out")),
            owns_problem: false,
        }
    }

    /// Make sure none of the files this run will create exist yet.
    pub fn claim(&self) -> Result<(), PipelineError> {
        let owned_problem = self.owns_problem.then_some(&self.problem);

        match owned_problem
            .into_iter()
            .chain([&self.cnf, &self.map, &self.solution])
            .find(|path| path.exists())
        {
            Some(path) => Err(PipelineError::ArtifactCollision(path.clone())),
            None => Ok(()),
        }
    }

    /// Remove the files created by the run, unless `keep` is set. Files that were never created
    /// are skipped; other failures are logged.
    pub fn cleanup(&self, keep: bool) {
        if keep {
            log::info!("keeping the run artifacts next to {}", self.cnf.display());
            return;
        }

        let owned_problem = self.owns_problem.then_some(&self.problem);

        for path in owned_problem
            .into_iter()
            .chain([&self.cnf, &self.map, &self.solution])
        {
            match fs::remove_file(path) {
                Ok(()) => log::debug!("removed {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("failed to remove {}: {e}", path.display()),
            }
        }
    }
}

pub(crate) fn file_size(path: &Path) -> Result<u64, PipelineError> {
    let size = fs::metadata(path)
        .map(|metadata| metadata.len())
        .map_err(PipelineError::io(path))?;

    log::debug!("{} is {size} bytes", path.display());
    Ok(size)
}
