//! Error types.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures to obtain any output from the simulator.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("simulator binary not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("simulator binary is not executable: {}", .0.display())]
    NotExecutable(PathBuf),
    #[error("failed to spawn {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("timeout after {}s", .0.as_secs_f64())]
    Timeout(Duration),
}

impl ProcessError {
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Orchestration errors. Per-case problems are verdicts, not errors.
#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("no tests selected")]
    NoTests,
    #[error("no tests match filter: {0}")]
    NoMatch(String),
    #[error("test directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),
    #[error("no test binaries found in {}", .0.display())]
    NoBinaries(PathBuf),
    #[error("rebuild failed: {0}")]
    Rebuild(String),
    #[error(transparent)]
    Simulator(#[from] ProcessError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T, E = SuiteError> = std::result::Result<T, E>;
