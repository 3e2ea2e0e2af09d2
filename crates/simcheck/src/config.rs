//! Harness configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::process::ModeFlags;

/// Default simulator executable name.
pub const DEFAULT_SIMULATOR: &str = "qtrvsim_cli";

/// Default per-case timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Toolchain that produced the test binaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToolchainKind {
    #[default]
    Gcc,
    Clang,
}

impl ToolchainKind {
    /// Infer the toolchain from a build directory name.
    ///
    /// Build directories produced by the Clang flow carry `clang` in their
    /// final path component (`elfs-clang`, `build_Clang`).
    pub fn detect(build_dir: &Path) -> Self {
        let is_clang = build_dir
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.to_ascii_lowercase().contains("clang"));
        if is_clang { Self::Clang } else { Self::Gcc }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gcc => "gcc",
            Self::Clang => "clang",
        }
    }
}

impl fmt::Display for ToolchainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolchainKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gcc" | "gnu" => Ok(Self::Gcc),
            "clang" | "llvm" => Ok(Self::Clang),
            _ => Err(format!("unknown toolchain '{s}', expected gcc or clang")),
        }
    }
}

/// Everything a run needs besides the test cases themselves.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Simulator executable.
    pub simulator: PathBuf,
    /// Per-case timeout.
    pub timeout: Duration,
    /// Simulator mode flags added to every case (pipeline, caches).
    pub mode: ModeFlags,
    /// Toolchain that built the inputs.
    pub toolchain: ToolchainKind,
    /// Worker count; 1 runs sequentially.
    pub jobs: usize,
    /// Build tool used to rebuild conformance binaries.
    pub make: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            simulator: PathBuf::from(DEFAULT_SIMULATOR),
            timeout: DEFAULT_TIMEOUT,
            mode: ModeFlags::default(),
            toolchain: ToolchainKind::default(),
            jobs: 1,
            make: PathBuf::from("make"),
        }
    }
}

impl HarnessConfig {
    /// Set the simulator executable.
    #[must_use]
    pub fn with_simulator(mut self, path: impl Into<PathBuf>) -> Self {
        self.simulator = path.into();
        self
    }

    /// Set the per-case timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the simulator mode flags.
    #[must_use]
    pub fn with_mode(mut self, mode: ModeFlags) -> Self {
        self.mode = mode;
        self
    }

    /// Set the toolchain kind.
    #[must_use]
    pub const fn with_toolchain(mut self, toolchain: ToolchainKind) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// Set the worker count (0 = one per CPU).
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        self
    }

    /// Set the build tool.
    #[must_use]
    pub fn with_make(mut self, make: impl Into<PathBuf>) -> Self {
        self.make = make.into();
        self
    }
}
