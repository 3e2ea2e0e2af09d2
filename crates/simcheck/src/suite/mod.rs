//! Test case model and the built-in suites.

pub mod debuginfo;
pub mod functional;
pub mod official;

use std::path::{Path, PathBuf};

use simcheck_verify::{Expectation, SentinelProtocol};

use crate::config::{HarnessConfig, ToolchainKind};
use crate::process::ModeFlags;

/// How a run is judged.
#[derive(Debug, Clone, PartialEq)]
pub enum Protocol {
    /// Magic value in a result register.
    Sentinel(SentinelProtocol),
    /// Declarative property checks.
    Property(Expectation),
}

/// Precondition under which a case is not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipCondition {
    /// Skip when the inputs were built by this toolchain.
    Toolchain(ToolchainKind),
    /// Skip, rather than error, when the input file does not exist.
    IfMissing,
}

/// A single declared test case.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    /// Unique name, used for filtering and reporting.
    pub name: String,
    /// ELF passed to the simulator.
    pub input: PathBuf,
    pub protocol: Protocol,
    /// Switches the protocol needs (register dump, trace), merged with the
    /// harness mode at run time.
    pub flags: ModeFlags,
    pub skip: Vec<SkipCondition>,
    /// One-line description for listings.
    pub description: Option<String>,
}

impl TestCase {
    /// Create a case with no skip conditions.
    pub fn new(name: impl Into<String>, input: impl Into<PathBuf>, protocol: Protocol) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            protocol,
            flags: ModeFlags::default(),
            skip: Vec::new(),
            description: None,
        }
    }

    /// Sentinel-protocol case with the default marker layout.
    pub fn sentinel(name: impl Into<String>, input: impl Into<PathBuf>) -> Self {
        Self::new(name, input, Protocol::Sentinel(SentinelProtocol::default()))
            .with_flags(ModeFlags::new().with_dump_registers(true))
    }

    /// Set the protocol's simulator switches.
    #[must_use]
    pub fn with_flags(mut self, flags: ModeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Add a skip condition.
    #[must_use]
    pub fn with_skip(mut self, condition: SkipCondition) -> Self {
        self.skip.push(condition);
        self
    }

    /// Set the listing description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Reason to skip this case under `config`, if any.
    pub fn skip_reason(&self, config: &HarnessConfig) -> Option<String> {
        self.skip.iter().find_map(|condition| match condition {
            SkipCondition::Toolchain(kind) if *kind == config.toolchain => {
                Some(format!("{kind} builds not supported"))
            }
            SkipCondition::IfMissing if !self.input.exists() => {
                Some("input not built".to_string())
            }
            _ => None,
        })
    }

    /// Whether the case name matches a substring filter.
    pub fn matches(&self, filter: &str) -> bool {
        self.name.contains(filter)
    }
}

/// File name of `path` as a string, or the full path when it has none.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    )
}
