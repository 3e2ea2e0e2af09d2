//! Instruction trace records.
//!
//! The simulator prints one line per traced pipeline stage:
//!
//! ```text
//! Fetch: addi a0,a0,1 [fact.c:12]
//! Decode: add a1,a0,a2
//! ```
//!
//! The bracketed source location appears only when the ELF carries debug
//! info the simulator could read.

mod parse;

pub use parse::parse_trace;

use std::fmt;
use std::str::FromStr;

/// Pipeline stage a trace line was emitted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Fetch,
    Decode,
    Execute,
    Memory,
    Writeback,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Self; 5] = [
        Self::Fetch,
        Self::Decode,
        Self::Execute,
        Self::Memory,
        Self::Writeback,
    ];

    /// Name as printed by the simulator.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "Fetch",
            Self::Decode => "Decode",
            Self::Execute => "Execute",
            Self::Memory => "Memory",
            Self::Writeback => "Writeback",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| format!("unknown pipeline stage '{s}'"))
    }
}

/// Source position attached to a traced instruction.
///
/// The line is kept signed so that bogus debug info (line 0 or negative)
/// survives parsing and can be reported by the line-validity check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: String,
    pub line: i64,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A single instruction trace entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    /// Stage that emitted the line.
    pub stage: Stage,
    /// Disassembled instruction text.
    pub instruction: String,
    /// Source file and line, present together or not at all.
    pub location: Option<SourceLocation>,
}

impl TraceEntry {
    /// Source file name, if the entry carries debug info.
    pub fn file(&self) -> Option<&str> {
        self.location.as_ref().map(|loc| loc.file.as_str())
    }

    /// Source line, if the entry carries debug info.
    pub fn line(&self) -> Option<i64> {
        self.location.as_ref().map(|loc| loc.line)
    }

    /// Whether the entry is annotated with a source location.
    pub const fn has_debug_info(&self) -> bool {
        self.location.is_some()
    }
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.instruction)?;
        if let Some(loc) = &self.location {
            write!(f, " [{loc}]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
