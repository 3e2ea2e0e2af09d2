//! Parser for simulator text output.
//!
//! Turns the free-form stdout of the simulator into typed records:
//! register dumps (`R10:0x0000002a`), the cycle counter (`cycles: 120`) and
//! per-instruction trace lines (`Fetch: addi a0,a0,1 [fact.c:12]`).
//!
//! Parsing never fails. Malformed or missing pieces degrade to empty or
//! partial results; deciding whether that is good enough belongs to the
//! verdict layer.

mod registers;
pub mod trace;

pub use registers::{REG_ABI_NAMES, RegisterId, RegisterParseError, RegisterSet, parse_registers};
pub use trace::{SourceLocation, Stage, TraceEntry, parse_trace};

use std::sync::OnceLock;

use regex::Regex;

/// Parsed view of one simulator invocation.
#[derive(Debug, Clone, Default)]
pub struct SimOutput {
    /// Raw stdout text, kept for marker checks and diagnostics.
    pub stdout: String,
    /// Process exit code (`None` when unknown or killed by a signal).
    pub exit_code: Option<i32>,
    /// Register dump.
    pub registers: RegisterSet,
    /// Cycle counter, if the simulator printed one.
    pub cycles: Option<u64>,
    /// Instruction trace in emission order.
    pub trace: Vec<TraceEntry>,
}

impl SimOutput {
    /// Parse every record kind out of raw stdout.
    pub fn parse(stdout: impl Into<String>) -> Self {
        let stdout = stdout.into();
        let registers = parse_registers(&stdout);
        let cycles = parse_cycles(&stdout);
        let trace = parse_trace(&stdout);
        Self {
            stdout,
            exit_code: None,
            registers,
            cycles,
            trace,
        }
    }

    /// Attach the exit code of the process that produced this output.
    #[must_use]
    pub fn with_exit_code(mut self, code: Option<i32>) -> Self {
        self.exit_code = code;
        self
    }
}

/// Extract the cycle counter.
///
/// Matches `cycles:<digits>` with optional whitespace after the colon. Keys
/// that merely end in `cycles` (`d-cache:stalled-cycles: 4`) are not
/// counted. The first parseable match wins.
pub fn parse_cycles(text: &str) -> Option<u64> {
    let pattern = CYCLES_PATTERN
        .get_or_init(|| Regex::new(r"(?:^|[^\w-])cycles:[ \t]*(\d+)").unwrap());
    pattern
        .captures_iter(text)
        .find_map(|caps| caps.get(1)?.as_str().parse::<u64>().ok())
}

static CYCLES_PATTERN: OnceLock<Regex> = OnceLock::new();
