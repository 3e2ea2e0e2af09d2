//! simcheck - verification harness for instruction-set simulators
//!
//! Runs a command-line simulator on test ELFs, parses its text output and
//! turns each run into a PASS / FAIL / ERROR / SKIP verdict.
//!
//! # Example
//!
//! ```ignore
//! use simcheck::{HarnessConfig, run_suite, suite::functional};
//!
//! let config = HarnessConfig::default().with_simulator("build/qtrvsim_cli");
//! let cases = functional::cases("tests/stud-support/elfs".as_ref());
//! let report = run_suite(&cases, None, &config)?;
//! assert!(report.all_passed());
//! ```

// Re-export from sub-crates
pub use simcheck_output::{RegisterId, RegisterSet, SimOutput, TraceEntry};
pub use simcheck_verify::{
    CheckOutcome, ExitPolicy, Expectation, SentinelProtocol, Verdict, VerdictStatus,
};

pub mod config;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod process;
pub mod report;
pub mod suite;

pub use config::{HarnessConfig, ToolchainKind};
pub use error::{ProcessError, Result, SuiteError};
pub use orchestrator::{CaseResult, RunReport, run_case, run_suite, run_suite_with};
pub use process::{CachePolicy, ModeFlags, ProcessOutput};
pub use suite::{Protocol, SkipCondition, TestCase};
