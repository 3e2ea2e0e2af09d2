//! Property protocol: check parsed output against a declarative expectation.

mod checks;

pub use checks::{
    check_cycles, check_debuginfo_coverage, check_exit_code, check_file_presence, check_format,
    check_line_validity, check_marker, check_register,
};

use simcheck_output::SimOutput;

use crate::{CheckOutcome, Verdict};

/// How the process exit code is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitPolicy {
    /// Exit code is not checked.
    #[default]
    Any,
    /// Exit code must be 0.
    RequireZero,
    /// Exit code must equal the given value.
    Expect(i32),
}

impl ExitPolicy {
    /// Expected exit code, `None` under [`ExitPolicy::Any`].
    pub const fn expected(self) -> Option<i32> {
        match self {
            Self::Any => None,
            Self::RequireZero => Some(0),
            Self::Expect(code) => Some(code),
        }
    }
}

/// Inclusive cycle count range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleBounds {
    pub min: u64,
    pub max: u64,
}

impl CycleBounds {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub const fn contains(self, cycles: u64) -> bool {
        self.min <= cycles && cycles <= self.max
    }
}

/// Declarative description of a correct run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expectation {
    /// Exit code policy.
    pub exit: ExitPolicy,
    /// Expected register values, by any accepted register spelling.
    pub registers: Vec<(String, u64)>,
    /// Accepted cycle range.
    pub cycles: Option<CycleBounds>,
    /// Fail when the simulator printed no cycle count.
    pub cycles_required: bool,
    /// Literal substring that must occur in stdout.
    pub marker: Option<String>,
    /// Source filename suffixes, at least one of which must appear in the trace.
    pub source_files: Vec<String>,
    /// Minimum fraction of trace entries carrying a source location.
    pub min_coverage: Option<f64>,
    /// Run the trace format and line-number checks.
    pub trace_checks: bool,
}

impl Expectation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the exit code policy.
    #[must_use]
    pub const fn with_exit(mut self, exit: ExitPolicy) -> Self {
        self.exit = exit;
        self
    }

    /// Expect a register value.
    #[must_use]
    pub fn with_register(mut self, name: impl Into<String>, value: u64) -> Self {
        self.registers.push((name.into(), value));
        self
    }

    /// Bound the cycle count.
    #[must_use]
    pub const fn with_cycles(mut self, min: u64, max: u64) -> Self {
        self.cycles = Some(CycleBounds::new(min, max));
        self
    }

    /// Require the simulator to report a cycle count.
    #[must_use]
    pub const fn with_cycles_required(mut self, required: bool) -> Self {
        self.cycles_required = required;
        self
    }

    /// Require a literal substring in stdout.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Require at least one trace filename ending in one of the suffixes.
    #[must_use]
    pub fn with_source_files<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_files = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Require a minimum debug-info coverage (0.0-1.0).
    #[must_use]
    pub const fn with_min_coverage(mut self, threshold: f64) -> Self {
        self.min_coverage = Some(threshold);
        self
    }

    /// Enable the trace format and line-number checks.
    #[must_use]
    pub const fn with_trace_checks(mut self, enabled: bool) -> Self {
        self.trace_checks = enabled;
        self
    }

    fn checks_trace(&self) -> bool {
        self.trace_checks || !self.source_files.is_empty() || self.min_coverage.is_some()
    }
}

/// Aggregated result of [`verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// Whether every check passed.
    pub passed: bool,
    /// Check outcomes in the order they ran.
    pub checks: Vec<CheckOutcome>,
}

impl Verification {
    fn from_checks(checks: Vec<CheckOutcome>) -> Self {
        Self {
            passed: checks.iter().all(|c| c.passed),
            checks,
        }
    }

    /// Outcomes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|c| !c.passed)
    }

    /// Convert into a verdict.
    ///
    /// A passing verdict reports the cycle count when one was parsed; a
    /// failing one joins the messages of every failed check.
    pub fn into_verdict(self, cycles: Option<u64>) -> Verdict {
        if self.passed {
            let message = cycles.map_or_else(
                || format!("{} checks passed", self.checks.len()),
                |n| format!("{n} cycles"),
            );
            return Verdict::pass(message).with_checks(self.checks);
        }
        let message = self
            .failures()
            .map(|c| c.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Verdict::fail(message).with_checks(self.checks)
    }
}

/// Run every applicable check of `expectation` against `output`.
///
/// An exit code mismatch under a strict policy stops verification before
/// the output is inspected. A trace format violation stops the remaining
/// trace checks. Everything else runs independently.
pub fn verify(output: &SimOutput, expectation: &Expectation) -> Verification {
    let mut checks = Vec::new();

    if let Some(outcome) = check_exit_code(expectation.exit, output.exit_code) {
        let stop = !outcome.passed;
        checks.push(outcome);
        if stop {
            return Verification::from_checks(checks);
        }
    }

    for (name, expected) in &expectation.registers {
        checks.push(check_register(&output.registers, name, *expected));
    }

    if let Some(outcome) =
        check_cycles(output.cycles, expectation.cycles, expectation.cycles_required)
    {
        checks.push(outcome);
    }

    if let Some(marker) = &expectation.marker {
        checks.push(check_marker(&output.stdout, marker));
    }

    if expectation.checks_trace() {
        let format = check_format(&output.trace);
        let malformed = !format.passed;
        checks.push(format);
        if !malformed {
            if !expectation.source_files.is_empty() {
                checks.push(check_file_presence(
                    &output.trace,
                    &expectation.source_files,
                ));
            }
            if expectation.trace_checks {
                checks.push(check_line_validity(&output.trace));
            }
            if let Some(threshold) = expectation.min_coverage {
                checks.push(check_debuginfo_coverage(&output.trace, threshold));
            }
        }
    }

    for outcome in checks.iter().filter(|c| !c.passed) {
        tracing::debug!(check = %outcome.name, "{}", outcome.message);
    }

    Verification::from_checks(checks)
}

#[cfg(test)]
mod tests;
