use std::fmt;

/// Outcome class of one test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerdictStatus {
    /// Expected result obtained.
    Pass,
    /// A result was obtained and it is wrong.
    Fail,
    /// No interpretable result (crash, timeout, unknown marker).
    Error,
    /// Not run because a precondition did not hold.
    Skipped,
}

impl VerdictStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Error => "ERROR",
            Self::Skipped => "SKIP",
        }
    }

    pub const fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single property check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Short check name (`cycles`, `register a0`, ...).
    pub name: String,
    pub passed: bool,
    /// One-line diagnostic.
    pub message: String,
    /// Extended diagnostic shown in verbose mode.
    pub detail: Option<String>,
}

impl CheckOutcome {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
            detail: None,
        }
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: message.into(),
            detail: None,
        }
    }

    /// Attach an extended diagnostic.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Verdict for one test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: VerdictStatus,
    /// Human-readable reason.
    pub message: String,
    /// Individual checks, empty for sentinel verdicts.
    pub checks: Vec<CheckOutcome>,
}

impl Verdict {
    fn new(status: VerdictStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            checks: Vec::new(),
        }
    }

    /// Create a passing verdict.
    pub fn pass(message: impl Into<String>) -> Self {
        Self::new(VerdictStatus::Pass, message)
    }

    /// Create a failing verdict.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(VerdictStatus::Fail, message)
    }

    /// Create an error verdict.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(VerdictStatus::Error, message)
    }

    /// Create a skipped verdict.
    pub fn skipped(message: impl Into<String>) -> Self {
        Self::new(VerdictStatus::Skipped, message)
    }

    /// Attach the individual check outcomes.
    #[must_use]
    pub fn with_checks(mut self, checks: Vec<CheckOutcome>) -> Self {
        self.checks = checks;
        self
    }

    pub const fn is_pass(&self) -> bool {
        self.status.is_pass()
    }

    pub const fn is_skipped(&self) -> bool {
        matches!(self.status, VerdictStatus::Skipped)
    }

    /// Failing checks, in the order they ran.
    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|c| !c.passed)
    }
}
