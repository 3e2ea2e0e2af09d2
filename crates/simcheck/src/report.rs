//! Text rendering of case results and run summaries.
//!
//! Every function returns a `String` so the binary decides where it goes.
//! Colour is applied here and nowhere else; `plain` turns it off.

use std::fmt::Write;

use console::{Color, style};
use simcheck_verify::{CheckOutcome, VerdictStatus};

use crate::orchestrator::{CaseResult, RunReport};
use crate::suite::TestCase;
use crate::suite::official::{Category, SelftestReport, Width};

/// Width of `=` rules around headers and summaries.
pub const RULE_WIDTH: usize = 70;

/// Padding of case names in result lines.
pub const NAME_WIDTH: usize = 40;

/// Indent of check and output lines under a result line.
const INDENT: &str = "       ";

const GROUP_RULE: &str = "+-+-+-+-+-+-+-+-+-+-+-+-+-+";

/// When captured simulator output is printed under a result line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DumpPolicy {
    Never,
    /// Only for cases that ran and did not pass.
    #[default]
    OnFailure,
    Always,
}

/// Rendering switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// No colour.
    pub plain: bool,
    /// Hide passing cases.
    pub no_pass: bool,
    /// List every check with its detail.
    pub verbose: bool,
    pub dump: DumpPolicy,
}

impl ReportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_plain(mut self, plain: bool) -> Self {
        self.plain = plain;
        self
    }

    #[must_use]
    pub const fn with_no_pass(mut self, no_pass: bool) -> Self {
        self.no_pass = no_pass;
        self
    }

    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use]
    pub const fn with_dump(mut self, dump: DumpPolicy) -> Self {
        self.dump = dump;
        self
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.plain {
            text.to_string()
        } else {
            style(text).fg(color).bold().to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.plain {
            text.to_string()
        } else {
            style(text).dim().to_string()
        }
    }

    /// Fixed-width status tag for a result line.
    pub fn tag(&self, status: VerdictStatus) -> String {
        let (text, color) = match status {
            VerdictStatus::Pass => ("[OK]  ", Color::Green),
            VerdictStatus::Fail => ("[FAIL]", Color::Red),
            VerdictStatus::Error => ("[ERR] ", Color::Red),
            VerdictStatus::Skipped => ("[SKIP]", Color::Yellow),
        };
        self.paint(text, color)
    }

    fn shows(&self, result: &CaseResult) -> bool {
        !(self.no_pass && result.verdict.is_pass())
    }

    fn dumps(&self, result: &CaseResult) -> bool {
        match self.dump {
            DumpPolicy::Never => false,
            DumpPolicy::Always => true,
            DumpPolicy::OnFailure => {
                !result.verdict.is_pass() && !result.verdict.is_skipped()
            }
        }
    }
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

// ============================================================================
// Flat suites
// ============================================================================

/// Banner before a suite run.
pub fn render_header(count: usize, mode: &str) -> String {
    format!("{}\nRunning {count} tests ({mode})\n{}\n", rule(), rule())
}

/// Result line for one case, with check and output details underneath.
///
/// Empty when the case is hidden by `no_pass`.
pub fn render_result(result: &CaseResult, opts: &ReportOptions) -> String {
    if !opts.shows(result) {
        return String::new();
    }

    let mut out = format!(
        "{} {:<NAME_WIDTH$} {}\n",
        opts.tag(result.verdict.status),
        result.name,
        result.verdict.message
    );
    render_checks(&mut out, &result.verdict.checks, opts);
    if opts.dumps(result) {
        render_output(&mut out, result, opts);
    }
    out
}

fn render_checks(out: &mut String, checks: &[CheckOutcome], opts: &ReportOptions) {
    for check in checks {
        if !opts.verbose && check.passed {
            continue;
        }
        let mark = if check.passed {
            opts.paint("✓", Color::Green)
        } else {
            opts.paint("✗", Color::Red)
        };
        let _ = writeln!(out, "{INDENT}{mark} {}: {}", check.name, check.message);
        if opts.verbose
            && let Some(detail) = &check.detail
        {
            let _ = writeln!(out, "{INDENT}  {}", opts.dim(detail));
        }
    }
}

fn render_output(out: &mut String, result: &CaseResult, opts: &ReportOptions) {
    let Some(output) = &result.output else {
        return;
    };
    for (label, text) in [("stderr", &output.stderr), ("stdout", &output.stdout)] {
        if text.trim().is_empty() {
            continue;
        }
        let _ = writeln!(out, "{INDENT}{}", opts.dim(&format!("--- {label} ---")));
        for line in text.lines() {
            let _ = writeln!(out, "{INDENT}{line}");
        }
    }
}

/// Totals and the list of failed cases.
pub fn render_summary(report: &RunReport, opts: &ReportOptions) -> String {
    let mut out = format!("\n{}\n", rule());
    let _ = write!(
        out,
        "Results: {}/{} passed",
        report.passed(),
        report.attempted()
    );
    if report.skipped() > 0 {
        let _ = write!(out, " ({} skipped)", report.skipped());
    }
    let _ = writeln!(out, "\n{}", rule());

    let failures: Vec<&CaseResult> = report.failures().collect();
    if !failures.is_empty() {
        let _ = writeln!(out, "\n{}", opts.paint("Failed tests:", Color::Red));
        for failure in failures {
            let _ = writeln!(out, "  - {}", failure.name);
        }
    }
    out
}

/// Registry listing: one `name: description` line per case.
pub fn render_list(title: &str, cases: &[TestCase]) -> String {
    let mut out = format!("{title}\n");
    for case in cases {
        let _ = writeln!(
            out,
            "  {}: {}",
            case.name,
            case.description.as_deref().unwrap_or("")
        );
    }
    out
}

// ============================================================================
// Grouped conformance output
// ============================================================================

/// Section banner.
pub fn render_section(title: &str) -> String {
    format!("\n{GROUP_RULE} {title} {GROUP_RULE}\n")
}

/// Section banner for a category.
pub fn render_category(category: Category) -> String {
    render_section(&category.title())
}

/// Sub-banner for one register width.
pub fn render_width(width: Width) -> String {
    format!("--- {} bit register tests ---\n", width.bits())
}

/// Per-case lines of one group, names padded to the longest, then the
/// group total.
pub fn render_group(report: &RunReport, opts: &ReportOptions) -> String {
    let pad = report
        .results
        .iter()
        .map(|r| r.name.len())
        .max()
        .unwrap_or(0)
        + 2;

    let mut out = String::new();
    for result in &report.results {
        if !opts.shows(result) {
            continue;
        }
        let status = if result.verdict.is_pass() {
            opts.paint("PASS", Color::Green)
        } else {
            opts.paint(result.verdict.status.as_str(), Color::Red)
        };
        let _ = write!(out, "{:<pad$}: {status}", result.name);
        if !result.verdict.is_pass() {
            let _ = write!(out, " ({})", result.verdict.message);
        }
        out.push('\n');
        if opts.dumps(result) {
            render_output(&mut out, result, opts);
        }
    }
    let _ = writeln!(
        out,
        "{}/{} tests successful.",
        report.passed(),
        report.attempted()
    );
    out
}

/// Self-test disagreements, one line per kind.
pub fn render_selftest(selftest: &SelftestReport) -> String {
    let list = |names: &[String]| format!("[{}]", names.join(", "));
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Test passed but was expected to fail:{}",
        list(&selftest.passed_expected_fail)
    );
    let _ = writeln!(
        out,
        "Test failed but was expected to pass:{}",
        list(&selftest.failed_expected_pass)
    );
    let _ = writeln!(out, "Test ended in error :{}", list(&selftest.errored));
    out
}

/// One line of a multi-suite summary.
pub fn render_suite_status(label: &str, passed: bool, opts: &ReportOptions) -> String {
    let status = if passed {
        opts.paint("PASSED", Color::Green)
    } else {
        opts.paint("FAILED", Color::Red)
    };
    format!("{:<18} {status}\n", format!("{label}:"))
}
