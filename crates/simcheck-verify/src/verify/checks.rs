//! Individual property checks.

use std::collections::BTreeSet;

use simcheck_output::{RegisterSet, TraceEntry};

use super::{CycleBounds, ExitPolicy};
use crate::CheckOutcome;

/// Maximum number of offending entries listed by the line-number check.
const MAX_LISTED_OFFENDERS: usize = 5;

/// Check the process exit code. `None` when the policy accepts anything.
pub fn check_exit_code(policy: ExitPolicy, code: Option<i32>) -> Option<CheckOutcome> {
    let expected = policy.expected()?;
    let outcome = match code {
        Some(code) if code == expected => CheckOutcome::pass("exit code", format!("exit={code}")),
        Some(code) => CheckOutcome::fail(
            "exit code",
            format!("exit={code}, expected {expected}"),
        ),
        None => CheckOutcome::fail(
            "exit code",
            format!("terminated without exit code, expected {expected}"),
        ),
    };
    Some(outcome)
}

/// Check one register value. `name` may be any accepted register spelling.
pub fn check_register(registers: &RegisterSet, name: &str, expected: u64) -> CheckOutcome {
    let check = format!("register {name}");
    match registers.get(name) {
        None => {
            let available = registers.names();
            let detail = if available.is_empty() {
                "no registers in output".to_string()
            } else {
                format!("available registers: {}", available.join(", "))
            };
            CheckOutcome::fail(check, format!("register {name} not found")).with_detail(detail)
        }
        Some(actual) if actual == expected => {
            CheckOutcome::pass(check, format!("{name}={actual:#x}"))
        }
        Some(actual) => CheckOutcome::fail(
            check,
            format!("{name}: expected {expected:#x}, got {actual:#x}"),
        ),
    }
}

/// Check the cycle count against inclusive bounds.
///
/// A missing count only fails when `required`; with nothing to compare the
/// check does not apply and `None` is returned.
pub fn check_cycles(
    cycles: Option<u64>,
    bounds: Option<CycleBounds>,
    required: bool,
) -> Option<CheckOutcome> {
    match (cycles, bounds) {
        (Some(n), Some(b)) if b.contains(n) => Some(CheckOutcome::pass(
            "cycles",
            format!("{n} cycles within [{}, {}]", b.min, b.max),
        )),
        (Some(n), Some(b)) => Some(CheckOutcome::fail(
            "cycles",
            format!("cycles {n} outside [{}, {}]", b.min, b.max),
        )),
        (None, _) if required => Some(CheckOutcome::fail("cycles", "no cycle count in output")),
        _ => None,
    }
}

/// Check that a literal substring occurs in stdout.
pub fn check_marker(stdout: &str, marker: &str) -> CheckOutcome {
    if stdout.contains(marker) {
        CheckOutcome::pass("marker", format!("found {marker:?}"))
    } else {
        CheckOutcome::fail("marker", format!("marker {marker:?} not found in output"))
    }
}

/// Check that some traced filename ends with one of `patterns`.
pub fn check_file_presence(entries: &[TraceEntry], patterns: &[String]) -> CheckOutcome {
    let files: BTreeSet<&str> = entries.iter().filter_map(TraceEntry::file).collect();
    if files.is_empty() {
        return CheckOutcome::fail("file presence", "no source files found in trace");
    }

    let listed = files.iter().copied().collect::<Vec<_>>().join(", ");
    let found = files
        .iter()
        .any(|file| patterns.iter().any(|p| file.ends_with(p.as_str())));
    if found {
        CheckOutcome::pass("file presence", format!("source files: {listed}"))
    } else {
        CheckOutcome::fail(
            "file presence",
            format!("no file matching {} in trace", patterns.join(" or ")),
        )
        .with_detail(format!("files in trace: {listed}"))
    }
}

/// Check that every present line number is positive.
pub fn check_line_validity(entries: &[TraceEntry]) -> CheckOutcome {
    let offenders: Vec<String> = entries
        .iter()
        .filter_map(|e| e.location.as_ref())
        .filter(|loc| loc.line <= 0)
        .map(ToString::to_string)
        .collect();

    if offenders.is_empty() {
        return CheckOutcome::pass("line validity", "all line numbers positive");
    }

    let mut message = format!(
        "invalid line numbers: {}",
        offenders
            .iter()
            .take(MAX_LISTED_OFFENDERS)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    );
    if offenders.len() > MAX_LISTED_OFFENDERS {
        message.push_str(&format!(
            " (+{} more)",
            offenders.len() - MAX_LISTED_OFFENDERS
        ));
    }
    CheckOutcome::fail("line validity", message)
}

/// Check the fraction of trace entries carrying a source location.
///
/// Fails strictly below `threshold`. An empty trace always fails.
pub fn check_debuginfo_coverage(entries: &[TraceEntry], threshold: f64) -> CheckOutcome {
    let total = entries.len();
    if total == 0 {
        return CheckOutcome::fail("coverage", "no trace entries parsed");
    }

    let with_info = entries.iter().filter(|e| e.has_debug_info()).count();
    let coverage = with_info as f64 / total as f64;
    let summary = format!(
        "debug info coverage {:.1}% ({with_info}/{total} entries)",
        coverage * 100.0
    );
    if coverage < threshold {
        CheckOutcome::fail(
            "coverage",
            format!("{summary} below required {:.1}%", threshold * 100.0),
        )
    } else {
        CheckOutcome::pass("coverage", summary)
    }
}

/// Check that every entry has instruction text and, when located, a filename.
pub fn check_format(entries: &[TraceEntry]) -> CheckOutcome {
    for (index, entry) in entries.iter().enumerate() {
        if entry.instruction.trim().is_empty() {
            return CheckOutcome::fail(
                "format",
                format!("trace entry {index} ({}) has no instruction text", entry.stage),
            );
        }
        if entry.file().is_some_and(|f| f.trim().is_empty()) {
            return CheckOutcome::fail(
                "format",
                format!("trace entry {index} has an empty source filename"),
            );
        }
    }
    CheckOutcome::pass("format", format!("{} trace entries well-formed", entries.len()))
}
