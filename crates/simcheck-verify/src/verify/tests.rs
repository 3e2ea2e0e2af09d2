use super::*;
use crate::VerdictStatus;
use simcheck_output::{SourceLocation, Stage, TraceEntry, parse_trace};

fn entry(file: Option<(&str, i64)>) -> TraceEntry {
    TraceEntry {
        stage: Stage::Fetch,
        instruction: "nop".to_string(),
        location: file.map(|(file, line)| SourceLocation {
            file: file.to_string(),
            line,
        }),
    }
}

fn names(verification: &Verification) -> Vec<&str> {
    verification.checks.iter().map(|c| c.name.as_str()).collect()
}

// ============================================================================
// verify()
// ============================================================================

#[test]
fn test_missing_register_fails_with_cycles_in_bounds() {
    let output = SimOutput::parse("cycles: 120\nFetch: addi a0,a0,1 [fact.c:12]\n")
        .with_exit_code(Some(0));
    let expectation = Expectation::new()
        .with_exit(ExitPolicy::RequireZero)
        .with_register("t0", 24)
        .with_cycles(50, 500);

    let verification = verify(&output, &expectation);
    assert!(!verification.passed);

    let failures: Vec<_> = verification.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].name, "register t0");
    assert!(failures[0].message.contains("t0"));

    let cycles = verification.checks.iter().find(|c| c.name == "cycles").unwrap();
    assert!(cycles.passed);

    let verdict = verification.into_verdict(output.cycles);
    assert_eq!(verdict.status, VerdictStatus::Fail);
    assert!(verdict.message.contains("register t0 not found"));
}

#[test]
fn test_all_checks_pass() {
    let output = SimOutput::parse("R5:0x00000018 R10:0x00000018\ncycles: 80\nHello world\n")
        .with_exit_code(Some(0));
    let expectation = Expectation::new()
        .with_exit(ExitPolicy::RequireZero)
        .with_register("t0", 24)
        .with_register("x10", 24)
        .with_cycles(50, 500)
        .with_marker("Hello");

    let verification = verify(&output, &expectation);
    assert!(verification.passed);
    assert_eq!(
        names(&verification),
        vec!["exit code", "register t0", "register x10", "cycles", "marker"]
    );

    let verdict = verification.into_verdict(output.cycles);
    assert!(verdict.is_pass());
    assert_eq!(verdict.message, "80 cycles");
}

#[test]
fn test_register_mismatch_message() {
    let output = SimOutput::parse("R10:0x00000007");
    let verification = verify(&output, &Expectation::new().with_register("a0", 8));
    let failure = verification.failures().next().unwrap();
    assert_eq!(failure.message, "a0: expected 0x8, got 0x7");
}

#[test]
fn test_exit_code_mismatch_stops_other_checks() {
    let output = SimOutput::parse("R10:0x00000007 cycles: 9999").with_exit_code(Some(1));
    let expectation = Expectation::new()
        .with_exit(ExitPolicy::RequireZero)
        .with_register("a0", 8)
        .with_cycles(1, 10);

    let verification = verify(&output, &expectation);
    assert!(!verification.passed);
    assert_eq!(names(&verification), vec!["exit code"]);
    assert_eq!(verification.checks[0].message, "exit=1, expected 0");
}

#[test]
fn test_exit_policy_any_ignores_code() {
    let output = SimOutput::parse("R10:0x00000008").with_exit_code(Some(3));
    let verification = verify(&output, &Expectation::new().with_register("a0", 8));
    assert!(verification.passed);
    assert_eq!(names(&verification), vec!["register a0"]);
}

#[test]
fn test_exit_policy_expect() {
    let output = SimOutput::parse("").with_exit_code(Some(3));
    let expectation = Expectation::new().with_exit(ExitPolicy::Expect(3));
    assert!(verify(&output, &expectation).passed);

    let killed = SimOutput::parse("").with_exit_code(None);
    assert!(!verify(&killed, &expectation).passed);
}

#[test]
fn test_missing_cycles_only_fails_when_required() {
    let output = SimOutput::parse("R10:0x00000001");
    let lenient = Expectation::new().with_cycles(1, 10);
    let verification = verify(&output, &lenient);
    assert!(verification.passed);
    assert!(verification.checks.is_empty());

    let strict = lenient.with_cycles_required(true);
    let verification = verify(&output, &strict);
    assert!(!verification.passed);
    assert_eq!(verification.checks[0].message, "no cycle count in output");
}

#[test]
fn test_cycles_out_of_bounds() {
    let output = SimOutput::parse("cycles: 501");
    let verification = verify(&output, &Expectation::new().with_cycles(50, 500));
    assert!(!verification.passed);
    assert_eq!(verification.checks[0].message, "cycles 501 outside [50, 500]");

    let edge = SimOutput::parse("cycles: 500");
    assert!(verify(&edge, &Expectation::new().with_cycles(50, 500)).passed);
}

#[test]
fn test_debuginfo_expectation() {
    let stdout = "\
Fetch: addi sp,sp,-16 [fact.S:3]
Fetch: sw ra,12(sp) [fact.S:4]
Fetch: ecall
";
    let output = SimOutput::parse(stdout).with_exit_code(Some(1));
    let expectation = Expectation::new()
        .with_source_files([".S"])
        .with_min_coverage(0.5)
        .with_trace_checks(true);

    let verification = verify(&output, &expectation);
    assert!(verification.passed, "{:?}", verification.checks);
    assert_eq!(
        names(&verification),
        vec!["format", "file presence", "line validity", "coverage"]
    );
}

#[test]
fn test_empty_trace_reports_no_entries() {
    let output = SimOutput::parse("cycles: 10\n");
    let expectation = Expectation::new()
        .with_source_files([".c"])
        .with_min_coverage(0.5)
        .with_trace_checks(true);

    let verification = verify(&output, &expectation);
    assert!(!verification.passed);
    let messages: Vec<_> = verification.failures().map(|c| c.message.as_str()).collect();
    assert!(messages.contains(&"no trace entries parsed"));
    assert!(messages.contains(&"no source files found in trace"));
}

#[test]
fn test_format_violation_stops_trace_checks() {
    let mut bad = entry(Some(("a.c", 0)));
    bad.instruction = "   ".to_string();
    let output = SimOutput {
        trace: vec![entry(Some(("a.c", 1))), bad],
        ..SimOutput::default()
    };
    let expectation = Expectation::new()
        .with_register("a0", 1)
        .with_min_coverage(0.1)
        .with_trace_checks(true);

    let verification = verify(&output, &expectation);
    assert!(!verification.passed);
    assert_eq!(names(&verification), vec!["register a0", "format"]);
}

// ============================================================================
// Individual checks
// ============================================================================

#[test]
fn test_check_register_detail_lists_available() {
    let regs = simcheck_output::RegisterSet::parse("R1:0x1 PC:0x2");
    let outcome = check_register(&regs, "a0", 1);
    assert!(!outcome.passed);
    assert_eq!(outcome.detail.as_deref(), Some("available registers: PC, R1"));
}

#[test]
fn test_check_line_validity() {
    let ok = [entry(Some(("a.c", 1))), entry(None), entry(Some(("b.c", 99)))];
    assert!(check_line_validity(&ok).passed);

    let bad = [entry(Some(("a.c", 1))), entry(Some(("b.c", 0)))];
    let outcome = check_line_validity(&bad);
    assert!(!outcome.passed);
    assert_eq!(outcome.message, "invalid line numbers: b.c:0");
}

#[test]
fn test_check_line_validity_caps_listing() {
    let entries: Vec<_> = (0..8).map(|i| entry(Some(("x.S", -i)))).collect();
    let outcome = check_line_validity(&entries);
    assert!(!outcome.passed);
    assert!(outcome.message.ends_with("(+3 more)"));
    assert_eq!(outcome.message.matches("x.S:").count(), 5);
}

#[test]
fn test_check_line_validity_iff_non_positive() {
    for line in -2..=2 {
        let outcome = check_line_validity(&[entry(Some(("f.c", line)))]);
        assert_eq!(outcome.passed, line > 0, "line {line}");
    }
}

#[test]
fn test_check_file_presence() {
    let entries = [entry(Some(("src/sort.c", 3))), entry(Some(("crt0.S", 1)))];
    let patterns = vec![".c".to_string(), ".S".to_string()];
    assert!(check_file_presence(&entries, &patterns).passed);

    let cpp_only = vec![".cpp".to_string()];
    let outcome = check_file_presence(&entries, &cpp_only);
    assert!(!outcome.passed);
    assert_eq!(outcome.detail.as_deref(), Some("files in trace: crt0.S, src/sort.c"));
}

#[test]
fn test_check_coverage_threshold() {
    let entries = [
        entry(Some(("a.c", 1))),
        entry(None),
        entry(Some(("a.c", 2))),
        entry(None),
    ];
    assert!(check_debuginfo_coverage(&entries, 0.5).passed);
    let outcome = check_debuginfo_coverage(&entries, 0.8);
    assert!(!outcome.passed);
    assert!(outcome.message.contains("50.0%"));
    assert!(outcome.message.contains("(2/4 entries)"));
    assert!(outcome.message.contains("80.0%"));
}

#[test]
fn test_check_coverage_monotonic_in_threshold() {
    let entries = parse_trace(
        "Fetch: a [x.c:1]\nFetch: b\nFetch: c [x.c:2]\nFetch: d [x.c:3]\nFetch: e\n",
    );
    let mut failed_before = false;
    for step in 0..=20 {
        let threshold = f64::from(step) / 20.0;
        let failed = !check_debuginfo_coverage(&entries, threshold).passed;
        assert!(!failed_before || failed, "passed at {threshold} after failing lower");
        failed_before = failed;
    }
    assert!(failed_before);
}

#[test]
fn test_check_format() {
    let entries = parse_trace("Fetch: nop [a.c:1]\nDecode: add a0,a0,a1\n");
    let outcome = check_format(&entries);
    assert!(outcome.passed);
    assert_eq!(outcome.message, "2 trace entries well-formed");

    let mut nameless = entry(Some(("a.c", 1)));
    nameless.location = Some(SourceLocation {
        file: String::new(),
        line: 1,
    });
    assert!(!check_format(&[nameless]).passed);
}

#[test]
fn test_check_marker() {
    assert!(check_marker("Hello, world!\n", "Hello").passed);
    let outcome = check_marker("", "Hello");
    assert!(!outcome.passed);
    assert_eq!(outcome.message, "marker \"Hello\" not found in output");
}
