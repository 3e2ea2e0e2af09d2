#![cfg(unix)]

use std::time::Duration;

use simcheck::suite::{debuginfo, SkipCondition};
use simcheck::{
    ExitPolicy, Expectation, HarnessConfig, Protocol, SuiteError, TestCase, ToolchainKind,
    VerdictStatus, run_case, run_suite,
};

mod common;

use common::Sandbox;

fn config(sandbox: &Sandbox, stdout: &str, code: i32) -> HarnessConfig {
    HarnessConfig::default().with_simulator(sandbox.simulator(stdout, code))
}

#[test]
fn test_sentinel_verdicts() {
    let cases = [
        ("R10:0x00000000 R11:0x0600d000", VerdictStatus::Pass),
        ("R11:0x0bad0000", VerdictStatus::Fail),
        ("R11:0x12345678", VerdictStatus::Error),
        ("Machine stopped on BREAK exception.", VerdictStatus::Error),
    ];
    for (stdout, expected) in cases {
        let sandbox = Sandbox::new();
        let config = config(&sandbox, stdout, 0);
        let case = TestCase::sentinel("rv32ui-p-add", sandbox.elf("rv32ui-p-add"));
        let result = run_case(&case, &config);
        assert_eq!(result.verdict.status, expected, "{stdout}: {}", result.verdict.message);
    }
}

#[test]
fn test_sentinel_ignores_exit_code() {
    let sandbox = Sandbox::new();
    let config = config(&sandbox, "R11:0x600d", 1);
    let case = TestCase::sentinel("t", sandbox.elf("t.elf"));
    assert!(run_case(&case, &config).verdict.is_pass());
}

#[test]
fn test_property_missing_register() {
    let sandbox = Sandbox::new();
    let config = config(&sandbox, "cycles: 120\nFetch: addi a0,a0,1 [fact.c:12]\nR10:0x18", 0);
    let expectation = Expectation::new()
        .with_cycles(50, 500)
        .with_register("a0", 24)
        .with_register("t0", 24);
    let case = TestCase::new("fact_ok", sandbox.elf("fact_ok.elf"), Protocol::Property(expectation));

    let result = run_case(&case, &config);
    assert_eq!(result.verdict.status, VerdictStatus::Fail);
    assert!(result.verdict.message.contains("t0"));
    let cycles = result
        .verdict
        .checks
        .iter()
        .find(|c| c.name == "cycles")
        .unwrap();
    assert!(cycles.passed);
    assert!(result.output.is_some());
}

#[test]
fn test_exit_code_policy() {
    let sandbox = Sandbox::new();
    let config = config(&sandbox, "R10:0x0", 2);
    let expectation = Expectation::new()
        .with_exit(ExitPolicy::RequireZero)
        .with_register("a0", 0);
    let case = TestCase::new("prog", sandbox.elf("prog.elf"), Protocol::Property(expectation));

    let result = run_case(&case, &config);
    assert_eq!(result.verdict.status, VerdictStatus::Fail);
    assert!(result.verdict.message.contains("exit=2, expected 0"));
}

#[test]
fn test_clang_skip_does_not_run() {
    let sandbox = Sandbox::new();
    let marker = sandbox.path().join("ran");
    let sim = sandbox.script("sim", &format!("touch {}", marker.display()));
    let config = HarnessConfig::default()
        .with_simulator(sim)
        .with_toolchain(ToolchainKind::Clang);

    let cases = debuginfo::cases(sandbox.path());
    let report = run_suite(&cases, Some("fact_ok"), &config).unwrap();
    assert_eq!(report.total(), 1);
    assert_eq!(report.results[0].verdict.status, VerdictStatus::Skipped);
    assert!(report.all_passed());
    assert!(!marker.exists());
}

#[test]
fn test_skip_if_missing() {
    let sandbox = Sandbox::new();
    let config = config(&sandbox, "", 0);
    let case = TestCase::sentinel("t", sandbox.path().join("absent.elf"))
        .with_skip(SkipCondition::IfMissing);
    assert!(run_case(&case, &config).verdict.is_skipped());
}

#[test]
fn test_missing_input_is_error() {
    let sandbox = Sandbox::new();
    let config = config(&sandbox, "R11:0x600d", 0);
    let case = TestCase::sentinel("t", sandbox.path().join("absent.elf"));
    let result = run_case(&case, &config);
    assert_eq!(result.verdict.status, VerdictStatus::Error);
    assert!(result.verdict.message.starts_with("input not found"));
}

#[test]
fn test_timeout_is_error() {
    let sandbox = Sandbox::new();
    let sim = sandbox.script("sim", "exec sleep 30");
    let config = HarnessConfig::default()
        .with_simulator(sim)
        .with_timeout(Duration::from_millis(200));
    let case = TestCase::sentinel("loop", sandbox.elf("loop.elf"));

    let result = run_case(&case, &config);
    assert_eq!(result.verdict.status, VerdictStatus::Error);
    assert!(result.verdict.message.contains("timeout"));
    assert!(result.verdict.checks.is_empty());
    assert!(result.output.is_none());
}

#[test]
fn test_empty_selection() {
    let sandbox = Sandbox::new();
    let config = config(&sandbox, "", 0);
    let cases = vec![TestCase::sentinel("rv32ui-p-add", sandbox.elf("a"))];

    assert!(matches!(
        run_suite(&cases, Some("rv64"), &config),
        Err(SuiteError::NoMatch(f)) if f == "rv64"
    ));
    assert!(matches!(run_suite(&[], None, &config), Err(SuiteError::NoTests)));
}

#[test]
fn test_parallel_keeps_declaration_order() {
    let sandbox = Sandbox::new();
    let sim = sandbox.script(
        "sim",
        "case \"$(basename \"$1\")\" in\n  *slow*) sleep 0.3 ;;\nesac\necho 'R11:0x600d'",
    );
    let config = HarnessConfig::default().with_simulator(sim).with_jobs(4);

    let names = ["slow_a", "fast_b", "slow_c", "fast_d", "fast_e", "slow_f"];
    let cases: Vec<_> = names
        .iter()
        .map(|n| TestCase::sentinel(*n, sandbox.elf(n)))
        .collect();

    let report = run_suite(&cases, None, &config).unwrap();
    let order: Vec<_> = report.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(order, names);
    assert_eq!(report.passed(), names.len());
}
