//! Runs declared test cases and aggregates their verdicts.

use rayon::prelude::*;
use simcheck_verify::{Verdict, VerdictStatus, verify};
use tracing::{debug, debug_span};

use crate::config::HarnessConfig;
use crate::error::{Result, SuiteError};
use crate::process::{self, ProcessOutput};
use crate::suite::{Protocol, TestCase};

/// Verdict of one case, with the captured simulator output if it ran.
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub name: String,
    pub verdict: Verdict,
    pub output: Option<ProcessOutput>,
}

/// Aggregated results of one suite run, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub results: Vec<CaseResult>,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.count(VerdictStatus::Pass)
    }

    pub fn skipped(&self) -> usize {
        self.count(VerdictStatus::Skipped)
    }

    /// Cases that actually ran.
    pub fn attempted(&self) -> usize {
        self.total() - self.skipped()
    }

    fn count(&self, status: VerdictStatus) -> usize {
        self.results
            .iter()
            .filter(|r| r.verdict.status == status)
            .count()
    }

    /// Cases that ran and did not pass (FAIL and ERROR).
    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.results
            .iter()
            .filter(|r| !r.verdict.is_pass() && !r.verdict.is_skipped())
    }

    /// Whether every non-skipped case passed.
    pub fn all_passed(&self) -> bool {
        self.passed() == self.attempted()
    }

    /// Record summary totals to metrics.
    pub fn record_metrics(&self) {
        crate::metrics::record_run_summary(self);
    }
}

/// Apply a substring filter. An empty selection is an error.
pub fn select<'a>(cases: &'a [TestCase], filter: Option<&str>) -> Result<Vec<&'a TestCase>> {
    let selected: Vec<&TestCase> = cases
        .iter()
        .filter(|case| filter.is_none_or(|f| case.matches(f)))
        .collect();
    if selected.is_empty() {
        return Err(filter.map_or(SuiteError::NoTests, |f| SuiteError::NoMatch(f.to_string())));
    }
    Ok(selected)
}

/// Run one case: skip checks, simulator invocation, verdict.
pub fn run_case(case: &TestCase, config: &HarnessConfig) -> CaseResult {
    let _span = debug_span!("case", name = %case.name).entered();

    let (verdict, output) = if let Some(reason) = case.skip_reason(config) {
        debug!(%reason, "skipping");
        (Verdict::skipped(reason), None)
    } else if !case.input.exists() {
        (
            Verdict::error(format!("input not found: {}", case.input.display())),
            None,
        )
    } else {
        let flags = case.flags.merged(&config.mode);
        match process::run(&config.simulator, &case.input, &flags, config.timeout) {
            Ok(output) => {
                crate::metrics::record_simulator_run(output.elapsed);
                (judge(&case.protocol, &output), Some(output))
            }
            Err(e) => (Verdict::error(e.to_string()), None),
        }
    };

    debug!(status = %verdict.status, message = %verdict.message, "finished");
    crate::metrics::record_verdict(&case.name, verdict.status);
    CaseResult {
        name: case.name.clone(),
        verdict,
        output,
    }
}

fn judge(protocol: &Protocol, output: &ProcessOutput) -> Verdict {
    let parsed = output.parse();
    match protocol {
        Protocol::Sentinel(sentinel) => sentinel.classify(&parsed.registers),
        Protocol::Property(expectation) => {
            verify(&parsed, expectation).into_verdict(parsed.cycles)
        }
    }
}

/// Run the selected cases and aggregate a report.
pub fn run_suite(
    cases: &[TestCase],
    filter: Option<&str>,
    config: &HarnessConfig,
) -> Result<RunReport> {
    run_suite_with(cases, filter, config, |_| {})
}

/// Like [`run_suite`], calling `on_result` as each case finishes.
///
/// With `config.jobs > 1` cases run on a dedicated pool and `on_result`
/// sees them in completion order; the report is always in declaration
/// order.
pub fn run_suite_with<F>(
    cases: &[TestCase],
    filter: Option<&str>,
    config: &HarnessConfig,
    on_result: F,
) -> Result<RunReport>
where
    F: Fn(&CaseResult) + Sync,
{
    let selected = select(cases, filter)?;
    let run = |case: &&TestCase| {
        let result = run_case(case, config);
        on_result(&result);
        result
    };

    let results: Vec<CaseResult> = if config.jobs > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.jobs)
            .build()?;
        pool.install(|| selected.par_iter().map(run).collect())
    } else {
        selected.iter().map(run).collect()
    };

    let report = RunReport { results };
    report.record_metrics();
    Ok(report)
}
