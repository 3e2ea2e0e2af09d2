//! Run metrics through the `metrics` facade.
//!
//! The binary installs [`CliRecorder`] when `--metrics` is given and prints
//! what was collected after the run. Without a recorder every call here is
//! a no-op.

use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;

use metrics::{
    Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit, counter,
    describe_counter, describe_gauge, describe_histogram, gauge, histogram,
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use simcheck_verify::VerdictStatus;

use crate::orchestrator::RunReport;

// ============================================================================
// Metric descriptions
// ============================================================================

/// Register metric descriptions. Call once at startup.
pub fn init() {
    describe_counter!(
        "simcheck_verdicts_total",
        Unit::Count,
        "Case verdicts by status"
    );
    describe_counter!(
        "simcheck_simulator_runs_total",
        Unit::Count,
        "Simulator processes that ran to completion"
    );
    describe_histogram!(
        "simcheck_simulator_seconds",
        Unit::Seconds,
        "Simulator wall-clock time per case"
    );
    describe_gauge!("simcheck_run_passed", Unit::Count, "Passed cases in the last run");
    describe_gauge!(
        "simcheck_run_attempted",
        Unit::Count,
        "Non-skipped cases in the last run"
    );
    describe_gauge!(
        "simcheck_run_pass_ratio",
        Unit::Count,
        "Passed over attempted in the last run (0-1)"
    );
}

// ============================================================================
// Recording
// ============================================================================

/// Count one verdict.
pub fn record_verdict(case: &str, status: VerdictStatus) {
    tracing::trace!(case, status = status.as_str(), "recording verdict");
    counter!("simcheck_verdicts_total", "status" => status.as_str()).increment(1);
}

/// Record the wall time of one simulator process.
pub fn record_simulator_run(elapsed: Duration) {
    counter!("simcheck_simulator_runs_total").increment(1);
    histogram!("simcheck_simulator_seconds").record(elapsed.as_secs_f64());
}

/// Record the totals of a finished run.
#[allow(clippy::cast_precision_loss)]
pub fn record_run_summary(report: &RunReport) {
    let passed = report.passed();
    let attempted = report.attempted();
    gauge!("simcheck_run_passed").set(passed as f64);
    gauge!("simcheck_run_attempted").set(attempted as f64);
    if attempted > 0 {
        gauge!("simcheck_run_pass_ratio").set(passed as f64 / attempted as f64);
    }
}

// ============================================================================
// CLI recorder
// ============================================================================

#[derive(Default)]
struct Store {
    counters: RwLock<FxHashMap<String, u64>>,
    gauges: RwLock<FxHashMap<String, f64>>,
    histograms: RwLock<FxHashMap<String, Vec<f64>>>,
}

struct CliCounter {
    key: String,
    store: Arc<Store>,
}

impl metrics::CounterFn for CliCounter {
    fn increment(&self, value: u64) {
        *self.store.counters.write().entry(self.key.clone()).or_insert(0) += value;
    }

    fn absolute(&self, value: u64) {
        self.store.counters.write().insert(self.key.clone(), value);
    }
}

struct CliGauge {
    key: String,
    store: Arc<Store>,
}

impl metrics::GaugeFn for CliGauge {
    fn increment(&self, value: f64) {
        *self.store.gauges.write().entry(self.key.clone()).or_insert(0.0) += value;
    }

    fn decrement(&self, value: f64) {
        *self.store.gauges.write().entry(self.key.clone()).or_insert(0.0) -= value;
    }

    fn set(&self, value: f64) {
        self.store.gauges.write().insert(self.key.clone(), value);
    }
}

struct CliHistogram {
    key: String,
    store: Arc<Store>,
}

impl metrics::HistogramFn for CliHistogram {
    fn record(&self, value: f64) {
        self.store
            .histograms
            .write()
            .entry(self.key.clone())
            .or_default()
            .push(value);
    }
}

/// In-memory recorder for terminal output.
#[derive(Default)]
pub struct CliRecorder {
    store: Arc<Store>,
}

impl CliRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install as the global recorder. `None` if one is already set.
    pub fn install(self) -> Option<CliRecorderHandle> {
        let store = Arc::clone(&self.store);
        metrics::set_global_recorder(self).ok()?;
        Some(CliRecorderHandle { store })
    }
}

fn key_to_string(key: &Key) -> String {
    let labels: Vec<String> = key
        .labels()
        .map(|l| format!("{}={}", l.key(), l.value()))
        .collect();
    if labels.is_empty() {
        key.name().to_string()
    } else {
        format!("{}{{{}}}", key.name(), labels.join(","))
    }
}

impl Recorder for CliRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(CliCounter {
            key: key_to_string(key),
            store: Arc::clone(&self.store),
        }))
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::from_arc(Arc::new(CliGauge {
            key: key_to_string(key),
            store: Arc::clone(&self.store),
        }))
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::from_arc(Arc::new(CliHistogram {
            key: key_to_string(key),
            store: Arc::clone(&self.store),
        }))
    }
}

/// Read access to what an installed [`CliRecorder`] collected.
pub struct CliRecorderHandle {
    store: Arc<Store>,
}

impl CliRecorderHandle {
    pub fn get_counter(&self, key: &str) -> Option<u64> {
        self.store.counters.read().get(key).copied()
    }

    pub fn get_gauge(&self, key: &str) -> Option<f64> {
        self.store.gauges.read().get(key).copied()
    }

    /// Collected metrics as Markdown-ish text.
    #[allow(clippy::cast_precision_loss)]
    pub fn render_summary(&self) -> String {
        let counters = self.store.counters.read();
        let gauges = self.store.gauges.read();
        let histograms = self.store.histograms.read();

        if counters.is_empty() && gauges.is_empty() && histograms.is_empty() {
            return "No metrics collected.\n".to_string();
        }

        let mut out = String::from("\n## Metrics Summary\n\n");
        if !counters.is_empty() {
            out.push_str("### Counters\n");
            for (key, value) in sorted(&counters) {
                let _ = writeln!(out, "  {key}: {value}");
            }
            out.push('\n');
        }
        if !gauges.is_empty() {
            out.push_str("### Gauges\n");
            for (key, value) in sorted(&gauges) {
                let _ = writeln!(out, "  {key}: {value:.6}");
            }
            out.push('\n');
        }
        if !histograms.is_empty() {
            out.push_str("### Histograms\n");
            for (key, values) in sorted(&histograms) {
                if values.is_empty() {
                    continue;
                }
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let avg = values.iter().sum::<f64>() / values.len() as f64;
                let _ = writeln!(
                    out,
                    "  {key}: count={}, min={min:.6}, max={max:.6}, avg={avg:.6}",
                    values.len()
                );
            }
            out.push('\n');
        }
        out
    }

    pub fn print_summary(&self) {
        print!("{}", self.render_summary());
    }
}

fn sorted<V>(map: &FxHashMap<String, V>) -> Vec<(&String, &V)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}
