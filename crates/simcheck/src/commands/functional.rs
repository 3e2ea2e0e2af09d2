//! Functional suite command.

use std::path::Path;

use simcheck::orchestrator::select;
use simcheck::report::{self, ReportOptions};
use simcheck::suite::functional;
use simcheck::{HarnessConfig, RunReport, SuiteError, process};

use crate::terminal;

/// Run the built-in functional programs from `build_dir`.
pub fn run(
    build_dir: &Path,
    filter: Option<&str>,
    config: &HarnessConfig,
    opts: &ReportOptions,
) -> simcheck::Result<RunReport> {
    process::check_executable(&config.simulator)?;
    if !build_dir.is_dir() {
        return Err(SuiteError::MissingDirectory(build_dir.to_path_buf()));
    }

    let cases = functional::cases(build_dir);
    let count = select(&cases, filter)?.len();
    terminal::info(&format!("Using CLI: {}", config.simulator.display()));
    terminal::info(&format!("ELF dir: {}", build_dir.display()));
    print!("{}", report::render_header(count, config.mode.describe()));

    let run_report = super::execute(&cases, filter, config, opts, true)?;
    print!("{}", report::render_summary(&run_report, opts));
    Ok(run_report)
}
