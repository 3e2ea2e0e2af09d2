//! Debug-info suite command.

use std::path::Path;

use simcheck::orchestrator::select;
use simcheck::report::{self, ReportOptions};
use simcheck::suite::debuginfo;
use simcheck::{HarnessConfig, RunReport, SuiteError, ToolchainKind, process};

use crate::cli::EXIT_SUCCESS;
use crate::terminal;

/// Forced toolchain, or the one the build directory name suggests.
pub fn toolchain(build_dir: &Path, forced: Option<ToolchainKind>) -> ToolchainKind {
    forced.unwrap_or_else(|| ToolchainKind::detect(build_dir))
}

/// Print the registry.
pub fn list(build_dir: &Path) -> i32 {
    let cases = debuginfo::cases(build_dir);
    print!(
        "{}",
        report::render_list("Available debug info tests:", &cases)
    );
    EXIT_SUCCESS
}

/// Run the built-in debug-info checks against ELFs in `build_dir`.
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

    let cases = debuginfo::cases(build_dir);
    let count = select(&cases, filter)?.len();
    terminal::info(&format!("Using CLI: {}", config.simulator.display()));
    terminal::info(&format!("ELF dir: {}", build_dir.display()));
    if config.toolchain == ToolchainKind::Clang {
        terminal::warning("Clang-built ELFs: DWARF-dependent tests will be skipped");
    }
    let mode = format!("debug info, {}", config.toolchain);
    print!("{}", report::render_header(count, &mode));

    let run_report = super::execute(&cases, filter, config, opts, true)?;
    print!("{}", report::render_summary(&run_report, opts));
    Ok(run_report)
}
