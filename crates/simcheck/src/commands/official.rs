//! Official conformance suite command.

use std::path::Path;
use std::time::Duration;

use simcheck::report::{self, ReportOptions};
use simcheck::suite::official::{self, SelftestReport, Selection};
use simcheck::{HarnessConfig, ModeFlags, RunReport, SuiteError, TestCase, process};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::terminal;

/// Resolved options of `simcheck official`.
pub struct OfficialArgs<'a> {
    pub simulator: &'a Path,
    pub suite: &'a Path,
    pub selection: Selection,
    pub external: Option<&'a Path>,
    pub mode: ModeFlags,
    pub filter: Option<&'a str>,
    pub jobs: usize,
    pub timeout: u64,
    pub rebuild: bool,
    pub selftest: Option<&'a Path>,
    pub clean: bool,
    pub make: &'a Path,
    pub opts: ReportOptions,
}

pub fn cmd_official(args: &OfficialArgs<'_>) -> i32 {
    if args.clean {
        return match official::clean(args.suite, args.make) {
            Ok(()) => {
                terminal::success("Removed built conformance binaries");
                EXIT_SUCCESS
            }
            Err(e) => super::fail(e),
        };
    }

    let config = HarnessConfig::default()
        .with_simulator(args.simulator)
        .with_timeout(Duration::from_secs(args.timeout))
        .with_mode(args.mode.clone())
        .with_jobs(args.jobs)
        .with_make(args.make);
    if let Err(e) = process::check_executable(&config.simulator) {
        return super::fail(e);
    }

    let result = match args.selftest {
        Some(dir) => run_selftest(dir, &config, args),
        None => run_official(&config, args),
    };
    match result {
        Ok(true) => EXIT_SUCCESS,
        Ok(false) => EXIT_FAILURE,
        Err(e) => super::fail(e),
    }
}

fn run_official(config: &HarnessConfig, args: &OfficialArgs<'_>) -> simcheck::Result<bool> {
    let files = official::discover(args.suite, args.rebuild, args.make)?;
    terminal::info(&format!(
        "{} conformance binaries, {} mode",
        files.len(),
        config.mode.describe()
    ));

    let mut overall = RunReport::default();
    for category in args.selection.categories() {
        print!("{}", report::render_category(category));
        for width in args.selection.widths() {
            let cases = official::cases(&official::group(&files, category, width));
            let Some(group) = run_group(&cases, args.filter, config, &args.opts)? else {
                continue;
            };
            print!("{}", report::render_width(width));
            print!("{}", report::render_group(&group, &args.opts));
            overall.results.extend(group.results);
        }
    }

    if let Some(dir) = args.external {
        if !dir.is_dir() {
            return Err(SuiteError::MissingDirectory(dir.to_path_buf()));
        }
        let cases = official::cases(&official::list_binaries(dir)?);
        if let Some(group) = run_group(&cases, args.filter, config, &args.opts)? {
            print!("{}", report::render_section("External tests"));
            print!("{}", report::render_group(&group, &args.opts));
            overall.results.extend(group.results);
        }
    }

    if overall.total() == 0 {
        return Err(args
            .filter
            .map_or(SuiteError::NoTests, |f| SuiteError::NoMatch(f.to_string())));
    }
    print!("{}", report::render_summary(&overall, &args.opts));
    Ok(overall.all_passed())
}

/// Run one group, or `None` when the filter leaves nothing in it.
fn run_group(
    cases: &[TestCase],
    filter: Option<&str>,
    config: &HarnessConfig,
    opts: &ReportOptions,
) -> simcheck::Result<Option<RunReport>> {
    if !cases.iter().any(|c| filter.is_none_or(|f| c.matches(f))) {
        return Ok(None);
    }
    super::execute(cases, filter, config, opts, false).map(Some)
}

fn run_selftest(dir: &Path, config: &HarnessConfig, args: &OfficialArgs<'_>) -> simcheck::Result<bool> {
    if !dir.is_dir() {
        return Err(SuiteError::MissingDirectory(dir.to_path_buf()));
    }
    let cases = official::cases(&official::list_binaries(dir)?);

    print!("{}", report::render_section("Self-test"));
    let run_report = super::execute(&cases, args.filter, config, &args.opts, false)?;
    print!("{}", report::render_group(&run_report, &args.opts));

    let selftest = SelftestReport::from_report(&run_report);
    print!("{}", report::render_selftest(&selftest));
    if selftest.is_clean() {
        terminal::success("Classifier agrees with every self-test");
    }
    Ok(selftest.is_clean())
}
