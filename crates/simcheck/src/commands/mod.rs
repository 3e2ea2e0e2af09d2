//! Command implementations.
//!
//! Each submodule handles one suite; shared run and print plumbing lives
//! here.

mod all;
mod debuginfo;
mod functional;
mod official;

use std::fmt::Display;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use console::Term;
use simcheck::report::{self, DumpPolicy, ReportOptions};
use simcheck::{HarnessConfig, ModeFlags, RunReport, TestCase, run_suite_with};

use crate::cli::{Cli, Commands, EXIT_FAILURE, EXIT_SUCCESS};
use crate::terminal::{self, Spinner};

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Official { .. } => handle_official(cli),
        Commands::Functional { .. } => handle_functional(cli),
        Commands::Debuginfo { .. } => handle_debuginfo(cli),
        Commands::All { .. } => handle_all(cli),
    }
}

fn handle_official(cli: &Cli) -> i32 {
    let Commands::Official {
        simulator,
        suite,
        no_32,
        no_64,
        external,
        multiply,
        atomic,
        csr,
        mode,
        run,
        no_dump,
        d_regs,
        rebuild,
        selftest,
        clean,
        make,
    } = &cli.command
    else {
        unreachable!("official command variant mismatch");
    };

    let dump = if *d_regs {
        DumpPolicy::Always
    } else if *no_dump {
        DumpPolicy::Never
    } else {
        DumpPolicy::OnFailure
    };
    let opts = report_options(cli, run.no_pass && !*d_regs, dump);

    official::cmd_official(&official::OfficialArgs {
        simulator,
        suite,
        selection: simcheck::suite::official::Selection {
            multiply: *multiply,
            atomic: *atomic,
            csr: *csr,
            rv32: !*no_32,
            rv64: !*no_64,
        },
        external: external.as_deref(),
        mode: mode.flags(simcheck::suite::official::mode),
        filter: run.filter.as_deref(),
        jobs: run.jobs,
        timeout: run.timeout,
        rebuild: *rebuild,
        selftest: selftest.as_deref(),
        clean: *clean,
        make,
        opts,
    })
}

fn handle_functional(cli: &Cli) -> i32 {
    let Commands::Functional {
        sim,
        mode,
        run,
        show_output,
    } = &cli.command
    else {
        unreachable!("functional command variant mismatch");
    };

    let opts = report_options(cli, run.no_pass, stud_dump(cli, *show_output));
    let config = harness(
        &sim.simulator,
        run.jobs,
        run.timeout,
        mode.flags(simcheck::suite::functional::mode),
    );
    exit_code(functional::run(&sim.build_dir, run.filter.as_deref(), &config, &opts))
}

fn handle_debuginfo(cli: &Cli) -> i32 {
    let Commands::Debuginfo {
        sim,
        run,
        show_output,
        list,
        toolchain,
    } = &cli.command
    else {
        unreachable!("debuginfo command variant mismatch");
    };

    if *list {
        return debuginfo::list(&sim.build_dir);
    }

    let opts = report_options(cli, run.no_pass, stud_dump(cli, *show_output));
    let config = harness(&sim.simulator, run.jobs, run.timeout, ModeFlags::new())
        .with_toolchain(debuginfo::toolchain(&sim.build_dir, toolchain.map(Into::into)));
    exit_code(debuginfo::run(&sim.build_dir, run.filter.as_deref(), &config, &opts))
}

fn handle_all(cli: &Cli) -> i32 {
    let Commands::All {
        sim,
        mode,
        jobs,
        timeout,
        no_pass,
        toolchain,
    } = &cli.command
    else {
        unreachable!("all command variant mismatch");
    };

    let opts = report_options(cli, *no_pass, stud_dump(cli, false));
    let config = harness(&sim.simulator, *jobs, *timeout, ModeFlags::new())
        .with_toolchain(debuginfo::toolchain(&sim.build_dir, toolchain.map(Into::into)));
    all::cmd_all(
        &sim.build_dir,
        &config,
        mode.flags(simcheck::suite::functional::mode),
        &opts,
    )
}

// ============================================================================
// Shared helpers
// ============================================================================

fn report_options(cli: &Cli, no_pass: bool, dump: DumpPolicy) -> ReportOptions {
    ReportOptions::new()
        .with_plain(cli.plain)
        .with_verbose(cli.verbose)
        .with_no_pass(no_pass)
        .with_dump(dump)
}

/// Output dumping for the property suites.
const fn stud_dump(cli: &Cli, show_output: bool) -> DumpPolicy {
    if show_output {
        DumpPolicy::Always
    } else if cli.verbose {
        DumpPolicy::OnFailure
    } else {
        DumpPolicy::Never
    }
}

fn harness(simulator: &Path, jobs: usize, timeout_secs: u64, mode: ModeFlags) -> HarnessConfig {
    HarnessConfig::default()
        .with_simulator(simulator)
        .with_jobs(jobs)
        .with_timeout(Duration::from_secs(timeout_secs))
        .with_mode(mode)
}

/// Run `cases` and return the report.
///
/// With `stream` set, result lines are printed as cases finish (sequential
/// runs) or in declaration order once the batch is done (parallel runs).
fn execute(
    cases: &[TestCase],
    filter: Option<&str>,
    config: &HarnessConfig,
    opts: &ReportOptions,
    stream: bool,
) -> simcheck::Result<RunReport> {
    let total = simcheck::orchestrator::select(cases, filter)?.len();
    let sequential = config.jobs <= 1;
    let spinner = Spinner::new(
        format!("Running {total} tests"),
        !opts.plain && Term::stderr().is_term(),
    );
    let done = AtomicUsize::new(0);

    let run_report = run_suite_with(cases, filter, config, |result| {
        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
        spinner.set_message(format!("[{n}/{total}] {}", result.name));
        if stream && sequential {
            spinner.suspend(|| print!("{}", report::render_result(result, opts)));
        }
    })?;
    spinner.finish_and_clear();

    if stream && !sequential {
        for result in &run_report.results {
            print!("{}", report::render_result(result, opts));
        }
    }
    Ok(run_report)
}

fn fail(err: impl Display) -> i32 {
    terminal::error(&err.to_string());
    EXIT_FAILURE
}

fn exit_code(result: simcheck::Result<RunReport>) -> i32 {
    match result {
        Ok(report) if report.all_passed() => EXIT_SUCCESS,
        Ok(_) => EXIT_FAILURE,
        Err(e) => fail(e),
    }
}
