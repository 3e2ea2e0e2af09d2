//! Functional and debug-info suites in one go.

use std::path::Path;

use simcheck::report::{self, RULE_WIDTH, ReportOptions};
use simcheck::{HarnessConfig, ModeFlags, RunReport};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::terminal;

pub fn cmd_all(
    build_dir: &Path,
    config: &HarnessConfig,
    mode: ModeFlags,
    opts: &ReportOptions,
) -> i32 {
    let functional_config = config.clone().with_mode(mode);
    let functional_ok = passed(super::functional::run(
        build_dir,
        None,
        &functional_config,
        opts,
    ));
    println!();
    let debuginfo_ok = passed(super::debuginfo::run(build_dir, None, config, opts));

    println!("\n{}", "=".repeat(RULE_WIDTH));
    print!(
        "{}",
        report::render_suite_status("Functional tests", functional_ok, opts)
    );
    print!(
        "{}",
        report::render_suite_status("Debug info tests", debuginfo_ok, opts)
    );
    println!("{}", "=".repeat(RULE_WIDTH));

    if functional_ok && debuginfo_ok {
        terminal::success("All tests passed!");
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    }
}

fn passed(result: simcheck::Result<RunReport>) -> bool {
    match result {
        Ok(run_report) => run_report.all_passed(),
        Err(e) => {
            terminal::error(&e.to_string());
            false
        }
    }
}
