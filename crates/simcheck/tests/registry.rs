//! Every built-in functional and debug-info case, run against a fake
//! simulator that prints exactly what the case expects.

use std::fmt::Write;

use libtest_mimic::{Arguments, Failed, Trial};
use simcheck::suite::debuginfo::{self, DebugInfoCase};
use simcheck::suite::functional::{self, Program};
use simcheck::{HarnessConfig, RegisterId, TestCase, ToolchainKind, VerdictStatus, run_case};

mod common;

use common::Sandbox;

fn main() {
    let args = Arguments::from_args();

    let mut trials = Vec::new();
    for program in functional::PROGRAMS {
        trials.push(Trial::test(format!("functional::{}", program.name), move || {
            expect(program_run(program, false)?, VerdictStatus::Pass)
        }));
        if !program.registers.is_empty() {
            trials.push(Trial::test(
                format!("functional::{}::wrong_register", program.name),
                move || expect(program_run(program, true)?, VerdictStatus::Fail),
            ));
        }
    }
    for case in debuginfo::CASES {
        trials.push(Trial::test(format!("debuginfo::{}", case.name), move || {
            expect(debuginfo_run(case, ToolchainKind::Gcc)?, VerdictStatus::Pass)
        }));
        if case.skip_clang {
            trials.push(Trial::test(
                format!("debuginfo::{}::clang", case.name),
                move || expect(debuginfo_run(case, ToolchainKind::Clang)?, VerdictStatus::Skipped),
            ));
        }
    }

    libtest_mimic::run(&args, trials).exit();
}

fn expect(result: simcheck::CaseResult, status: VerdictStatus) -> Result<(), Failed> {
    if result.verdict.status == status {
        Ok(())
    } else {
        Err(format!(
            "{}: expected {status}, got {} ({})",
            result.name, result.verdict.status, result.verdict.message
        )
        .into())
    }
}

fn find<'a>(cases: &'a [TestCase], name: &str) -> Result<&'a TestCase, Failed> {
    cases
        .iter()
        .find(|c| c.name == name)
        .ok_or_else(|| Failed::from(format!("{name} not in registry")))
}

fn program_run(program: &Program, corrupt: bool) -> Result<simcheck::CaseResult, Failed> {
    let mut stdout = format!("cycles: {}\n", (program.min_cycles + program.max_cycles) / 2);
    for (i, &(name, value)) in program.registers.iter().enumerate() {
        let id: RegisterId = name.parse()?;
        let value = if corrupt && i == 0 { value.wrapping_add(1) } else { value };
        let _ = writeln!(stdout, "{}:0x{value:08x}", id.dump_name());
    }
    if let Some(marker) = program.marker {
        stdout.push_str(marker);
    }

    let sandbox = Sandbox::new();
    sandbox.elf(&program.elf_name());
    let config = HarnessConfig::default().with_simulator(sandbox.simulator(&stdout, 0));
    let cases = functional::cases(sandbox.path());
    Ok(run_case(find(&cases, program.name)?, &config))
}

fn debuginfo_run(case: &DebugInfoCase, toolchain: ToolchainKind) -> Result<simcheck::CaseResult, Failed> {
    let file = format!("{}{}", case.name, case.files[0]);
    let mut stdout = String::new();
    for line in 1..=10 {
        let _ = writeln!(stdout, "Fetch: addi a0,a0,{line} [{file}:{line}]");
    }

    let sandbox = Sandbox::new();
    sandbox.elf(case.elf);
    let config = HarnessConfig::default()
        .with_simulator(sandbox.simulator(&stdout, 0))
        .with_toolchain(toolchain);
    let cases = debuginfo::cases(sandbox.path());
    Ok(run_case(find(&cases, case.name)?, &config))
}
