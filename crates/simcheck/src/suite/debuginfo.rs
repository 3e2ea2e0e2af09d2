//! Debug-info suite: source-level trace annotations checked by properties
//! rather than exact output.
//!
//! Compilers disagree on which file an instruction is attributed to (a C
//! program may be traced through its generated `.S`), so the cases check
//! that some expected file shows up, that line numbers are sane and that
//! enough of the trace is annotated.

use std::path::Path;

use simcheck_verify::Expectation;

use super::{Protocol, SkipCondition, TestCase};
use crate::config::ToolchainKind;
use crate::process::ModeFlags;

/// One debug-info case.
#[derive(Debug, Clone, Copy)]
pub struct DebugInfoCase {
    pub name: &'static str,
    pub elf: &'static str,
    pub description: &'static str,
    /// Filename suffixes, any of which satisfies the presence check.
    pub files: &'static [&'static str],
    pub min_coverage: f64,
    /// The simulator cannot read DWARF emitted by Clang.
    pub skip_clang: bool,
    /// Some toolchains cannot build the input at all.
    pub skip_if_missing: bool,
}

impl DebugInfoCase {
    pub fn expectation(&self) -> Expectation {
        Expectation::new()
            .with_source_files(self.files.iter().copied())
            .with_min_coverage(self.min_coverage)
            .with_trace_checks(true)
    }
}

pub const CASES: &[DebugInfoCase] = &[
    DebugInfoCase {
        name: "selection_sort_debuginfo",
        elf: "selection_sort.elf",
        description: "C program with loops, source file appears in trace",
        files: &[".c", ".S"],
        min_coverage: 0.5,
        skip_clang: true,
        skip_if_missing: false,
    },
    DebugInfoCase {
        name: "vect_add_debuginfo",
        elf: "vect_add.elf",
        description: "Vector addition, debug info present",
        files: &[".c", ".S"],
        min_coverage: 0.3,
        skip_clang: true,
        skip_if_missing: false,
    },
    DebugInfoCase {
        name: "branchpred_debuginfo",
        elf: "branchpred_1.elf",
        description: "Branch prediction loops, debug info present",
        files: &[".c", ".S"],
        min_coverage: 0.5,
        skip_clang: true,
        skip_if_missing: false,
    },
    DebugInfoCase {
        name: "ffs_debuginfo",
        elf: "ffs_as_log2.elf",
        description: "Find first set, debug info for C code",
        files: &[".c", ".S"],
        min_coverage: 0.5,
        skip_clang: true,
        skip_if_missing: false,
    },
    DebugInfoCase {
        name: "fact_ok_debuginfo",
        elf: "fact_ok.elf",
        description: "Factorial in assembly, .S file appears",
        files: &[".S"],
        min_coverage: 0.8,
        skip_clang: true,
        skip_if_missing: false,
    },
    DebugInfoCase {
        name: "call_10args_debuginfo",
        elf: "call_10args.elf",
        description: "Ten-argument call, assembly debug info",
        files: &[".S"],
        min_coverage: 0.8,
        skip_clang: true,
        skip_if_missing: true,
    },
];

/// Trace switches every debug-info case needs.
pub fn flags() -> ModeFlags {
    ModeFlags::new().with_trace_fetch(true).with_trace_source(true)
}

/// Test cases for every built-in debug-info check, ELFs under `build_dir`.
pub fn cases(build_dir: &Path) -> Vec<TestCase> {
    CASES
        .iter()
        .map(|case| {
            let mut test = TestCase::new(
                case.name,
                build_dir.join(case.elf),
                Protocol::Property(case.expectation()),
            )
            .with_flags(flags())
            .with_description(case.description);
            if case.skip_clang {
                test = test.with_skip(SkipCondition::Toolchain(ToolchainKind::Clang));
            }
            if case.skip_if_missing {
                test = test.with_skip(SkipCondition::IfMissing);
            }
            test
        })
        .collect()
}
