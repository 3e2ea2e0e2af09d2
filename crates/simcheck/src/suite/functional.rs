//! Functional suite: small programs checked by final register state and
//! cycle count.

use std::path::Path;

use simcheck_verify::{ExitPolicy, Expectation};

use super::{Protocol, TestCase};
use crate::process::{CachePolicy, ModeFlags};

/// Expected outcome of one functional program.
#[derive(Debug, Clone, Copy)]
pub struct Program {
    pub name: &'static str,
    pub description: &'static str,
    pub registers: &'static [(&'static str, u64)],
    pub min_cycles: u64,
    pub max_cycles: u64,
    pub marker: Option<&'static str>,
}

impl Program {
    /// ELF file name inside the build directory.
    pub fn elf_name(&self) -> String {
        format!("{}.elf", self.name)
    }

    /// Declarative expectation for this program.
    pub fn expectation(&self) -> Expectation {
        let mut expectation = Expectation::new()
            .with_exit(ExitPolicy::RequireZero)
            .with_cycles(self.min_cycles, self.max_cycles);
        for &(name, value) in self.registers {
            expectation = expectation.with_register(name, value);
        }
        if let Some(marker) = self.marker {
            expectation = expectation.with_marker(marker);
        }
        expectation
    }
}

/// Built-in functional programs.
pub const PROGRAMS: &[Program] = &[
    Program {
        name: "selection_sort",
        description: "Sort an array in place",
        registers: &[("s0", 60), ("s1", 60)],
        min_cycles: 500,
        max_cycles: 5000,
        marker: None,
    },
    Program {
        name: "vect_add",
        description: "Element-wise vector addition",
        registers: &[("x8", 0)],
        min_cycles: 100,
        max_cycles: 2000,
        marker: None,
    },
    Program {
        name: "vect_add2",
        description: "Vector addition, second variant",
        registers: &[("t3", 0)],
        min_cycles: 100,
        max_cycles: 2000,
        marker: None,
    },
    Program {
        name: "vect_inc",
        description: "Increment every vector element",
        registers: &[("t3", 0)],
        min_cycles: 100,
        max_cycles: 2000,
        marker: None,
    },
    Program {
        name: "branchpred_1",
        description: "Nested loops for branch prediction",
        registers: &[("s2", 20), ("s0", 4), ("s1", 5)],
        min_cycles: 50,
        max_cycles: 500,
        marker: None,
    },
    Program {
        name: "ffs_as_log2",
        description: "Find first set bit as integer log2",
        registers: &[("a0", 7), ("t1", 7)],
        min_cycles: 20,
        max_cycles: 200,
        marker: None,
    },
    Program {
        name: "uart_echo_irq",
        description: "Interrupt-driven serial echo",
        registers: &[],
        min_cycles: 5,
        max_cycles: 50,
        marker: None,
    },
    Program {
        name: "call_clobber",
        description: "Caller-saved registers across a call",
        registers: &[("a0", 0xffff_ffff_ffff_fffc)],
        min_cycles: 15,
        max_cycles: 200,
        marker: None,
    },
    Program {
        name: "call_save",
        description: "Callee-saved registers across a call",
        registers: &[("a0", 0xffff_ffff_ffff_fffc)],
        min_cycles: 15,
        max_cycles: 200,
        marker: None,
    },
    Program {
        name: "fact_ok",
        description: "Recursive factorial",
        registers: &[("t0", 24), ("a0", 24)],
        min_cycles: 50,
        max_cycles: 500,
        marker: None,
    },
    Program {
        name: "call_10args",
        description: "Call with ten arguments, some on the stack",
        registers: &[("a0", 55)],
        min_cycles: 30,
        max_cycles: 300,
        marker: None,
    },
    Program {
        name: "linus_hello",
        description: "Hello world through Linux syscalls",
        registers: &[],
        min_cycles: 5,
        max_cycles: 50,
        marker: None,
    },
];

/// Cache setup used by the functional suite in cached mode.
pub const fn cache_policy() -> CachePolicy {
    CachePolicy::lru(2, 2, 2)
}

/// Simulator mode for the functional suite.
pub fn mode(pipelined: bool, cached: bool) -> ModeFlags {
    let mode = ModeFlags::new().with_pipelined(pipelined);
    if cached {
        mode.with_caches(cache_policy(), cache_policy())
    } else {
        mode
    }
}

/// Test cases for every built-in program, with ELFs under `build_dir`.
pub fn cases(build_dir: &Path) -> Vec<TestCase> {
    let flags = ModeFlags::new()
        .with_dump_registers(true)
        .with_dump_cycles(true);
    PROGRAMS
        .iter()
        .map(|program| {
            TestCase::new(
                program.name,
                build_dir.join(program.elf_name()),
                Protocol::Property(program.expectation()),
            )
            .with_flags(flags.clone())
            .with_description(program.description)
        })
        .collect()
}
