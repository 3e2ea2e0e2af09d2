//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use simcheck::process::CachePolicy;
use simcheck::{ModeFlags, ToolchainKind};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser, Debug)]
#[command(name = "simcheck")]
#[command(about = "Verification harness for RISC-V instruction-set simulators")]
#[command(version)]
pub struct Cli {
    /// Show metrics summary after execution
    #[arg(long, global = true)]
    pub metrics: bool,

    /// Per-check detail for every test (sets RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// No colour or spinner
    #[arg(long, global = true)]
    pub plain: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the official riscv-tests conformance suite (RV32UI and RV64UI by default)
    Official {
        /// Simulator executable
        #[arg(value_name = "SIMULATOR")]
        simulator: PathBuf,

        /// Suite root containing isa/ and selftests
        #[arg(long, default_value = "tests/riscv-official")]
        suite: PathBuf,

        /// Disable 32-bit tests
        #[arg(long = "no-32")]
        no_32: bool,

        /// Disable 64-bit tests
        #[arg(long = "no-64")]
        no_64: bool,

        /// Also run the sentinel-protocol tests in this directory
        #[arg(short = 'E', long, value_name = "DIR")]
        external: Option<PathBuf>,

        /// Add multiply/divide tests (RVxxUM)
        #[arg(short = 'M', long)]
        multiply: bool,

        /// Add atomic tests (RVxxUA)
        #[arg(short = 'A', long)]
        atomic: bool,

        /// Add supervisor and machine level tests (RVxxSI, RVxxMI)
        #[arg(long, alias = "CSR")]
        csr: bool,

        #[command(flatten)]
        mode: ModeArgs,

        #[command(flatten)]
        run: RunArgs,

        /// Do not print simulator output for failing tests
        #[arg(long)]
        no_dump: bool,

        /// Print simulator output for every test (overrides --no-pass and --no-dump)
        #[arg(long)]
        d_regs: bool,

        /// Rebuild the conformance binaries before running
        #[arg(short = 'R', long)]
        rebuild: bool,

        /// Only run the tester's self-test binaries from this directory
        #[arg(short = 'S', long, value_name = "DIR")]
        selftest: Option<PathBuf>,

        /// Remove built binaries and exit
        #[arg(long)]
        clean: bool,

        /// Build tool used for --rebuild and --clean
        #[arg(long, default_value = "make")]
        make: PathBuf,
    },
    /// Run the functional program suite (registers and cycle counts)
    Functional {
        #[command(flatten)]
        sim: SimArgs,

        #[command(flatten)]
        mode: ModeArgs,

        #[command(flatten)]
        run: RunArgs,

        /// Print simulator output for every test
        #[arg(long)]
        show_output: bool,
    },
    /// Run the debug-info suite (source annotations in the trace)
    Debuginfo {
        #[command(flatten)]
        sim: SimArgs,

        #[command(flatten)]
        run: RunArgs,

        /// Print simulator output for every test
        #[arg(long)]
        show_output: bool,

        /// List available tests and exit
        #[arg(long)]
        list: bool,

        /// Toolchain that built the ELFs (detected from --build-dir when omitted)
        #[arg(long, value_enum)]
        toolchain: Option<ToolchainArg>,
    },
    /// Run the functional and debug-info suites back to back
    All {
        #[command(flatten)]
        sim: SimArgs,

        #[command(flatten)]
        mode: ModeArgs,

        /// Number of parallel jobs (0 = one per CPU)
        #[arg(short = 'j', long, default_value = "1")]
        jobs: usize,

        /// Per-test timeout in seconds
        #[arg(short = 't', long, default_value = "30")]
        timeout: u64,

        /// Only print tests that did not pass
        #[arg(long)]
        no_pass: bool,

        /// Toolchain that built the ELFs (detected from --build-dir when omitted)
        #[arg(long, value_enum)]
        toolchain: Option<ToolchainArg>,
    },
}

/// Simulator and input location for the stud-support suites.
#[derive(Args, Clone, Debug)]
pub struct SimArgs {
    /// Simulator executable
    #[arg(long = "qtrvsim-cli", value_name = "PATH", default_value = "build/target/qtrvsim_cli")]
    pub simulator: PathBuf,

    /// Directory containing the test ELFs
    #[arg(long, default_value = "tests/stud-support/elfs")]
    pub build_dir: PathBuf,
}

/// Simulator execution mode.
#[derive(Args, Clone, Copy, Debug)]
pub struct ModeArgs {
    /// Run the simulator in pipelined mode
    #[arg(long)]
    pub pipeline: bool,

    /// Enable data and instruction caches
    #[arg(long)]
    pub cache: bool,

    /// Cache setup for both caches, as <lru|lfu|random>,<sets>,<block>,<ways>[,<wb|wt|wtna|wta>]
    /// (implies --cache)
    #[arg(long, value_name = "POLICY")]
    pub cache_policy: Option<CachePolicy>,
}

impl ModeArgs {
    /// Resolve against a suite's mode builder; `--cache-policy` replaces the
    /// suite's default cache setup.
    pub fn flags(self, suite_mode: fn(bool, bool) -> ModeFlags) -> ModeFlags {
        let mode = suite_mode(self.pipeline, self.cache);
        match self.cache_policy {
            Some(policy) => mode.with_caches(policy, policy),
            None => mode,
        }
    }
}

/// Selection, parallelism and output switches shared by suites.
#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Only run tests whose name contains this substring
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Number of parallel jobs (0 = one per CPU)
    #[arg(short = 'j', long, default_value = "1")]
    pub jobs: usize,

    /// Per-test timeout in seconds
    #[arg(short = 't', long, default_value = "30")]
    pub timeout: u64,

    /// Only print tests that did not pass
    #[arg(long)]
    pub no_pass: bool,
}

/// Toolchain selection.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ToolchainArg {
    Gcc,
    Clang,
}

impl From<ToolchainArg> for ToolchainKind {
    fn from(arg: ToolchainArg) -> Self {
        match arg {
            ToolchainArg::Gcc => Self::Gcc,
            ToolchainArg::Clang => Self::Clang,
        }
    }
}
