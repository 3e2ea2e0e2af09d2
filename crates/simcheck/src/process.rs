//! Simulator process runner.
//!
//! One call spawns exactly one simulator process group, drains its output
//! pipes on helper threads, and enforces a finite timeout over the whole
//! call. A non-zero exit code is a normal result; only failing to obtain
//! any result is an error.

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use simcheck_output::SimOutput;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::ProcessError;

/// Interval between child status polls.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

// ============================================================================
// Cache policy
// ============================================================================

/// Cache policy parse errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CachePolicyError {
    #[error("invalid cache policy '{0}', expected <lru|lfu|random>,<sets>,<block>,<ways>[,<wb|wt|wtna|wta>]")]
    Format(String),
    #[error("unknown replacement policy '{0}', expected lru, lfu or random")]
    Replacement(String),
    #[error("invalid {field} '{value}', expected a positive integer")]
    Number { field: &'static str, value: String },
    #[error("unknown write policy '{0}', expected wb, wt, wtna or wta")]
    Write(String),
}

/// Cache line replacement policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    Lru,
    Lfu,
    Random,
}

impl Replacement {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lru => "lru",
            Self::Lfu => "lfu",
            Self::Random => "random",
        }
    }
}

/// Cache write policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    WriteBack,
    WriteThrough,
    WriteThroughNoAllocate,
    WriteThroughAllocate,
}

impl WritePolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WriteBack => "wb",
            Self::WriteThrough => "wt",
            Self::WriteThroughNoAllocate => "wtna",
            Self::WriteThroughAllocate => "wta",
        }
    }
}

/// Cache configuration passed to `--d-cache` / `--i-cache`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub replacement: Replacement,
    pub sets: u32,
    pub block_size: u32,
    pub ways: u32,
    pub write: Option<WritePolicy>,
}

impl CachePolicy {
    /// LRU cache with the given geometry and no explicit write policy.
    pub const fn lru(sets: u32, block_size: u32, ways: u32) -> Self {
        Self {
            replacement: Replacement::Lru,
            sets,
            block_size,
            ways,
            write: None,
        }
    }

    /// Set the write policy.
    #[must_use]
    pub const fn with_write(mut self, write: WritePolicy) -> Self {
        self.write = Some(write);
        self
    }
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.replacement.as_str(),
            self.sets,
            self.block_size,
            self.ways
        )?;
        if let Some(write) = self.write {
            write!(f, ",{}", write.as_str())?;
        }
        Ok(())
    }
}

impl FromStr for CachePolicy {
    type Err = CachePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if !(4..=5).contains(&parts.len()) {
            return Err(CachePolicyError::Format(s.to_string()));
        }

        let replacement = match parts[0].to_ascii_lowercase().as_str() {
            "lru" => Replacement::Lru,
            "lfu" => Replacement::Lfu,
            "random" => Replacement::Random,
            _ => return Err(CachePolicyError::Replacement(parts[0].to_string())),
        };

        let number = |field: &'static str, value: &str| match value.parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(CachePolicyError::Number {
                field,
                value: value.to_string(),
            }),
        };

        let write = match parts.get(4) {
            None => None,
            Some(w) => Some(match w.to_ascii_lowercase().as_str() {
                "wb" => WritePolicy::WriteBack,
                "wt" => WritePolicy::WriteThrough,
                "wtna" => WritePolicy::WriteThroughNoAllocate,
                "wta" => WritePolicy::WriteThroughAllocate,
                _ => return Err(CachePolicyError::Write((*w).to_string())),
            }),
        };

        Ok(Self {
            replacement,
            sets: number("set count", parts[1])?,
            block_size: number("block size", parts[2])?,
            ways: number("associativity", parts[3])?,
            write,
        })
    }
}

// ============================================================================
// Mode flags
// ============================================================================

/// Simulator command-line switches for one invocation.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeFlags {
    pub dump_registers: bool,
    pub dump_cycles: bool,
    pub pipelined: bool,
    pub data_cache: Option<CachePolicy>,
    pub instruction_cache: Option<CachePolicy>,
    pub trace_fetch: bool,
    pub trace_source: bool,
}

impl ModeFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a register dump.
    #[must_use]
    pub const fn with_dump_registers(mut self, enabled: bool) -> Self {
        self.dump_registers = enabled;
        self
    }

    /// Request the cycle counter.
    #[must_use]
    pub const fn with_dump_cycles(mut self, enabled: bool) -> Self {
        self.dump_cycles = enabled;
        self
    }

    /// Run the pipelined core.
    #[must_use]
    pub const fn with_pipelined(mut self, enabled: bool) -> Self {
        self.pipelined = enabled;
        self
    }

    /// Enable the data and instruction caches.
    #[must_use]
    pub const fn with_caches(mut self, data: CachePolicy, instruction: CachePolicy) -> Self {
        self.data_cache = Some(data);
        self.instruction_cache = Some(instruction);
        self
    }

    /// Trace fetched instructions.
    #[must_use]
    pub const fn with_trace_fetch(mut self, enabled: bool) -> Self {
        self.trace_fetch = enabled;
        self
    }

    /// Annotate traced instructions with source locations.
    #[must_use]
    pub const fn with_trace_source(mut self, enabled: bool) -> Self {
        self.trace_source = enabled;
        self
    }

    /// Whether any cache is enabled.
    pub const fn cached(&self) -> bool {
        self.data_cache.is_some() || self.instruction_cache.is_some()
    }

    /// Combine with `other`; switches are OR-ed and `other`'s caches win.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        Self {
            dump_registers: self.dump_registers || other.dump_registers,
            dump_cycles: self.dump_cycles || other.dump_cycles,
            pipelined: self.pipelined || other.pipelined,
            data_cache: other.data_cache.or(self.data_cache),
            instruction_cache: other.instruction_cache.or(self.instruction_cache),
            trace_fetch: self.trace_fetch || other.trace_fetch,
            trace_source: self.trace_source || other.trace_source,
        }
    }

    /// Short execution mode label.
    pub const fn describe(&self) -> &'static str {
        match (self.pipelined, self.cached()) {
            (false, false) => "single-cycle",
            (true, false) => "pipelined",
            (false, true) => "cached",
            (true, true) => "pipelined+cached",
        }
    }

    /// Render as simulator arguments.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.dump_registers {
            args.push("--dump-registers".to_string());
        }
        if self.dump_cycles {
            args.push("--dump-cycles".to_string());
        }
        if self.pipelined {
            args.push("--pipelined".to_string());
        }
        if let Some(policy) = self.data_cache {
            args.push("--d-cache".to_string());
            args.push(policy.to_string());
        }
        if let Some(policy) = self.instruction_cache {
            args.push("--i-cache".to_string());
            args.push(policy.to_string());
        }
        if self.trace_fetch {
            args.push("--trace-fetch".to_string());
        }
        if self.trace_source {
            args.push("--trace-source".to_string());
        }
        args
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Captured result of one simulator invocation.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when terminated by a signal.
    pub exit_code: Option<i32>,
    /// Wall-clock time from spawn to exit.
    pub elapsed: Duration,
}

impl ProcessOutput {
    /// Parse stdout into typed records.
    pub fn parse(&self) -> SimOutput {
        SimOutput::parse(self.stdout.as_str()).with_exit_code(self.exit_code)
    }
}

/// Check that `path` names an executable regular file.
pub fn check_executable(path: &Path) -> Result<(), ProcessError> {
    let meta = std::fs::metadata(path).map_err(|_| ProcessError::NotFound(path.to_path_buf()))?;
    if !meta.is_file() {
        return Err(ProcessError::NotFound(path.to_path_buf()));
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if meta.permissions().mode() & 0o111 == 0 {
            return Err(ProcessError::NotExecutable(path.to_path_buf()));
        }
    }
    Ok(())
}

/// Run `executable <input> <flags...>` and capture its output.
///
/// The simulator runs in its own process group. When `timeout` expires,
/// either before it exits or while a leftover descendant still holds its
/// pipes, the whole group is killed and the call returns
/// [`ProcessError::Timeout`]. Output read so far is discarded in that case.
pub fn run(
    executable: &Path,
    input: &Path,
    flags: &ModeFlags,
    timeout: Duration,
) -> Result<ProcessOutput, ProcessError> {
    check_executable(executable)?;

    let args = flags.to_args();
    debug!(
        simulator = %executable.display(),
        input = %input.display(),
        args = %args.join(" "),
        "spawning simulator"
    );

    let mut command = Command::new(executable);
    command
        .arg(input)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }
    let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
        path: PathBuf::from(executable),
        source,
    })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let start = Instant::now();

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => {
                kill_group(&mut child);
                return Err(e.into());
            }
        }
        if start.elapsed() >= timeout {
            warn!(input = %input.display(), ?timeout, "simulator timed out, killing");
            kill_group(&mut child);
            return Err(ProcessError::Timeout(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    };
    let elapsed = start.elapsed();

    let collected = collect(&stdout, start, timeout).and_then(|out| {
        collect(&stderr, start, timeout).map(|err| (out, err))
    });
    // Background descendants must not outlive the run.
    kill_group(&mut child);
    let (stdout, stderr) = match collected {
        Ok(pipes) => pipes,
        Err(Collect::TimedOut) => {
            warn!(
                input = %input.display(),
                ?timeout,
                "simulator exited but a descendant kept its output open, killing"
            );
            return Err(ProcessError::Timeout(timeout));
        }
        Err(Collect::Failed(e)) => return Err(e.into()),
    };
    debug!(code = ?status.code(), ?elapsed, "simulator exited");

    Ok(ProcessOutput {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        exit_code: status.code(),
        elapsed,
    })
}

type PipeReceiver = Receiver<io::Result<Vec<u8>>>;

enum Collect {
    TimedOut,
    Failed(io::Error),
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> PipeReceiver {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = match pipe {
            Some(mut pipe) => pipe.read_to_end(&mut buf).map(|_| buf),
            None => Ok(buf),
        };
        let _ = tx.send(result);
    });
    rx
}

/// Wait for a reader thread within what is left of `timeout`.
fn collect(rx: &PipeReceiver, start: Instant, timeout: Duration) -> Result<Vec<u8>, Collect> {
    let remaining = timeout.saturating_sub(start.elapsed());
    match rx.recv_timeout(remaining) {
        Ok(result) => result.map_err(Collect::Failed),
        Err(RecvTimeoutError::Timeout) => Err(Collect::TimedOut),
        Err(RecvTimeoutError::Disconnected) => Err(Collect::Failed(io::Error::other(
            "output reader thread panicked",
        ))),
    }
}

/// Kill the child's process group, then the child itself, and reap it.
fn kill_group(child: &mut Child) {
    #[cfg(unix)]
    if let Ok(pid) = i32::try_from(child.id()) {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;
        if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL)
            && e != nix::errno::Errno::ESRCH
        {
            debug!(pid, error = %e, "failed to kill simulator process group");
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_policy_parse() {
        let policy: CachePolicy = "lru,2,2,2,wb".parse().unwrap();
        assert_eq!(policy, CachePolicy::lru(2, 2, 2).with_write(WritePolicy::WriteBack));
        assert_eq!(policy.to_string(), "lru,2,2,2,wb");

        let policy: CachePolicy = "random,4,8,1".parse().unwrap();
        assert_eq!(policy.replacement, Replacement::Random);
        assert_eq!(policy.write, None);
        assert_eq!(policy.to_string(), "random,4,8,1");
    }

    #[test]
    fn test_cache_policy_errors() {
        assert!(matches!(
            "lru,2,2".parse::<CachePolicy>(),
            Err(CachePolicyError::Format(_))
        ));
        assert!(matches!(
            "fifo,2,2,2".parse::<CachePolicy>(),
            Err(CachePolicyError::Replacement(_))
        ));
        assert!(matches!(
            "lru,0,2,2".parse::<CachePolicy>(),
            Err(CachePolicyError::Number { field: "set count", .. })
        ));
        assert!(matches!(
            "lru,2,x,2".parse::<CachePolicy>(),
            Err(CachePolicyError::Number { field: "block size", .. })
        ));
        assert!(matches!(
            "lru,2,2,2,wx".parse::<CachePolicy>(),
            Err(CachePolicyError::Write(_))
        ));
    }

    #[test]
    fn test_mode_flags_args() {
        let flags = ModeFlags::new()
            .with_dump_registers(true)
            .with_dump_cycles(true)
            .with_pipelined(true)
            .with_caches(
                CachePolicy::lru(2, 2, 2).with_write(WritePolicy::WriteBack),
                CachePolicy::lru(2, 2, 2),
            );
        assert_eq!(
            flags.to_args(),
            vec![
                "--dump-registers",
                "--dump-cycles",
                "--pipelined",
                "--d-cache",
                "lru,2,2,2,wb",
                "--i-cache",
                "lru,2,2,2",
            ]
        );
        assert!(ModeFlags::new().to_args().is_empty());
    }

    #[test]
    fn test_mode_flags_describe() {
        let cache = CachePolicy::lru(2, 2, 2);
        assert_eq!(ModeFlags::new().describe(), "single-cycle");
        assert_eq!(ModeFlags::new().with_pipelined(true).describe(), "pipelined");
        assert_eq!(ModeFlags::new().with_caches(cache, cache).describe(), "cached");
        assert_eq!(
            ModeFlags::new()
                .with_pipelined(true)
                .with_caches(cache, cache)
                .describe(),
            "pipelined+cached"
        );
    }

    #[test]
    fn test_mode_flags_merged() {
        let base = ModeFlags::new().with_trace_fetch(true).with_trace_source(true);
        let mode = ModeFlags::new()
            .with_pipelined(true)
            .with_caches(CachePolicy::lru(4, 4, 1), CachePolicy::lru(2, 2, 2));
        let merged = base.merged(&mode);
        assert!(merged.trace_fetch && merged.trace_source && merged.pipelined);
        assert_eq!(merged.data_cache, Some(CachePolicy::lru(4, 4, 1)));
        assert!(!merged.dump_registers);
    }

    #[test]
    fn test_check_executable_missing() {
        let err = check_executable(Path::new("/nonexistent/simulator")).unwrap_err();
        assert!(matches!(err, ProcessError::NotFound(_)));
    }
}
