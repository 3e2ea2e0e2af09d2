//! Official conformance suite: `riscv-tests` binaries built with an
//! environment that reports PASS/FAIL through a magic value in `a1`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use simcheck_verify::VerdictStatus;
use tracing::{debug, info};

use super::{TestCase, display_name};
use crate::error::{Result, SuiteError};
use crate::orchestrator::RunReport;
use crate::process::{CachePolicy, ModeFlags, WritePolicy};

/// Build directory relative to the suite root.
pub const ISA_DIR: &str = "isa";

/// Directory with built test binaries, relative to the suite root.
pub const ELF_DIR: &str = "isa/elf";

/// With this many files or fewer the binaries count as not built.
pub const MIN_BUILT: usize = 5;

// ============================================================================
// Categories
// ============================================================================

/// Instruction-set test category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Base integer, user level.
    Ui,
    /// Multiply and divide.
    Um,
    /// Atomics.
    Ua,
    /// Supervisor level.
    Si,
    /// Machine level.
    Mi,
}

impl Category {
    pub const ALL: [Self; 5] = [Self::Ui, Self::Um, Self::Ua, Self::Si, Self::Mi];

    /// Short tag used in file names (`rv32ui-p-add`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ui => "ui",
            Self::Um => "um",
            Self::Ua => "ua",
            Self::Si => "si",
            Self::Mi => "mi",
        }
    }

    /// Section title (`RVxxUI`).
    pub fn title(self) -> String {
        format!("RVxx{}", self.as_str().to_ascii_uppercase())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Register width of a test group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    Rv32,
    Rv64,
}

impl Width {
    pub const fn bits(self) -> u32 {
        match self {
            Self::Rv32 => 32,
            Self::Rv64 => 64,
        }
    }
}

/// Category selection for a run.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub multiply: bool,
    pub atomic: bool,
    pub csr: bool,
    pub rv32: bool,
    pub rv64: bool,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            multiply: false,
            atomic: false,
            csr: false,
            rv32: true,
            rv64: true,
        }
    }
}

impl Selection {
    /// Categories to run, base integer first.
    pub fn categories(&self) -> Vec<Category> {
        let mut categories = vec![Category::Ui];
        if self.multiply {
            categories.push(Category::Um);
        }
        if self.atomic {
            categories.push(Category::Ua);
        }
        if self.csr {
            categories.extend([Category::Si, Category::Mi]);
        }
        categories
    }

    /// Register widths to run.
    pub fn widths(&self) -> Vec<Width> {
        let mut widths = Vec::new();
        if self.rv32 {
            widths.push(Width::Rv32);
        }
        if self.rv64 {
            widths.push(Width::Rv64);
        }
        widths
    }
}

// ============================================================================
// Discovery
// ============================================================================

/// Regular, non-hidden files in `dir`, sorted by name. Missing is empty.
pub fn list_binaries(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_none_or(|n| n.starts_with('.'));
        if !hidden {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Rebuild the suite with `make -C <suite>/isa clean all`.
pub fn rebuild(suite_dir: &Path, make: &Path) -> Result<()> {
    let isa = suite_dir.join(ISA_DIR);
    if !isa.is_dir() {
        return Err(SuiteError::MissingDirectory(isa));
    }
    info!(dir = %isa.display(), "rebuilding conformance binaries");
    clean(suite_dir, make)?;
    run_make(make, &isa, &[])
}

/// Remove built binaries with `make -C <suite>/isa clean`.
pub fn clean(suite_dir: &Path, make: &Path) -> Result<()> {
    run_make(make, &suite_dir.join(ISA_DIR), &["clean"])
}

fn run_make(make: &Path, dir: &Path, targets: &[&str]) -> Result<()> {
    debug!(make = %make.display(), dir = %dir.display(), ?targets, "running make");
    let status = Command::new(make)
        .arg("-C")
        .arg(dir)
        .args(targets)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| SuiteError::Rebuild(format!("{}: {e}", make.display())))?;
    if status.success() {
        Ok(())
    } else {
        Err(SuiteError::Rebuild(format!(
            "{} -C {} {} exited with {status}",
            make.display(),
            dir.display(),
            targets.join(" ")
        )))
    }
}

/// Find built conformance binaries, rebuilding at most once.
///
/// A rebuild happens when `force` is set or when too few binaries are
/// present. Whatever is present after that single attempt is returned.
pub fn discover(suite_dir: &Path, force: bool, make: &Path) -> Result<Vec<PathBuf>> {
    let elf_dir = suite_dir.join(ELF_DIR);
    if !force {
        let files = list_binaries(&elf_dir)?;
        if files.len() > MIN_BUILT {
            return Ok(files);
        }
        info!(found = files.len(), "too few conformance binaries, trying to build");
    }

    rebuild(suite_dir, make)?;
    let files = list_binaries(&elf_dir)?;
    if files.is_empty() {
        return Err(SuiteError::NoBinaries(elf_dir));
    }
    Ok(files)
}

/// Binaries of one category and width, in input order.
pub fn group(files: &[PathBuf], category: Category, width: Width) -> Vec<PathBuf> {
    let tag = format!("{}{}", width.bits(), category.as_str());
    files
        .iter()
        .filter(|path| display_name(path).contains(&tag))
        .cloned()
        .collect()
}

/// Simulator mode used by the conformance suite.
pub fn mode(pipelined: bool, cached: bool) -> ModeFlags {
    let mode = ModeFlags::new().with_pipelined(pipelined);
    if cached {
        mode.with_caches(
            CachePolicy::lru(2, 2, 2).with_write(WritePolicy::WriteBack),
            CachePolicy::lru(2, 2, 2),
        )
    } else {
        mode
    }
}

/// Sentinel cases for the given binaries, named after the files.
pub fn cases(files: &[PathBuf]) -> Vec<TestCase> {
    files
        .iter()
        .map(|path| TestCase::sentinel(display_name(path), path))
        .collect()
}

// ============================================================================
// Self-test
// ============================================================================

/// Disagreements between binary names and verdicts in a self-test run.
///
/// Self-test binaries are named after the outcome they must produce
/// (`*pass*` or `*fail*`), which checks the classifier itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelftestReport {
    /// Passed, but named to fail.
    pub passed_expected_fail: Vec<String>,
    /// Failed, but named to pass.
    pub failed_expected_pass: Vec<String>,
    /// No interpretable result.
    pub errored: Vec<String>,
}

impl SelftestReport {
    /// Compare every verdict in `report` with its binary name.
    pub fn from_report(report: &RunReport) -> Self {
        let mut out = Self::default();
        for result in &report.results {
            let name = result.name.clone();
            match result.verdict.status {
                VerdictStatus::Pass if name.contains("fail") => {
                    out.passed_expected_fail.push(name);
                }
                VerdictStatus::Fail if name.contains("pass") => {
                    out.failed_expected_pass.push(name);
                }
                VerdictStatus::Error => out.errored.push(name),
                _ => {}
            }
        }
        out
    }

    pub fn is_clean(&self) -> bool {
        self.passed_expected_fail.is_empty()
            && self.failed_expected_pass.is_empty()
            && self.errored.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from("isa/elf").join(n)).collect()
    }

    #[test]
    fn test_group_by_category_and_width() {
        let files = paths(&[
            "rv32ui-p-add",
            "rv32ui-p-sub",
            "rv32um-p-mul",
            "rv64ui-p-add",
            "rv64mi-p-csr",
        ]);
        let names = |v: Vec<PathBuf>| v.iter().map(|p| display_name(p)).collect::<Vec<_>>();

        assert_eq!(
            names(group(&files, Category::Ui, Width::Rv32)),
            vec!["rv32ui-p-add", "rv32ui-p-sub"]
        );
        assert_eq!(names(group(&files, Category::Um, Width::Rv32)), vec!["rv32um-p-mul"]);
        assert_eq!(names(group(&files, Category::Ui, Width::Rv64)), vec!["rv64ui-p-add"]);
        assert!(group(&files, Category::Ua, Width::Rv64).is_empty());
    }

    #[test]
    fn test_selection() {
        assert_eq!(Selection::default().categories(), vec![Category::Ui]);
        let all = Selection {
            multiply: true,
            atomic: true,
            csr: true,
            rv32: false,
            rv64: true,
        };
        assert_eq!(all.categories(), Category::ALL.to_vec());
        assert_eq!(all.widths(), vec![Width::Rv64]);
    }

    #[test]
    fn test_category_title() {
        assert_eq!(Category::Ui.title(), "RVxxUI");
        assert_eq!(Category::Mi.title(), "RVxxMI");
    }

    #[test]
    fn test_mode() {
        assert_eq!(
            mode(false, true).to_args(),
            vec!["--d-cache", "lru,2,2,2,wb", "--i-cache", "lru,2,2,2"]
        );
        assert_eq!(mode(true, false).to_args(), vec!["--pipelined"]);
    }

    #[test]
    fn test_cases_named_after_files() {
        let cases = cases(&paths(&["rv32ui-p-add"]));
        assert_eq!(cases[0].name, "rv32ui-p-add");
        assert_eq!(cases[0].input, Path::new("isa/elf/rv32ui-p-add"));
    }

    #[test]
    fn test_list_binaries_missing_dir() {
        assert!(list_binaries(Path::new("/nonexistent/isa/elf")).unwrap().is_empty());
    }
}
