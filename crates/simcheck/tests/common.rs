//! Scratch directories with fake simulator scripts.
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file, creating parent directories.
    pub fn file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(&path, contents).expect("failed to write file");
        path
    }

    /// Write an executable `/bin/sh` script.
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.file(name, &format!("#!/bin/sh\n{body}\n"));
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("failed to chmod script");
        path
    }

    /// Simulator that prints `stdout` and exits with `code`.
    pub fn simulator(&self, stdout: &str, code: i32) -> PathBuf {
        self.script("sim", &format!("cat <<'OUT'\n{stdout}\nOUT\nexit {code}"))
    }

    /// Empty input ELF.
    pub fn elf(&self, name: &str) -> PathBuf {
        self.file(name, "")
    }
}
