//! Shared testing harness for `laraforge` integration tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated environment for CLI exercises: a fake `$HOME` and a working
/// directory for staged artifacts.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
    work_dir: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        let work_dir = root.path().join("work");
        fs::create_dir_all(&work_dir).expect("Failed to create test work directory");

        Self { root, work_dir }
    }

    /// Absolute path to the emulated `$HOME` directory.
    pub fn home(&self) -> &Path {
        self.root.path()
    }

    /// Working directory used for CLI invocations.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Build a command invoking the compiled `laraforge` binary inside the
    /// isolated working directory.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("laraforge").expect("Failed to locate laraforge binary");
        cmd.current_dir(&self.work_dir).env("HOME", self.home()).env("USER", "tester");
        cmd
    }

    /// Create a leftover artifact file in the working directory.
    pub fn write_artifact(&self, name: &str, content: &str) {
        fs::write(self.work_dir.join(name), content).expect("Failed to write artifact");
    }
}
