//! Common test utilities for integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// A scratch directory holding the entries of one test.
pub struct TestFixture {
    pub dir: TempDir,
}

impl TestFixture {
    /// Create a new test fixture with a fresh scratch directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Path of `name` inside the scratch directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Create a regular file with the given content.
    pub fn create_file(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Create a regular file whose modification time lies `age` in the past.
    pub fn create_old_file(&self, name: &str, content: &[u8], age: Duration) -> PathBuf {
        let path = self.create_file(name, content);
        let file = fs::File::options()
            .write(true)
            .open(&path)
            .expect("Failed to open file");
        file.set_modified(SystemTime::now() - age)
            .expect("Failed to set mtime");
        path
    }

    /// Check if a file exists and has the expected content.
    pub fn assert_file_content(&self, path: &Path, expected: &[u8]) {
        assert!(path.exists(), "File does not exist: {:?}", path);
        let actual = fs::read(path).expect("Failed to read file");
        assert_eq!(actual, expected, "File content mismatch");
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A fresh `cpf` command.
pub fn cpf() -> Command {
    cargo_bin_cmd!("cpf")
}

/// Modification time of `path`, without following symlinks.
pub fn mtime(path: &Path) -> SystemTime {
    fs::symlink_metadata(path)
        .and_then(|m| m.modified())
        .expect("Failed to read mtime")
}

/// Parse the single JSON object printed by `--output json`.
pub fn parse_json(stdout: &[u8]) -> serde_json::Value {
    serde_json::from_slice(stdout).expect("Failed to parse JSON output")
}
