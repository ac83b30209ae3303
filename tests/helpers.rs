//! Shared test utilities for single-header generation tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test environment with a mock install prefix and an output directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Mock install prefix (contains include/li/...)
    pub install: PathBuf,
    /// Output directory for generated headers
    pub output: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let install = temp_dir.path().join("install");
        let output = temp_dir.path().join("output");

        fs::create_dir_all(install.join("include")).expect("Failed to create include dir");

        Self {
            _temp_dir: temp_dir,
            install,
            output,
        }
    }

    pub fn include_dir(&self) -> PathBuf {
        self.install.join("include")
    }

    /// Write a header under `include/`.
    pub fn header(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.include_dir().join(rel);
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create header dir");
        fs::write(&path, content).expect("Failed to write header");
        path
    }

    pub fn read_output(&self, library: &str) -> String {
        fs::read_to_string(self.output.join(format!("{}.hh", library)))
            .expect("Failed to read generated header")
    }
}

/// The part of a generated header between the banner and the body.
pub fn include_section(header: &str) -> &str {
    let start = header.find("#pragma once\n\n").expect("missing #pragma once") + "#pragma once\n\n".len();
    let end = header[start..].find("\n\n").map(|i| start + i).unwrap_or(header.len());
    &header[start..end]
}

pub fn assert_file_contains(path: &Path, needle: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    assert!(
        content.contains(needle),
        "{} does not contain '{}'",
        path.display(),
        needle
    );
}
