//! Preflight checks.
//!
//! Self-installing needs git and a CMake toolchain; processing a prebuilt
//! install needs its `include/` directory. Both are verified up front so a
//! missing tool is reported before anything is cloned.

use anyhow::{bail, Result};
use std::path::Path;
use tracing::{error, info};

use crate::process;

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub details: Option<String>,
}

impl CheckResult {
    pub fn pass_with(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            details: Some(details.to_string()),
        }
    }

    pub fn fail(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            details: Some(details.to_string()),
        }
    }
}

/// Results of a group of checks.
pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }

    /// Log every check.
    pub fn log(&self) {
        for check in &self.checks {
            let details = check.details.as_deref().unwrap_or("");
            if check.passed {
                info!("  [PASS] {} {}", check.name, details);
            } else {
                error!("  [FAIL] {}: {}", check.name, details);
            }
        }
    }
}

/// Tools needed to clone and install the upstream library.
const INSTALL_TOOLS: [(&str, &str); 3] = [
    ("git", "Required to clone the library sources"),
    ("cmake", "Required to configure the library build"),
    ("make", "Required to build and install the library"),
];

/// Check the host tools used by the installer.
pub fn check_host_tools() -> PreflightReport {
    let checks = INSTALL_TOOLS
        .iter()
        .map(|(tool, purpose)| check_tool_exists(tool, purpose))
        .collect();
    PreflightReport { checks }
}

fn check_tool_exists(tool: &str, purpose: &str) -> CheckResult {
    match process::which(tool) {
        Some(path) => CheckResult::pass_with(tool, &path.display().to_string()),
        None => CheckResult::fail(tool, &format!("Not found in PATH. {}", purpose)),
    }
}

/// Fail unless every installer tool is available.
pub fn require_host_tools() -> Result<()> {
    let report = check_host_tools();
    report.log();
    if !report.all_passed() {
        let missing: Vec<&str> = report.failures().map(|c| c.name.as_str()).collect();
        bail!(
            "Missing host tools: {}. Install them or pass an INSTALL_DIR.",
            missing.join(", ")
        );
    }
    Ok(())
}

/// Check that `install_dir` looks like an installed library prefix.
pub fn check_install_dir(install_dir: &Path) -> CheckResult {
    let include = install_dir.join("include");
    if include.is_dir() {
        CheckResult::pass_with("install dir", &include.display().to_string())
    } else {
        CheckResult::fail(
            "install dir",
            &format!("{} does not exist or is not a directory", include.display()),
        )
    }
}

/// Fail unless `install_dir` has an `include/` directory.
pub fn require_install_dir(install_dir: &Path) -> Result<()> {
    let check = check_install_dir(install_dir);
    if !check.passed {
        bail!(
            "Invalid install dir: {}",
            check.details.unwrap_or_default()
        );
    }
    Ok(())
}
