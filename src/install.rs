//! Upstream library installation.
//!
//! When no install dir is given, the library is cloned into a fresh
//! temporary directory, configured with CMake and installed into a prefix
//! inside that directory:
//!
//! ```text
//! <tmp>/src      git clone <repo_url>
//! <tmp>/build    cmake <tmp>/src -DCMAKE_INSTALL_PREFIX=<tmp>/install
//!                make install -j<jobs>
//! <tmp>/install  headers land in install/include
//! ```
//!
//! Set `SINGLE_HEADERS_KEEP_TEMP=1` to keep the temporary tree afterwards.

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;

use crate::config::Config;
use crate::preflight;
use crate::process::Cmd;
use crate::timing::Timer;

/// An installed library prefix.
///
/// For self-installed libraries the backing temporary directory is removed
/// when this value is dropped.
#[derive(Debug)]
pub struct Installation {
    prefix: PathBuf,
    _temp: Option<TempDir>,
}

impl Installation {
    /// Use an existing install prefix.
    pub fn existing(prefix: impl Into<PathBuf>) -> Result<Self> {
        let prefix = prefix.into();
        preflight::require_install_dir(&prefix)?;
        Ok(Self {
            prefix,
            _temp: None,
        })
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Directory local includes are resolved against.
    pub fn include_dir(&self) -> PathBuf {
        self.prefix.join("include")
    }
}

fn keep_temp() -> bool {
    env::var("SINGLE_HEADERS_KEEP_TEMP")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Clone, build and install the upstream library into a temporary prefix.
pub fn install_library(config: &Config) -> Result<Installation> {
    preflight::require_host_tools()?;

    let temp = tempfile::Builder::new()
        .prefix("single-headers-")
        .tempdir()
        .context("Failed to create temporary directory")?;
    let root = temp.path().to_path_buf();
    let layout = InstallLayout::new(&root);
    layout.create()?;

    info!("Installing {} into {}", config.repo_url, layout.install.display());

    let timer = Timer::start("git clone");
    Cmd::new("git")
        .arg("clone")
        .arg(&config.repo_url)
        .arg_path(&layout.src)
        .error_msg("git clone failed")
        .run_interactive()?;
    timer.finish();

    let timer = Timer::start("cmake configure");
    Cmd::new("cmake")
        .arg_path(&layout.src)
        .arg(format!("-DCMAKE_INSTALL_PREFIX={}", layout.install.display()))
        .dir(&layout.build)
        .error_msg("cmake configure failed")
        .run_interactive()?;
    timer.finish();

    let timer = Timer::start("make install");
    Cmd::new("make")
        .arg("install")
        .arg(format!("-j{}", config.jobs))
        .dir(&layout.build)
        .error_msg("make install failed")
        .run_interactive()?;
    timer.finish();

    let temp = if keep_temp() {
        let kept = temp.keep();
        info!("Keeping temporary tree at {}", kept.display());
        None
    } else {
        Some(temp)
    };

    let prefix = layout.install;
    preflight::require_install_dir(&prefix)?;
    Ok(Installation {
        prefix,
        _temp: temp,
    })
}

/// Directory layout inside the temporary install root.
struct InstallLayout {
    src: PathBuf,
    build: PathBuf,
    install: PathBuf,
}

impl InstallLayout {
    fn new(root: &Path) -> Self {
        Self {
            src: root.join("src"),
            build: root.join("build"),
            install: root.join("install"),
        }
    }

    fn create(&self) -> Result<()> {
        for dir in [&self.src, &self.build, &self.install] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        Ok(())
    }
}
