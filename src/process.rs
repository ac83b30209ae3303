//! External command execution with consistent error reporting.
//!
//! The installer shells out to git, cmake and make. Every invocation goes
//! through [`Cmd`] so failures name the program and its exit code. Output is
//! streamed to the terminal rather than captured.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

/// Builder for an external command.
pub struct Cmd {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    error_prefix: Option<String>,
}

impl Cmd {
    pub fn new(program: impl AsRef<str>) -> Self {
        Self {
            program: program.as_ref().to_string(),
            args: Vec::new(),
            current_dir: None,
            error_prefix: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    pub fn arg_path(mut self, path: &Path) -> Self {
        self.args.push(path.to_string_lossy().into_owned());
        self
    }

    /// Set the working directory.
    pub fn dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    /// Replace the default "'<program>' failed" error prefix.
    pub fn error_msg(mut self, msg: impl AsRef<str>) -> Self {
        self.error_prefix = Some(msg.as_ref().to_string());
        self
    }

    /// Human-readable command line, for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn failure_prefix(&self) -> String {
        self.error_prefix
            .clone()
            .unwrap_or_else(|| format!("'{}' failed", self.program))
    }

    /// Run the command with inherited stdio so progress is visible.
    ///
    /// Used for clone and build steps that can take minutes.
    pub fn run_interactive(self) -> Result<ExitStatus> {
        debug!("Running: {}", self.display());
        let mut cmd = self.command();
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let status = cmd
            .status()
            .with_context(|| format!("Failed to execute '{}'. Is it installed?", self.program))?;

        if !status.success() {
            bail!(
                "{} (exit code {})",
                self.failure_prefix(),
                status.code().unwrap_or(-1)
            );
        }

        Ok(status)
    }
}

/// Locate a program in PATH.
pub fn which(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}
