//! Per-library header generation.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::{Config, LibrarySpec};
use crate::emit;
use crate::timing::Timer;
use crate::writer::{write_if_changed, WriteOutcome};

/// How output headers are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fully inlined single headers, optionally with `#line` markers.
    Amalgamate { line_markers: bool },
    /// Forwarding headers that `#include` the installed roots.
    LineDirectives,
}

/// Outcome for one generated header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub library: String,
    pub path: PathBuf,
    pub outcome: WriteOutcome,
}

/// Render the header content for a single library.
pub fn render_library(
    config: &Config,
    include_dir: &Path,
    library: &LibrarySpec,
    mode: Mode,
) -> Result<String> {
    match mode {
        Mode::Amalgamate { line_markers } => {
            emit::amalgamate(config, include_dir, library, line_markers)
                .with_context(|| format!("Failed to build {}", library.name))
        }
        Mode::LineDirectives => Ok(emit::render_forwarding(library)),
    }
}

/// Generate `{output_dir}/{name}.hh` for every configured library.
///
/// Stops at the first failing library.
pub fn generate_all(
    config: &Config,
    include_dir: &Path,
    output_dir: &Path,
    mode: Mode,
) -> Result<Vec<Generated>> {
    let timer = Timer::start("generate single headers");
    let mut results = Vec::with_capacity(config.libraries.len());

    for library in &config.libraries {
        debug!("Generating {} from {:?}", library.name, library.roots);
        let content = render_library(config, include_dir, library, mode)?;
        let path = output_dir.join(library.output_file_name());
        let outcome = write_if_changed(&path, &content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        match outcome {
            WriteOutcome::Written => info!("Wrote {}", path.display()),
            WriteOutcome::Unchanged => info!("Unchanged {}", path.display()),
        }

        results.push(Generated {
            library: library.name.clone(),
            path,
            outcome,
        });
    }

    timer.finish();
    Ok(results)
}

/// Print a one-line summary of a generation run.
pub fn print_summary(results: &[Generated]) {
    let written = results
        .iter()
        .filter(|r| r.outcome == WriteOutcome::Written)
        .count();
    println!(
        "{} header(s): {} written, {} unchanged",
        results.len(),
        written,
        results.len() - written
    );
}
