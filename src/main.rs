//! make-single-headers - amalgamate the Lithium libraries into single headers.
//!
//! Usage:
//! - `make-single-headers OUTPUT_DIR` clones and installs Lithium first
//! - `make-single-headers INSTALL_DIR OUTPUT_DIR` uses an existing install
//! - `make-single-headers --with-line-directives INSTALL_DIR OUTPUT_DIR`
//!   writes forwarding headers that include the installed files

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use single_headers::generate::{self, Mode};
use single_headers::install::{self, Installation};
use single_headers::Config;

#[derive(Parser, Debug)]
#[command(name = "make-single-headers")]
#[command(about = "Generate single-header versions of the Lithium libraries")]
#[command(
    after_help = "EXAMPLES:\n  make-single-headers out/                      Clone, install, then generate\n  make-single-headers /opt/lithium out/         Use an existing install prefix\n  make-single-headers --with-line-directives /opt/lithium out/"
)]
struct Cli {
    /// Write headers that #include the installed roots instead of inlining them
    #[arg(long)]
    with_line_directives: bool,

    /// Emit #line markers pointing at the original files
    #[arg(long, conflicts_with = "with_line_directives")]
    line_markers: bool,

    /// JSON manifest overriding the built-in library list and rules
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// [INSTALL_DIR] OUTPUT_DIR
    #[arg(value_name = "DIR", num_args = 1..=2, required = true)]
    dirs: Vec<PathBuf>,
}

/// Where the headers come from and where they go.
#[derive(Debug, PartialEq, Eq)]
enum Invocation {
    SelfInstall { output_dir: PathBuf },
    Prebuilt { install_dir: PathBuf, output_dir: PathBuf },
}

impl Cli {
    fn invocation(&self) -> Result<Invocation> {
        match self.dirs.as_slice() {
            [output_dir] if !self.with_line_directives => Ok(Invocation::SelfInstall {
                output_dir: output_dir.clone(),
            }),
            [_] => bail!("--with-line-directives requires INSTALL_DIR and OUTPUT_DIR"),
            [install_dir, output_dir] => Ok(Invocation::Prebuilt {
                install_dir: install_dir.clone(),
                output_dir: output_dir.clone(),
            }),
            _ => bail!("expected [INSTALL_DIR] OUTPUT_DIR"),
        }
    }

    fn mode(&self) -> Mode {
        if self.with_line_directives {
            Mode::LineDirectives
        } else {
            Mode::Amalgamate {
                line_markers: self.line_markers,
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env if present
    dotenvy::dotenv().ok();
    init_logging(cli.verbose);

    let config = Config::load(cli.manifest.as_deref())?;
    let invocation = cli.invocation()?;

    let (installation, output_dir) = match invocation {
        Invocation::SelfInstall { output_dir } => (install::install_library(&config)?, output_dir),
        Invocation::Prebuilt {
            install_dir,
            output_dir,
        } => (Installation::existing(install_dir)?, output_dir),
    };

    info!("Reading headers from {}", installation.prefix().display());
    let results = generate::generate_all(
        &config,
        &installation.include_dir(),
        &output_dir,
        cli.mode(),
    )?;
    generate::print_summary(&results);

    Ok(())
}
