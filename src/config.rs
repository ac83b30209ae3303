//! Generator configuration.
//!
//! The built-in defaults describe the Lithium library layout. A JSON manifest
//! passed with `--manifest` replaces any subset of the fields, and a few
//! environment variables (optionally from a `.env` file) override the
//! installer settings:
//!
//! - `SINGLE_HEADERS_REPO_URL` - upstream git repository to clone
//! - `SINGLE_HEADERS_JOBS` - parallel jobs for `make install`

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Default upstream repository cloned when no install dir is given.
pub const DEFAULT_REPO_URL: &str = "https://github.com/matt-42/lithium";

/// A library and the root headers concatenated into its single header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySpec {
    pub name: String,
    /// Paths relative to `<install>/include`, in emission order.
    pub roots: Vec<String>,
}

impl LibrarySpec {
    pub fn new(name: &str, roots: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            roots: roots.iter().map(|r| r.to_string()).collect(),
        }
    }

    /// File name of the generated header.
    pub fn output_file_name(&self) -> String {
        format!("{}.hh", self.name)
    }
}

/// Literal text substitution applied to every inlined source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub from: String,
    #[serde(default)]
    pub to: String,
}

impl RewriteRule {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn apply(&self, line: &str) -> String {
        if self.from.is_empty() {
            return line.to_string();
        }
        line.replace(&self.from, &self.to)
    }
}

/// Headers that need special placement in the emitted include block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformHeaders {
    /// Emitted before every other include (libpq's `postgres.h` must come first).
    pub priority: Vec<String>,
    /// Wrapped in `#if __linux__`.
    pub linux_only: Vec<String>,
    /// Wrapped in `#if __APPLE__`.
    pub apple_only: Vec<String>,
    /// Collected into the `#if defined(_MSC_VER)` block. Matched exactly.
    pub msvc_only: Vec<String>,
}

impl Default for PlatformHeaders {
    fn default() -> Self {
        Self {
            priority: vec!["postgres.h".to_string()],
            linux_only: vec!["sys/epoll.h".to_string()],
            apple_only: vec!["sys/event.h".to_string()],
            msvc_only: vec![
                "ciso646".to_string(),
                "io.h".to_string(),
                "windows.h".to_string(),
            ],
        }
    }
}

/// Attribution written at the top of every generated header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Banner {
    pub author: String,
    pub url: String,
}

impl Default for Banner {
    fn default() -> Self {
        Self {
            author: "Matthieu Garrigues matthieu.garrigues@gmail.com".to_string(),
            url: DEFAULT_REPO_URL.to_string(),
        }
    }
}

/// Full generator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub repo_url: String,
    pub jobs: u32,
    /// Include targets starting with this prefix are inlined.
    pub local_prefix: String,
    pub guard_prefix: String,
    pub banner: Banner,
    pub rewrites: Vec<RewriteRule>,
    pub platform: PlatformHeaders,
    pub libraries: Vec<LibrarySpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo_url: DEFAULT_REPO_URL.to_string(),
            jobs: 4,
            local_prefix: "li/".to_string(),
            guard_prefix: "LITHIUM_SINGLE_HEADER_GUARD_".to_string(),
            banner: Banner::default(),
            rewrites: vec![
                RewriteRule::new("lithium_symbol.hh", "li/symbol/symbol.hh"),
                RewriteRule::new("// Generated by the lithium symbol generator.", ""),
            ],
            platform: PlatformHeaders::default(),
            libraries: default_libraries(),
        }
    }
}

fn default_libraries() -> Vec<LibrarySpec> {
    vec![
        LibrarySpec::new("lithium_metamap", &["li/metamap/metamap.hh"]),
        LibrarySpec::new("lithium_symbol", &["li/symbol/symbol.hh"]),
        LibrarySpec::new("lithium_json", &["li/json/json.hh"]),
        LibrarySpec::new("lithium_http_client", &["li/http_client/http_client.hh"]),
        LibrarySpec::new("lithium_http_backend", &["li/http_backend/http_backend.hh"]),
        LibrarySpec::new("lithium_mysql", &["li/sql/mysql.hh", "li/sql/sql_orm.hh"]),
        LibrarySpec::new("lithium_sqlite", &["li/sql/sqlite.hh", "li/sql/sql_orm.hh"]),
        LibrarySpec::new("lithium_pgsql", &["li/sql/pgsql.hh", "li/sql/sql_orm.hh"]),
        LibrarySpec::new(
            "lithium",
            &[
                "li/sql/sqlite.hh",
                "li/http_client/http_client.hh",
                "li/sql/sql_orm.hh",
                "li/sql/mysql.hh",
                "li/sql/pgsql.hh",
                "li/http_backend/http_backend.hh",
            ],
        ),
    ]
}

impl Config {
    /// Load configuration: built-in defaults or the given manifest, then
    /// environment overrides.
    pub fn load(manifest: Option<&Path>) -> Result<Self> {
        let mut config = match manifest {
            Some(path) => Self::from_manifest(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON manifest. Missing fields keep their defaults.
    pub fn from_manifest(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid manifest {}: {}", path.display(), e)))
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = env::var("SINGLE_HEADERS_REPO_URL") {
            if !url.trim().is_empty() {
                self.repo_url = url.trim().to_string();
            }
        }
        if let Ok(jobs) = env::var("SINGLE_HEADERS_JOBS") {
            self.jobs = jobs.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "SINGLE_HEADERS_JOBS must be a positive integer, got '{}'",
                    jobs
                ))
            })?;
        }
        Ok(())
    }

    /// Reject manifests that would produce colliding or empty outputs.
    pub fn validate(&self) -> Result<()> {
        if self.jobs == 0 {
            return Err(Error::Config("jobs must be at least 1".to_string()));
        }
        if self.local_prefix.is_empty() {
            return Err(Error::Config("local_prefix must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for lib in &self.libraries {
            if lib.name.is_empty() || lib.name.contains(['/', '\\']) {
                return Err(Error::Config(format!(
                    "invalid library name '{}'",
                    lib.name
                )));
            }
            if !seen.insert(lib.name.as_str()) {
                return Err(Error::Config(format!(
                    "library '{}' is listed twice",
                    lib.name
                )));
            }
            if lib.roots.is_empty() {
                return Err(Error::Config(format!(
                    "library '{}' has no root headers",
                    lib.name
                )));
            }
        }
        Ok(())
    }

    /// Apply every rewrite rule to a line, in order.
    pub fn rewrite(&self, line: &str) -> String {
        self.rewrites
            .iter()
            .fold(line.to_string(), |acc, rule| rule.apply(&acc))
    }
}
