//! Recursive inlining of local includes.
//!
//! Every inlined file is wrapped in a guard derived from its install path, so
//! a header reached through several roots is emitted once and stays a no-op
//! if the preprocessor ever sees it twice.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::classify::{classify, Line};
use crate::config::Config;
use crate::error::{Error, Result};

/// A piece of text accumulated during inlining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// A line copied from a library file (newline included). Candidates for
    /// include hoisting.
    Source(String),
    /// Guards and `#line` markers. Always part of the body.
    Generated(String),
}

impl Fragment {
    pub fn text(&self) -> &str {
        match self {
            Fragment::Source(s) | Fragment::Generated(s) => s,
        }
    }
}

/// Ordered output of an inlining pass.
#[derive(Debug, Default, Clone)]
pub struct OutputBuffer {
    fragments: Vec<Fragment>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_source(&mut self, line: impl Into<String>) {
        self.fragments.push(Fragment::Source(line.into()));
    }

    pub fn push_generated(&mut self, text: impl Into<String>) {
        self.fragments.push(Fragment::Generated(text.into()));
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Concatenate every fragment, in order.
    pub fn to_text(&self) -> String {
        self.fragments.iter().map(Fragment::text).collect()
    }
}

/// Derive the guard macro for an installed header.
///
/// The guard is built from the path suffix starting at the last
/// `include/<local_prefix>` segment: `/usr/include/li/json/json.hh` becomes
/// `<guard_prefix>LI_JSON_JSON_HH`.
pub fn header_guard(path: &Path, guard_prefix: &str, local_prefix: &str) -> Result<String> {
    let path_str = path.to_string_lossy().replace('\\', "/");
    let anchor = format!("include/{}", local_prefix);

    let suffix = path_str
        .rmatch_indices(&anchor)
        .map(|(idx, _)| &path_str[idx + "include/".len()..])
        .find(|rest| rest.len() > local_prefix.len())
        .ok_or_else(|| Error::MalformedGuardPath {
            path: path.to_path_buf(),
            prefix: local_prefix.to_string(),
        })?;

    let mangled: String = suffix
        .to_uppercase()
        .chars()
        .map(|c| if c == '/' || c == '.' { '_' } else { c })
        .collect();

    Ok(format!("{}{}", guard_prefix, mangled))
}

/// Convert CRLF and lone CR line endings to LF.
fn normalize_newlines(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

/// Accumulator for one library's inlining pass.
///
/// Holds the set of files already emitted and the output built so far. Each
/// root header of the library is fed through [`Inliner::inline_root`]; the
/// buffer is then taken with [`Inliner::finish`].
pub struct Inliner<'a> {
    config: &'a Config,
    include_dir: PathBuf,
    library: String,
    line_markers: bool,
    processed: HashSet<PathBuf>,
    buffer: OutputBuffer,
}

impl<'a> Inliner<'a> {
    /// Create an inliner resolving local includes against `include_dir`.
    pub fn new(config: &'a Config, include_dir: impl Into<PathBuf>, library: &str) -> Self {
        Self {
            config,
            include_dir: include_dir.into(),
            library: library.to_string(),
            line_markers: false,
            processed: HashSet::new(),
            buffer: OutputBuffer::new(),
        }
    }

    /// Emit `#line` markers pointing back at the original files.
    pub fn line_markers(mut self, enabled: bool) -> Self {
        self.line_markers = enabled;
        self
    }

    /// Inline a header given relative to the include directory.
    pub fn inline_root(&mut self, relative: &str) -> Result<()> {
        let path = self.include_dir.join(relative);
        self.inline_file(&path)
    }

    /// Inline a file and, recursively, every local include it contains.
    ///
    /// Files already processed are skipped silently.
    pub fn inline_file(&mut self, path: &Path) -> Result<()> {
        if !self.processed.insert(path.to_path_buf()) {
            debug!("Already inlined: {}", path.display());
            return Ok(());
        }

        if !path.is_file() {
            return Err(Error::MissingFile {
                path: path.to_path_buf(),
                library: self.library.clone(),
            });
        }

        let guard = header_guard(path, &self.config.guard_prefix, &self.config.local_prefix)?;
        let content = normalize_newlines(
            &fs::read_to_string(path).map_err(|e| Error::io(path, e))?,
        );
        debug!("Inlining {} ({})", path.display(), guard);

        self.buffer.push_generated(format!("#ifndef {}\n", guard));
        self.buffer.push_generated(format!("#define {}\n", guard));

        let mut contiguous = false;
        for (index, raw) in content.split_inclusive('\n').enumerate() {
            let line = self.config.rewrite(raw);

            match classify(&line, &self.config.local_prefix) {
                Line::LocalInclude(target) => {
                    let target = self.include_dir.join(target);
                    self.inline_file(&target)?;
                    contiguous = false;
                }
                Line::PragmaOnce => {
                    contiguous = false;
                }
                Line::SystemInclude(_) | Line::Plain => {
                    if self.line_markers && !contiguous {
                        self.buffer.push_generated(format!(
                            "#line {} \"{}\"\n",
                            index + 1,
                            path.display()
                        ));
                    }
                    self.buffer.push_source(line.as_str());
                    contiguous = true;
                }
            }
        }

        self.buffer.push_generated(format!("\n#endif // {}\n\n", guard));
        Ok(())
    }

    /// Files processed so far.
    pub fn processed(&self) -> &HashSet<PathBuf> {
        &self.processed
    }

    /// Consume the inliner, returning the accumulated output.
    pub fn finish(self) -> OutputBuffer {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Tree {
        _temp: TempDir,
        include: PathBuf,
    }

    impl Tree {
        fn new(files: &[(&str, &str)]) -> Self {
            let temp = TempDir::new().unwrap();
            let include = temp.path().join("install/include");
            for (rel, content) in files {
                let path = include.join(rel);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, content).unwrap();
            }
            Self {
                _temp: temp,
                include,
            }
        }
    }

    #[test]
    fn test_header_guard() {
        let guard = header_guard(
            Path::new("/tmp/x/install/include/li/json/json.hh"),
            "LITHIUM_SINGLE_HEADER_GUARD_",
            "li/",
        )
        .unwrap();
        assert_eq!(guard, "LITHIUM_SINGLE_HEADER_GUARD_LI_JSON_JSON_HH");
    }

    #[test]
    fn test_header_guard_uses_last_segment() {
        let guard = header_guard(
            Path::new("/include/li/old/include/li/sql/sql_orm.hh"),
            "G_",
            "li/",
        )
        .unwrap();
        assert_eq!(guard, "G_LI_SQL_SQL_ORM_HH");
    }

    #[test]
    fn test_header_guard_malformed() {
        let err = header_guard(Path::new("/usr/share/li/a.hh"), "G_", "li/").unwrap_err();
        assert!(matches!(err, Error::MalformedGuardPath { .. }));

        // Needs at least one character after the prefix.
        assert!(header_guard(Path::new("/x/include/li/"), "G_", "li/").is_err());
    }

    #[test]
    fn test_inline_single_file() {
        let tree = Tree::new(&[("li/b.hh", "#pragma once\nint x;\n")]);
        let config = Config::default();

        let mut inliner = Inliner::new(&config, &tree.include, "lib");
        inliner.inline_root("li/b.hh").unwrap();
        let text = inliner.finish().to_text();

        let guard = "LITHIUM_SINGLE_HEADER_GUARD_LI_B_HH";
        assert_eq!(
            text,
            format!("#ifndef {g}\n#define {g}\nint x;\n\n#endif // {g}\n\n", g = guard)
        );
    }

    #[test]
    fn test_inline_nested_and_repeated() {
        let tree = Tree::new(&[
            ("li/a.hh", "#include <li/b.hh>\n#include <li/b.hh>\nint a;\n"),
            ("li/b.hh", "#pragma once\nint x;\n"),
        ]);
        let config = Config::default();

        let mut inliner = Inliner::new(&config, &tree.include, "lib");
        inliner.inline_root("li/a.hh").unwrap();
        inliner.inline_root("li/b.hh").unwrap();
        assert_eq!(inliner.processed().len(), 2);

        let text = inliner.finish().to_text();
        assert_eq!(text.matches("int x;").count(), 1);
        assert!(!text.contains("#pragma once"));
        // b.hh is emitted where a.hh included it.
        assert!(text.find("int x;").unwrap() < text.find("int a;").unwrap());
    }

    #[test]
    fn test_inline_cycle() {
        let tree = Tree::new(&[
            ("li/a.hh", "#include <li/b.hh>\nint a;\n"),
            ("li/b.hh", "#include <li/a.hh>\nint b;\n"),
        ]);
        let config = Config::default();

        let mut inliner = Inliner::new(&config, &tree.include, "lib");
        inliner.inline_root("li/a.hh").unwrap();
        let text = inliner.finish().to_text();
        assert_eq!(text.matches("int a;").count(), 1);
        assert_eq!(text.matches("int b;").count(), 1);
    }

    #[test]
    fn test_inline_missing_file() {
        let tree = Tree::new(&[("li/a.hh", "#include <li/missing.hh>\n")]);
        let config = Config::default();

        let mut inliner = Inliner::new(&config, &tree.include, "lithium_json");
        let err = inliner.inline_root("li/a.hh").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("missing.hh"));
        assert!(msg.contains("lithium_json"));
    }

    #[test]
    fn test_inline_applies_rewrites() {
        let tree = Tree::new(&[
            (
                "li/a.hh",
                "// Generated by the lithium symbol generator.\n#include <lithium_symbol.hh>\n",
            ),
            ("li/symbol/symbol.hh", "int sym;\n"),
        ]);
        let config = Config::default();

        let mut inliner = Inliner::new(&config, &tree.include, "lib");
        inliner.inline_root("li/a.hh").unwrap();
        let text = inliner.finish().to_text();
        assert!(text.contains("int sym;"));
        assert!(!text.contains("lithium symbol generator"));
        assert!(!text.contains("lithium_symbol.hh"));
    }

    #[test]
    fn test_inline_line_markers() {
        let tree = Tree::new(&[
            ("li/a.hh", "#pragma once\nint a;\n#include <li/b.hh>\nint c;\n"),
            ("li/b.hh", "int b;\n"),
        ]);
        let config = Config::default();

        let mut inliner = Inliner::new(&config, &tree.include, "lib").line_markers(true);
        inliner.inline_root("li/a.hh").unwrap();
        let text = inliner.finish().to_text();

        let a = tree.include.join("li/a.hh");
        let b = tree.include.join("li/b.hh");
        assert!(text.contains(&format!("#line 2 \"{}\"\nint a;", a.display())));
        assert!(text.contains(&format!("#line 1 \"{}\"\nint b;", b.display())));
        assert!(text.contains(&format!("#line 4 \"{}\"\nint c;", a.display())));
    }

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(normalize_newlines("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn test_inline_crlf_source() {
        let tree = Tree::new(&[
            ("li/a.hh", "#pragma once\r\n#include <li/b.hh>\r\nint a;\r\n"),
            ("li/b.hh", "int b;\r\n"),
        ]);
        let config = Config::default();

        let mut inliner = Inliner::new(&config, &tree.include, "lib");
        inliner.inline_root("li/a.hh").unwrap();
        let text = inliner.finish().to_text();
        assert!(!text.contains('\r'));
        assert!(!text.contains("#pragma once"));
        assert!(text.contains("int b;\n"));
    }

    #[test]
    fn test_system_includes_are_source_fragments() {
        let tree = Tree::new(&[("li/a.hh", "#include <vector>\n")]);
        let config = Config::default();

        let mut inliner = Inliner::new(&config, &tree.include, "lib");
        inliner.inline_root("li/a.hh").unwrap();
        let buffer = inliner.finish();
        assert!(buffer
            .fragments()
            .contains(&Fragment::Source("#include <vector>\n".to_string())));
    }
}
