//! Preprocessor line classification.
//!
//! The inliner and the include partitioner only care about a handful of
//! directive shapes. Everything else is copied through untouched.

/// Classification of a single source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// `#include <li/...>` - inlined in place.
    LocalInclude(&'a str),
    /// `#include <...>` on a line of its own - hoisted to the top of the output.
    SystemInclude(&'a str),
    /// `#pragma once` - superseded by the generated guard.
    PragmaOnce,
    /// Any other line, copied verbatim.
    Plain,
}

/// Classify a line read from a library file.
///
/// `local_prefix` selects which angle-bracket includes belong to the library
/// being amalgamated. System includes are reported too, but the inliner keeps
/// them as ordinary lines; they are only separated out by [`system_include`]
/// once the whole buffer is assembled.
pub fn classify<'a>(line: &'a str, local_prefix: &str) -> Line<'a> {
    if let Some(target) = local_include(line, local_prefix) {
        return Line::LocalInclude(target);
    }
    if line.starts_with("#pragma once") {
        return Line::PragmaOnce;
    }
    if let Some(target) = system_include(line) {
        return Line::SystemInclude(target);
    }
    Line::Plain
}

/// Match `#include<ws>*<PREFIX...>` at the very start of the line.
///
/// The target runs up to the last `>` on the line, anything after it is
/// ignored (trailing comments and the like).
pub fn local_include<'a>(line: &'a str, local_prefix: &str) -> Option<&'a str> {
    let line = strip_newline(line);
    let rest = line.strip_prefix("#include")?;
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('<')?;
    if !rest.starts_with(local_prefix) {
        return None;
    }
    let end = rest.rfind('>')?;
    Some(&rest[..end])
}

/// Match a line consisting solely of `#include <...>`, optionally indented.
///
/// Exactly one space separates the directive from the bracket, and the line
/// must end with `>`: includes carrying trailing comments stay in the body.
pub fn system_include(line: &str) -> Option<&str> {
    let line = strip_newline(line);
    let rest = line.trim_start().strip_prefix("#include <")?;
    rest.strip_suffix('>')
}

fn strip_newline(line: &str) -> &str {
    line.strip_suffix('\n').unwrap_or(line)
}
