//! Include partitioning and single-header rendering.

use std::collections::BTreeSet;
use std::path::Path;

use crate::classify::system_include;
use crate::config::{Config, LibrarySpec, PlatformHeaders};
use crate::error::Result;
use crate::inline::{Fragment, Inliner, OutputBuffer};

/// Inlined output split into hoisted includes and body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Partition {
    /// System include lines, deduplicated and sorted.
    pub includes: BTreeSet<String>,
    /// Includes of MSVC-only headers, emitted under `_MSC_VER`.
    pub msvc_includes: BTreeSet<String>,
    /// Everything else, in encounter order.
    pub body: String,
}

/// Split an inlined buffer into system includes and body.
///
/// Only lines copied from source files are considered; generated guards and
/// markers always stay in the body.
pub fn partition(buffer: &OutputBuffer, platform: &PlatformHeaders) -> Partition {
    let mut result = Partition::default();

    for fragment in buffer.fragments() {
        match fragment {
            Fragment::Source(line) => match system_include(line) {
                Some(target) if platform.msvc_only.iter().any(|h| h == target) => {
                    result.msvc_includes.insert(line.clone());
                }
                Some(_) => {
                    result.includes.insert(line.clone());
                }
                None => result.body.push_str(line),
            },
            Fragment::Generated(text) => result.body.push_str(text),
        }
    }

    result
}

/// Wrap an include line in a platform conditional when it names a
/// platform-specific header.
pub fn include_directive(line: &str, platform: &PlatformHeaders) -> String {
    if platform.linux_only.iter().any(|h| line.contains(h.as_str())) {
        return format!("#if __linux__\n{}#endif\n", line);
    }
    if platform.apple_only.iter().any(|h| line.contains(h.as_str())) {
        return format!("#if __APPLE__\n{}#endif\n", line);
    }
    line.to_string()
}

/// Render the final header text for a library.
pub fn render(library: &str, partition: &Partition, config: &Config) -> String {
    let platform = &config.platform;
    let mut out = String::new();

    out.push_str(&format!("// Author: {}\n//\n", config.banner.author));
    out.push_str(&format!("// Single header version the {} library.\n", library));
    out.push_str(&format!("// {}\n", config.banner.url));
    out.push_str("//\n");
    out.push_str("// This file is generated do not edit it.\n\n");
    out.push_str("#pragma once\n\n");

    let is_priority = |line: &str| platform.priority.iter().any(|h| line.contains(h.as_str()));
    for line in partition.includes.iter().filter(|l| is_priority(l.as_str())) {
        out.push_str(&include_directive(line, platform));
    }
    for line in partition.includes.iter().filter(|l| !is_priority(l.as_str())) {
        out.push_str(&include_directive(line, platform));
    }

    if !partition.msvc_includes.is_empty() {
        out.push_str("\n#if defined(_MSC_VER)\n");
        for line in &partition.msvc_includes {
            out.push_str(line);
        }
        out.push_str("#endif // _MSC_VER\n");
    }

    out.push_str("\n\n");
    out.push_str(&partition.body);
    out
}

/// Inline every root of `library` and render its single header.
pub fn amalgamate(
    config: &Config,
    include_dir: &Path,
    library: &LibrarySpec,
    line_markers: bool,
) -> Result<String> {
    let mut inliner = Inliner::new(config, include_dir, &library.name).line_markers(line_markers);
    for root in &library.roots {
        inliner.inline_root(root)?;
    }
    let buffer = inliner.finish();
    Ok(render(&library.name, &partition(&buffer, &config.platform), config))
}

/// Header that includes the installed roots directly, used when building
/// against an install tree instead of shipping inlined headers.
pub fn render_forwarding(library: &LibrarySpec) -> String {
    let includes: Vec<String> = library
        .roots
        .iter()
        .map(|root| format!("#include <{}>", root))
        .collect();
    includes.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(lines: &[&str]) -> OutputBuffer {
        let mut buffer = OutputBuffer::new();
        buffer.push_generated("#ifndef G\n");
        for line in lines {
            buffer.push_source(*line);
        }
        buffer.push_generated("#endif\n");
        buffer
    }

    #[test]
    fn test_partition_dedup_and_sort() {
        let buf = buffer(&[
            "#include <vector>\n",
            "int a;\n",
            "#include <map>\n",
            "#include <vector>\n",
        ]);
        let part = partition(&buf, &PlatformHeaders::default());

        let includes: Vec<&str> = part.includes.iter().map(String::as_str).collect();
        assert_eq!(includes, vec!["#include <map>\n", "#include <vector>\n"]);
        assert_eq!(part.body, "#ifndef G\nint a;\n#endif\n");
        assert!(part.msvc_includes.is_empty());
    }

    #[test]
    fn test_partition_msvc_headers() {
        let buf = buffer(&["#include <windows.h>\n", "#include <io.h>\n", "#include <stdio.h>\n"]);
        let part = partition(&buf, &PlatformHeaders::default());

        assert_eq!(part.includes.len(), 1);
        assert!(part.includes.contains("#include <stdio.h>\n"));
        let msvc: Vec<&str> = part.msvc_includes.iter().map(String::as_str).collect();
        assert_eq!(msvc, vec!["#include <io.h>\n", "#include <windows.h>\n"]);
    }

    #[test]
    fn test_generated_text_never_hoisted() {
        let mut buf = OutputBuffer::new();
        buf.push_generated("#include <vector>\n");
        let part = partition(&buf, &PlatformHeaders::default());
        assert!(part.includes.is_empty());
        assert_eq!(part.body, "#include <vector>\n");
    }

    #[test]
    fn test_include_directive_wrapping() {
        let platform = PlatformHeaders::default();
        assert_eq!(
            include_directive("#include <sys/epoll.h>\n", &platform),
            "#if __linux__\n#include <sys/epoll.h>\n#endif\n"
        );
        assert_eq!(
            include_directive("#include <sys/event.h>\n", &platform),
            "#if __APPLE__\n#include <sys/event.h>\n#endif\n"
        );
        assert_eq!(
            include_directive("#include <vector>\n", &platform),
            "#include <vector>\n"
        );
    }

    #[test]
    fn test_render_priority_header_first() {
        let buf = buffer(&[
            "#include <vector>\n",
            "#include <algorithm>\n",
            "#include <postgres.h>\n",
        ]);
        let config = Config::default();
        let text = render("lithium_pgsql", &partition(&buf, &config.platform), &config);

        let pg = text.find("#include <postgres.h>").unwrap();
        let algo = text.find("#include <algorithm>").unwrap();
        let vector = text.find("#include <vector>").unwrap();
        assert!(pg < algo && algo < vector);
        assert_eq!(text.matches("#include <postgres.h>").count(), 1);
    }

    #[test]
    fn test_render_layout() {
        let buf = buffer(&["#include <windows.h>\n", "#include <string>\n", "int a;\n"]);
        let config = Config::default();
        let text = render("lithium_json", &partition(&buf, &config.platform), &config);

        let expected = "\
// Author: Matthieu Garrigues matthieu.garrigues@gmail.com
//
// Single header version the lithium_json library.
// https://github.com/matt-42/lithium
//
// This file is generated do not edit it.

#pragma once

#include <string>

#if defined(_MSC_VER)
#include <windows.h>
#endif // _MSC_VER


#ifndef G
int a;
#endif
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_forwarding() {
        let lib = LibrarySpec::new("lithium_mysql", &["li/sql/mysql.hh", "li/sql/sql_orm.hh"]);
        assert_eq!(
            render_forwarding(&lib),
            "#include <li/sql/mysql.hh>\n#include <li/sql/sql_orm.hh>\n"
        );
    }
}
