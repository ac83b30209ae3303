//! Change-gated output writing.
//!
//! Generated headers are build inputs for downstream projects. Rewriting an
//! identical file bumps its mtime and triggers a rebuild, so content is
//! compared first and the file is only replaced when it differs.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// What [`write_if_changed`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

/// Returns true if `path` already holds exactly `content`.
pub fn is_up_to_date(path: &Path, content: &[u8]) -> Result<bool> {
    match fs::read(path) {
        Ok(existing) => Ok(existing == content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Mode given to headers that did not exist before.
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o644;

/// Permissions the replacement file must carry.
///
/// Temporary files are created 0600; an existing output keeps its mode and a
/// new one gets [`NEW_FILE_MODE`].
fn output_permissions(path: &Path) -> Option<fs::Permissions> {
    if let Ok(meta) = fs::metadata(path) {
        return Some(meta.permissions());
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Some(fs::Permissions::from_mode(NEW_FILE_MODE))
    }
    #[cfg(not(unix))]
    None
}

/// Write `content` to `path` unless the file already holds it.
///
/// Parent directories are created as needed. The new content goes to a
/// temporary file in the same directory which is then renamed over `path`.
pub fn write_if_changed<C: AsRef<[u8]>>(path: &Path, content: C) -> Result<WriteOutcome> {
    let content = content.as_ref();
    if is_up_to_date(path, content)? {
        return Ok(WriteOutcome::Unchanged);
    }

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| Error::io(parent, e))?;
    tmp.write_all(content).map_err(|e| Error::io(tmp.path(), e))?;
    if let Some(permissions) = output_permissions(path) {
        tmp.as_file()
            .set_permissions(permissions)
            .map_err(|e| Error::io(tmp.path(), e))?;
    }
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;

    Ok(WriteOutcome::Written)
}
