//! Atomic file publication: write-to-temp, flush, chmod, rename.
//!
//! The temp file is created in the destination's directory so the final
//! rename never crosses a filesystem boundary. If anything fails between
//! write and rename, the temp file is removed and the destination keeps
//! its previous bytes.

use crate::error::{CacheError, Result};
use std::io::Write;
use std::path::Path;

/// Atomically replace `dest` with `bytes`, applying `mode` (octal file
/// permission bits) to the published file.
pub fn publish(dest: &Path, bytes: &[u8], mode: u32) -> Result<()> {
    let dir = match dest.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".framedc-publish.")
        .tempfile_in(dir)
        .map_err(|e| CacheError::io(dir, e))?;

    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| CacheError::io(tmp.path(), e))?;

    set_mode(tmp.path(), tmp.as_file(), mode)?;

    // NamedTempFile::persist renames within `dir`; on failure the temp
    // handle comes back and its drop unlinks the file.
    tmp.persist(dest)
        .map_err(|e| CacheError::io(dest, e.error))?;

    tracing::debug!(dest = %dest.display(), bytes = bytes.len(), "published");
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, file: &std::fs::File, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(mode))
        .map_err(|e| CacheError::io(path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _file: &std::fs::File, _mode: u32) -> Result<()> {
    Ok(())
}
