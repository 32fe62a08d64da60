//! Presence-based single-writer lock.
//!
//! The lock is a marker file, not an OS file lock: a stale lock left by a
//! crashed master stays visible until an operator removes it, which is the
//! intended diagnosis path. Acquisition fails fast — there is no waiting
//! and no force option.

use crate::error::{CacheError, Result};
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Holds the namespace lock for the lifetime of one master invocation.
///
/// Release is idempotent and also runs on drop, so the lock disappears on
/// every exit path that unwinds.
#[derive(Debug)]
pub struct LockFile {
    path: PathBuf,
    released: bool,
}

impl LockFile {
    /// Create the lock file, failing with [`CacheError::LockHeld`] if it
    /// already exists.
    pub fn acquire(path: &Path) -> Result<LockFile> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(_) => {
                tracing::debug!(lock = %path.display(), "acquired namespace lock");
                Ok(LockFile {
                    path: path.to_path_buf(),
                    released: false,
                })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(CacheError::LockHeld(path.to_path_buf()))
            }
            Err(e) => Err(CacheError::io(path, e)),
        }
    }

    /// Remove the lock file. Safe to call more than once; tolerates a
    /// lock that is already gone.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(lock = %self.path.display(), "released namespace lock"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(lock = %self.path.display(), error = %e, "failed to remove lock file");
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_with_lock_held() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ns.lock");

        let _held = LockFile::acquire(&path).expect("first acquire");
        match LockFile::acquire(&path) {
            Err(CacheError::LockHeld(p)) => assert_eq!(p, path),
            other => panic!("expected LockHeld, got {other:?}"),
        }
        // The loser must leave the winner's lock in place.
        assert!(path.exists());
    }

    #[test]
    fn drop_removes_lock() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ns.lock");
        {
            let _held = LockFile::acquire(&path).expect("acquire");
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn release_is_idempotent_and_tolerates_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ns.lock");

        let mut held = LockFile::acquire(&path).expect("acquire");
        std::fs::remove_file(&path).expect("steal the lock file");
        held.release();
        held.release();
        assert!(!path.exists());
    }
}
