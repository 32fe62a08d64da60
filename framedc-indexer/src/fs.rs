//! Filesystem seam for the scan engine.
//!
//! The scanner only ever needs two primitives — a directory's mtime and
//! its entry listing — so that is the whole trait. The production
//! implementation is a thin wrapper over `std::fs`; tests substitute a
//! mock tree that counts listings, which is how the "hot directories cost
//! zero reads" property gets proved rather than assumed.

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// What kind of child a directory entry is, after resolving symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A real subdirectory: traversed (subject to the hot check).
    Dir,
    /// A regular file (or symlink to one): offered to the name parser.
    File,
    /// Anything else, including symlinked directories — never descended,
    /// so link cycles cannot trap the walk.
    Other,
}

/// One child of a listed directory.
#[derive(Debug, Clone)]
pub struct FsEntry {
    pub name: OsString,
    pub kind: EntryKind,
}

/// The two filesystem observations the scanner makes.
pub trait ScanFs {
    /// Modification time of `path` in integral seconds since the epoch.
    fn mtime(&self, path: &Path) -> io::Result<i64>;

    /// List the children of `path`.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<FsEntry>>;
}

/// Real-filesystem implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl ScanFs for OsFs {
    fn mtime(&self, path: &Path) -> io::Result<i64> {
        let modified = std::fs::metadata(path)?.modified()?;
        let secs = match modified.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as i64,
            // Pre-epoch mtimes exist on badly-set clocks; clamp negative.
            Err(e) => -(e.duration().as_secs() as i64),
        };
        Ok(secs)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<FsEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let kind = if file_type.is_dir() {
                EntryKind::Dir
            } else if file_type.is_file() {
                EntryKind::File
            } else if file_type.is_symlink() {
                // Classify by target, but never treat a symlink as a
                // traversable directory.
                match std::fs::metadata(entry.path()) {
                    Ok(meta) if meta.is_file() => EntryKind::File,
                    _ => EntryKind::Other,
                }
            } else {
                EntryKind::Other
            };
            entries.push(FsEntry {
                name: entry.file_name(),
                kind,
            });
        }
        Ok(entries)
    }
}
