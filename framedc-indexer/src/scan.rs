//! The incremental scan engine.
//!
//! One call walks one root. Before any directory is listed — the root
//! included — its freshly sampled mtime is compared against the hot map;
//! a directory whose mtime has not advanced past its recorded value is
//! pruned outright, files and subtree both. The mtime is sampled *before*
//! the listing so a write racing the scan bumps the directory past the
//! recorded value and forces a revisit next run instead of being missed
//! forever.
//!
//! Listing failures (permissions, transient I/O) are logged and skipped;
//! the directory's previously indexed fragment stays in the store
//! untouched. Only the caller's own surfaces (IPC file, store publication)
//! can fail a scan.

use crate::error::Result;
use crate::fs::{EntryKind, ScanFs};
use framedc_cache::{HotMap, KeyedStore};
use framedc_core::{Fragment, FrameName};
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};

/// Everything one scan pass over one root produced.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Directories that yielded frame files this pass, with their
    /// freshly built fragments. Wholesale replacements for whatever the
    /// store previously held under the same key.
    pub fragments: BTreeMap<String, Fragment>,
    /// Hot entries recorded this pass: fragment-bearing directories and
    /// empty directories, at the mtime sampled before their listing.
    pub hot: HotMap,
    /// Directories whose mtime or listing failed (logged, not fatal).
    pub errors: u64,
}

/// Map a directory path to its store/hot key.
///
/// Store keys are strings by contract; non-UTF-8 path bytes degrade
/// through `to_string_lossy`.
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Walk `root`, pruning hot directories, and accumulate fragments.
///
/// `hot` is the prior run's view; recorded entries come back in the
/// outcome rather than mutating it, so workers can ship exactly the delta.
pub fn scan_root(fs: &dyn ScanFs, root: &Path, hot: &HotMap) -> ScanOutcome {
    let mut out = ScanOutcome::default();
    let mut queue: VecDeque<PathBuf> = VecDeque::new();
    queue.push_back(root.to_path_buf());

    while let Some(dir) = queue.pop_front() {
        let key = path_key(&dir);

        // Sample first: this mtime is both the hot check and, if the
        // directory ends up fully indexed, the recorded watermark.
        let mtime = match fs.mtime(&dir) {
            Ok(mtime) => mtime,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "cannot stat directory; skipping");
                out.errors += 1;
                continue;
            }
        };

        if let Some(&recorded) = hot.get(&key) {
            if mtime <= recorded {
                tracing::trace!(dir = %dir.display(), "hot; pruned");
                continue;
            }
        }

        let entries = match fs.read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "cannot list directory; skipping");
                out.errors += 1;
                continue;
            }
        };

        let mut fragment = Fragment::new();
        let empty = entries.is_empty();
        for entry in &entries {
            match entry.kind {
                EntryKind::Dir => queue.push_back(dir.join(&entry.name)),
                EntryKind::File => {
                    if let Some(name) = entry.name.to_str() {
                        if let Some(frame) = FrameName::parse(name) {
                            fragment.insert(&frame);
                        }
                    }
                }
                EntryKind::Other => {}
            }
        }

        if !fragment.is_empty() {
            out.hot.insert(key.clone(), mtime);
            out.fragments.insert(key, fragment);
        } else if empty {
            // An empty directory is fully indexed too; remembering it
            // saves the listing next run.
            out.hot.insert(key, mtime);
        }
    }

    tracing::debug!(
        root = %root.display(),
        fragments = out.fragments.len(),
        hot = out.hot.len(),
        errors = out.errors,
        "scan complete"
    );
    out
}

/// Fold a scan outcome's fragments into a store as encoded bytes.
///
/// Works identically for the master's file-backed store and a worker's
/// in-memory one.
pub fn apply_outcome(store: &mut dyn KeyedStore, outcome: &ScanOutcome) -> Result<()> {
    for (dir, fragment) in &outcome.fragments {
        store.put(dir, fragment.to_bytes()?);
    }
    Ok(())
}
