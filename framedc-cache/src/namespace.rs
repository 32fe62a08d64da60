//! The namespace file: run header plus the hot-directory map.
//!
//! The namespace path `N` is the user-chosen base under which all
//! persistent cache files live; `N.shlv` and `N.lock` are derived from it
//! here so the naming convention has exactly one home.

use crate::error::{CacheError, Result};
use crate::publish::publish;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Directory path → mtime (integral seconds) sampled when the directory
/// was last fully indexed or observed empty.
///
/// A directory is "hot" iff it is present here and its current mtime is
/// still `<=` the recorded value; hot directories are pruned from the walk.
pub type HotMap = BTreeMap<String, i64>;

/// Process-wide run metadata persisted alongside the hot map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    /// Version of the indexer that wrote this namespace.
    pub version: String,
    /// True until the first run completes against this namespace.
    pub initial_run: bool,
    /// Wall-clock time the last run finished.
    pub last_run: Option<DateTime<Utc>>,
    /// Seconds spent walking roots and aggregating fragments.
    pub scan_secs: f64,
    /// Seconds spent emitting the output protocol (0 when none requested).
    pub write_secs: f64,
    /// Seconds spent publishing the index store and namespace.
    pub close_secs: f64,
    /// Number of directory keys in the index store.
    pub dir_count: u64,
    /// Size of the published index store image, in bytes.
    pub index_bytes: u64,
}

impl Header {
    fn bootstrap() -> Header {
        Header {
            version: env!("CARGO_PKG_VERSION").to_string(),
            initial_run: true,
            last_run: None,
            scan_secs: 0.0,
            write_secs: 0.0,
            close_secs: 0.0,
            dir_count: 0,
            index_bytes: 0,
        }
    }
}

/// In-memory form of the namespace file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Namespace {
    pub header: Header,
    pub hot: HotMap,
}

impl Namespace {
    /// Path of the index store that belongs to namespace `path`.
    pub fn store_path(path: &Path) -> PathBuf {
        append_suffix(path, ".shlv")
    }

    /// Path of the lock file that belongs to namespace `path`.
    pub fn lock_path(path: &Path) -> PathBuf {
        append_suffix(path, ".lock")
    }

    /// Master-side open: read the namespace, or bootstrap and publish a
    /// fresh one (`initial_run = true`, empty hot map) if it is absent, so
    /// every later read succeeds.
    pub fn load_or_init(path: &Path, mode: u32) -> Result<Namespace> {
        match Self::read(path)? {
            Some(ns) => Ok(ns),
            None => {
                let ns = Namespace {
                    header: Header::bootstrap(),
                    hot: HotMap::new(),
                };
                ns.save(path, mode)?;
                tracing::info!(namespace = %path.display(), "bootstrapped new namespace");
                Ok(ns)
            }
        }
    }

    /// Worker-side open: read-only, and an absent file is simply an empty
    /// hot map — workers never create or mutate the namespace.
    pub fn load_readonly(path: &Path) -> Result<Namespace> {
        Ok(Self::read(path)?.unwrap_or(Namespace {
            header: Header::bootstrap(),
            hot: HotMap::new(),
        }))
    }

    /// Strict open for status queries: an absent namespace is an error.
    pub fn load_existing(path: &Path) -> Result<Namespace> {
        Self::read(path)?.ok_or_else(|| CacheError::NamespaceMissing(path.to_path_buf()))
    }

    fn read(path: &Path) -> Result<Option<Namespace>> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::io(path, e)),
        }
    }

    /// Publish the namespace file atomically.
    pub fn save(&self, path: &Path, mode: u32) -> Result<()> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        publish(path, &bytes, mode)
    }
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_paths_derive_from_namespace() {
        let ns = Path::new("/var/cache/frames.dc");
        assert_eq!(
            Namespace::store_path(ns),
            PathBuf::from("/var/cache/frames.dc.shlv")
        );
        assert_eq!(
            Namespace::lock_path(ns),
            PathBuf::from("/var/cache/frames.dc.lock")
        );
    }

    #[test]
    fn load_or_init_bootstraps_and_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ns");

        let ns = Namespace::load_or_init(&path, 0o644).expect("bootstrap");
        assert!(ns.header.initial_run);
        assert!(ns.hot.is_empty());
        assert!(path.exists());

        // A later strict read must succeed.
        let again = Namespace::load_existing(&path).expect("reload");
        assert!(again.header.initial_run);
    }

    #[test]
    fn save_then_load_roundtrips_hot_map() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ns");

        let mut ns = Namespace::load_or_init(&path, 0o644).expect("bootstrap");
        ns.hot.insert("/data/run1".to_string(), 1_700_000_000);
        ns.header.initial_run = false;
        ns.header.dir_count = 1;
        ns.save(&path, 0o644).expect("save");

        let back = Namespace::load_existing(&path).expect("load");
        assert_eq!(back.hot.get("/data/run1"), Some(&1_700_000_000));
        assert!(!back.header.initial_run);
        assert_eq!(back.header.dir_count, 1);
    }

    #[test]
    fn load_readonly_tolerates_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ns");

        let ns = Namespace::load_readonly(&path).expect("readonly");
        assert!(ns.hot.is_empty());
        // And it must not create the file.
        assert!(!path.exists());
    }

    #[test]
    fn load_existing_errors_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ns");
        match Namespace::load_existing(&path) {
            Err(CacheError::NamespaceMissing(p)) => assert_eq!(p, path),
            other => panic!("expected NamespaceMissing, got {other:?}"),
        }
    }
}
