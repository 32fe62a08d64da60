//! String-keyed stores for directory fragments.
//!
//! The index store maps a directory path to the opaque bytes of its
//! fragment. The master holds the persistent, file-backed implementation;
//! workers hold the in-memory one and ship its contents through their IPC
//! file. Both sides of the pipeline program against [`KeyedStore`] so the
//! scan and emit code never knows which one it is feeding.

use crate::error::{CacheError, Result};
use crate::publish::publish;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Store image format version. Bump when the on-disk layout changes.
const STORE_VERSION: u32 = 1;

/// A string-keyed map with opaque byte values.
///
/// Keys are directory paths; values are encoded fragments the store never
/// inspects. Iteration order is sorted so everything derived from a store
/// walk is deterministic.
pub trait KeyedStore {
    fn get(&self, key: &str) -> Option<&[u8]>;

    /// Insert or overwrite one key.
    fn put(&mut self, key: &str, value: Vec<u8>);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate entries in sorted key order.
    fn iter(&self) -> Box<dyn Iterator<Item = (&str, &[u8])> + '_>;
}

/// On-disk image of the file-backed store.
#[derive(Serialize, Deserialize)]
struct StoreImage {
    version: u32,
    entries: BTreeMap<String, Vec<u8>>,
}

/// Master-side persistent store backing `NAMESPACE.shlv`.
///
/// The image loads wholesale at open and republishes atomically at
/// [`FileStore::close`]; between the two, mutation is pure in-memory and
/// concurrent readers of the previous image are undisturbed.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, Vec<u8>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; a
    /// present file must carry the current format version.
    pub fn open(path: &Path) -> Result<FileStore> {
        let entries = match std::fs::read(path) {
            Ok(bytes) => {
                let image: StoreImage = postcard::from_bytes(&bytes)?;
                if image.version != STORE_VERSION {
                    return Err(CacheError::StoreVersion {
                        path: path.to_path_buf(),
                        found: image.version,
                        expected: STORE_VERSION,
                    });
                }
                image.entries
            }
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(CacheError::io(path, e)),
        };
        Ok(FileStore {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Publish the current image atomically and return its size in bytes.
    pub fn close(self, mode: u32) -> Result<u64> {
        let image = StoreImage {
            version: STORE_VERSION,
            entries: self.entries,
        };
        let bytes = postcard::to_allocvec(&image)?;
        publish(&self.path, &bytes, mode)?;
        Ok(bytes.len() as u64)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyedStore for FileStore {
    fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    fn put(&mut self, key: &str, value: Vec<u8>) {
        self.entries.insert(key.to_string(), value);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&str, &[u8])> + '_> {
        Box::new(
            self.entries
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_slice())),
        )
    }
}

/// Worker-side in-memory store.
///
/// Workers have no write access to the persistent index; their results
/// leave the process only through the IPC payload, which drains this map.
#[derive(Debug, Default)]
pub struct MemStore {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemStore {
    pub fn new() -> MemStore {
        MemStore::default()
    }

    /// Consume the store, yielding its entries for the IPC payload.
    pub fn into_entries(self) -> BTreeMap<String, Vec<u8>> {
        self.entries
    }
}

impl KeyedStore for MemStore {
    fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    fn put(&mut self, key: &str, value: Vec<u8>) {
        self.entries.insert(key.to_string(), value);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&str, &[u8])> + '_> {
        Box::new(
            self.entries
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_slice())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::open(&dir.path().join("ns.shlv")).expect("open");
        assert!(store.is_empty());
    }

    #[test]
    fn close_then_open_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ns.shlv");

        let mut store = FileStore::open(&path).expect("open");
        store.put("/data/a", vec![1, 2, 3]);
        store.put("/data/b", vec![4]);
        let size = store.close(0o644).expect("close");
        assert!(size > 0);

        let store = FileStore::open(&path).expect("reopen");
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("/data/a"), Some(&[1u8, 2, 3][..]));
        assert_eq!(store.get("/data/b"), Some(&[4u8][..]));
        assert_eq!(store.get("/data/c"), None);
    }

    #[test]
    fn put_overwrites_wholesale() {
        let mut store = MemStore::new();
        store.put("/d", vec![1]);
        store.put("/d", vec![9, 9]);
        assert_eq!(store.get("/d"), Some(&[9u8, 9][..]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn iteration_is_sorted() {
        let mut store = MemStore::new();
        store.put("/z", vec![]);
        store.put("/a", vec![]);
        store.put("/m", vec![]);
        let keys: Vec<&str> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["/a", "/m", "/z"]);
    }

    #[test]
    fn version_mismatch_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ns.shlv");

        let image = StoreImage {
            version: 99,
            entries: BTreeMap::new(),
        };
        std::fs::write(&path, postcard::to_allocvec(&image).expect("encode")).expect("seed");

        match FileStore::open(&path) {
            Err(CacheError::StoreVersion { found, expected, .. }) => {
                assert_eq!(found, 99);
                assert_eq!(expected, STORE_VERSION);
            }
            other => panic!("expected StoreVersion, got {other:?}"),
        }
    }

    #[test]
    fn mem_store_drains_into_entries() {
        let mut store = MemStore::new();
        store.put("/d", vec![7]);
        let entries = store.into_entries();
        assert_eq!(entries.get("/d"), Some(&vec![7u8]));
    }
}
