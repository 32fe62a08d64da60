//! Worker → master IPC payloads.
//!
//! Serialized files instead of pipes: payloads can be large, and a worker
//! must be able to finish and exit without the master draining anything
//! concurrently. Each worker writes exactly one self-contained file,
//! atomically, at its assigned path inside the master's scratch
//! directory; the master reads it only after the worker's clean exit.

use crate::error::{IndexerError, Result};
use crate::scan::ScanOutcome;
use framedc_cache::HotMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Payload format version. Bump when the layout changes.
const IPC_VERSION: u32 = 1;

/// Everything a worker hands back to the master.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IpcPayload {
    version: u32,
    /// Directory → encoded fragment, exactly the deltas this worker's
    /// scan produced.
    pub dc: BTreeMap<String, Vec<u8>>,
    /// The hot entries for precisely the directories in `dc`.
    pub hot: HotMap,
}

impl IpcPayload {
    /// Build a payload from a worker's scan outcome and its drained
    /// in-memory store.
    pub fn from_scan(outcome: &ScanOutcome, dc: BTreeMap<String, Vec<u8>>) -> IpcPayload {
        let hot = outcome
            .hot
            .iter()
            .filter(|(dir, _)| dc.contains_key(dir.as_str()))
            .map(|(dir, &mtime)| (dir.clone(), mtime))
            .collect();
        IpcPayload {
            version: IPC_VERSION,
            dc,
            hot,
        }
    }

    /// Atomically write the payload to `path`.
    pub fn write(&self, path: &Path, mode: u32) -> Result<()> {
        let bytes = postcard::to_allocvec(self)?;
        framedc_cache::publish(path, &bytes, mode)?;
        Ok(())
    }

    /// Read a payload back, rejecting unknown format versions.
    pub fn read(path: &Path) -> Result<IpcPayload> {
        let bytes = std::fs::read(path).map_err(|e| IndexerError::io(path, e))?;
        let payload: IpcPayload = postcard::from_bytes(&bytes)?;
        if payload.version != IPC_VERSION {
            return Err(IndexerError::IpcVersion {
                path: path.to_path_buf(),
                found: payload.version,
                expected: IPC_VERSION,
            });
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framedc_core::Fragment;
    use framedc_core::FrameName;

    fn outcome_with(dirs: &[(&str, i64, bool)]) -> (ScanOutcome, BTreeMap<String, Vec<u8>>) {
        // (path, mtime, has_fragment)
        let mut outcome = ScanOutcome::default();
        let mut dc = BTreeMap::new();
        for &(dir, mtime, has_fragment) in dirs {
            outcome.hot.insert(dir.to_string(), mtime);
            if has_fragment {
                let mut frag = Fragment::new();
                frag.insert(&FrameName::parse("H-R-1000-16.gwf").expect("frame"));
                dc.insert(dir.to_string(), frag.to_bytes().expect("encode"));
                outcome.fragments.insert(dir.to_string(), frag);
            }
        }
        (outcome, dc)
    }

    #[test]
    fn hot_subset_matches_dc_keys_exactly() {
        // The empty directory's hot entry must not leak into the payload.
        let (outcome, dc) = outcome_with(&[("/t/full", 100, true), ("/t/empty", 90, false)]);
        let payload = IpcPayload::from_scan(&outcome, dc);

        assert_eq!(payload.dc.len(), 1);
        assert_eq!(payload.hot.len(), 1);
        assert_eq!(payload.hot.get("/t/full"), Some(&100));
    }

    #[test]
    fn write_then_read_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("0");

        let (outcome, dc) = outcome_with(&[("/t", 100, true)]);
        let payload = IpcPayload::from_scan(&outcome, dc);
        payload.write(&path, 0o600).expect("write");

        let back = IpcPayload::read(&path).expect("read");
        assert_eq!(back, payload);
    }

    #[test]
    fn missing_payload_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(IpcPayload::read(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("0");

        let bogus = IpcPayload {
            version: 99,
            dc: BTreeMap::new(),
            hot: HotMap::new(),
        };
        std::fs::write(&path, postcard::to_allocvec(&bogus).expect("encode")).expect("seed");

        match IpcPayload::read(&path) {
            Err(IndexerError::IpcVersion { found, .. }) => assert_eq!(found, 99),
            other => panic!("expected IpcVersion, got {other:?}"),
        }
    }
}
