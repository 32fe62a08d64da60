//! The binary three-record protocol for the diskcache filesystem.
//!
//! The file is three consecutive length-prefixed postcard records, coarse
//! to fine: which frametypes an extension has, which sites an
//! (extension, frametype) has, and the full per-directory listings under
//! (extension, frametype, site). A peer browses the tree top-down without
//! decoding the heavy third record until it needs it.
//!
//! Record layout: `u64-le length ‖ postcard bytes`, three times.

use crate::error::{IndexerError, Result};
use framedc_cache::{HotMap, KeyedStore};
use framedc_core::{Fragment, SegmentList};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Extension → frametypes present under it.
pub type DcfsHi = BTreeMap<String, BTreeSet<String>>;
/// (extension, frametype) → sites present under it.
pub type DcfsMid = BTreeMap<(String, String), BTreeSet<String>>;
/// (extension, frametype, site) → per-directory coverage entries.
pub type DcfsLo = BTreeMap<(String, String, String), Vec<DcfsEntry>>;

/// One directory's coverage of one stream in the fine-grained record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DcfsEntry {
    pub dir: String,
    pub duration: u64,
    pub segments: SegmentList,
    /// The directory's hot-map mtime at publication.
    pub mtime: i64,
}

pub(crate) fn render_dcfs(
    store: &dyn KeyedStore,
    hot: &HotMap,
    extensions: &BTreeSet<String>,
) -> Result<Vec<u8>> {
    let mut hi = DcfsHi::new();
    let mut mid = DcfsMid::new();
    let mut lo = DcfsLo::new();

    for (dir, bytes) in store.iter() {
        let fragment = Fragment::from_bytes(bytes)?;
        for (key, segs) in &fragment {
            if !extensions.contains(&key.extension) {
                continue;
            }
            let mtime = *hot
                .get(dir)
                .ok_or_else(|| IndexerError::MissingHotEntry(dir.to_string()))?;

            hi.entry(key.extension.clone())
                .or_default()
                .insert(key.frametype.clone());
            mid.entry((key.extension.clone(), key.frametype.clone()))
                .or_default()
                .insert(key.site.clone());
            lo.entry((
                key.extension.clone(),
                key.frametype.clone(),
                key.site.clone(),
            ))
            .or_default()
            .push(DcfsEntry {
                dir: dir.to_string(),
                duration: key.duration,
                segments: segs.clone(),
                mtime,
            });
        }
    }

    let mut out = Vec::new();
    write_record(&mut out, &hi)?;
    write_record(&mut out, &mid)?;
    write_record(&mut out, &lo)?;
    Ok(out)
}

/// Decode a dcfs file produced by [`render_dcfs`].
pub fn read_dcfs(bytes: &[u8]) -> Result<(DcfsHi, DcfsMid, DcfsLo)> {
    let mut rest = bytes;
    let hi = read_record(&mut rest)?;
    let mid = read_record(&mut rest)?;
    let lo = read_record(&mut rest)?;
    if !rest.is_empty() {
        return Err(IndexerError::Serialization(format!(
            "dcfs: {} trailing bytes after third record",
            rest.len()
        )));
    }
    Ok((hi, mid, lo))
}

fn write_record<T: Serialize>(out: &mut Vec<u8>, record: &T) -> Result<()> {
    let bytes = postcard::to_allocvec(record)?;
    out.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
    out.extend_from_slice(&bytes);
    Ok(())
}

fn read_record<'a, T: Deserialize<'a>>(rest: &mut &'a [u8]) -> Result<T> {
    if rest.len() < 8 {
        return Err(IndexerError::Serialization(
            "dcfs: truncated record length".to_string(),
        ));
    }
    let (len_bytes, tail) = rest.split_at(8);
    let mut len_arr = [0u8; 8];
    len_arr.copy_from_slice(len_bytes);
    let len = u64::from_le_bytes(len_arr) as usize;
    if tail.len() < len {
        return Err(IndexerError::Serialization(format!(
            "dcfs: record of {len} bytes but only {} remain",
            tail.len()
        )));
    }
    let (body, remainder) = tail.split_at(len);
    *rest = remainder;
    Ok(postcard::from_bytes(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use framedc_cache::{KeyedStore, MemStore};
    use framedc_core::{FrameName, Segment};

    fn exts(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn fixture() -> (MemStore, HotMap) {
        let mut store = MemStore::new();
        let mut hot = HotMap::new();
        for (dir, names, mtime) in [
            ("/T/a", vec!["H-R-1000-16.gwf", "H-R-1016-16.gwf"], 100i64),
            ("/T/b", vec!["L-RDS-5000-64.gwf", "L-RDS-5000-64.h5"], 200),
        ] {
            let mut frag = Fragment::new();
            for name in names {
                frag.insert(&FrameName::parse(name).expect(name));
            }
            store.put(dir, frag.to_bytes().expect("encode"));
            hot.insert(dir.to_string(), mtime);
        }
        (store, hot)
    }

    #[test]
    fn three_records_roundtrip() {
        let (store, hot) = fixture();
        let bytes = render_dcfs(&store, &hot, &exts(&["gwf", "h5"])).expect("render");
        let (hi, mid, lo) = read_dcfs(&bytes).expect("read back");

        assert_eq!(hi.len(), 2);
        assert_eq!(hi["gwf"], set(&["R", "RDS"]));
        assert_eq!(hi["h5"], set(&["RDS"]));

        assert_eq!(mid[&("gwf".to_string(), "R".to_string())], set(&["H"]));

        let entries = &lo[&("gwf".to_string(), "R".to_string(), "H".to_string())];
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].dir, "/T/a");
        assert_eq!(entries[0].duration, 16);
        assert_eq!(entries[0].mtime, 100);
        assert_eq!(entries[0].segments.as_slice(), &[Segment::new(1000, 1032)]);
    }

    #[test]
    fn extension_filter_applies_to_all_records() {
        let (store, hot) = fixture();
        let bytes = render_dcfs(&store, &hot, &exts(&["gwf"])).expect("render");
        let (hi, mid, lo) = read_dcfs(&bytes).expect("read back");

        assert!(!hi.contains_key("h5"));
        assert!(mid.keys().all(|(ext, _)| ext == "gwf"));
        assert!(lo.keys().all(|(ext, _, _)| ext == "gwf"));
    }

    #[test]
    fn empty_index_still_has_three_records() {
        let store = MemStore::new();
        let bytes = render_dcfs(&store, &HotMap::new(), &exts(&["gwf"])).expect("render");
        let (hi, mid, lo) = read_dcfs(&bytes).expect("read back");
        assert!(hi.is_empty());
        assert!(mid.is_empty());
        assert!(lo.is_empty());
    }

    #[test]
    fn truncated_input_is_rejected() {
        let (store, hot) = fixture();
        let bytes = render_dcfs(&store, &hot, &exts(&["gwf"])).expect("render");
        assert!(read_dcfs(&bytes[..bytes.len() - 1]).is_err());
        assert!(read_dcfs(&bytes[..4]).is_err());
    }
}
