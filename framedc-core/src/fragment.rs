//! Directory fragments: the per-directory slice of the index.
//!
//! Within one directory, files of the same logical stream share an SFDE
//! key — (site, frametype, duration, extension). The GPS start is *not*
//! part of the key; starts contribute intervals that the fragment
//! coalesces per key.

use crate::error::Result;
use crate::name::FrameName;
use crate::segments::{Segment, SegmentList};
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Grouping key for frame files of one logical stream.
///
/// `Ord` derives field-by-field, so fragment iteration (and everything
/// serialized from it) is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SfdeKey {
    pub site: String,
    pub frametype: String,
    pub duration: u64,
    pub extension: String,
}

impl SfdeKey {
    pub fn new(
        site: impl Into<String>,
        frametype: impl Into<String>,
        duration: u64,
        extension: impl Into<String>,
    ) -> SfdeKey {
        SfdeKey {
            site: site.into(),
            frametype: frametype.into(),
            duration,
            extension: extension.into(),
        }
    }
}

impl From<&FrameName> for SfdeKey {
    fn from(name: &FrameName) -> SfdeKey {
        SfdeKey {
            site: name.site.clone(),
            frametype: name.frametype.clone(),
            duration: name.duration,
            extension: name.extension.clone(),
        }
    }
}

/// One directory's contribution to the index: coalesced coverage per SFDE.
///
/// A directory's fragment is rebuilt wholesale whenever the directory is
/// rescanned, so stale keys never need individual deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fragment(BTreeMap<SfdeKey, SegmentList>);

impl Fragment {
    pub fn new() -> Fragment {
        Fragment(BTreeMap::new())
    }

    /// Fold one parsed frame file into the fragment.
    pub fn insert(&mut self, name: &FrameName) {
        self.0
            .entry(SfdeKey::from(name))
            .or_default()
            .add(Segment::new(name.gpsstart, name.gpsend()));
    }

    pub fn get(&self, key: &SfdeKey) -> Option<&SegmentList> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, SfdeKey, SegmentList> {
        self.0.iter()
    }

    /// Encode to the opaque byte form stored under a directory key in the
    /// index store and in worker IPC payloads.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(postcard::to_allocvec(self)?)
    }

    /// Decode the opaque byte form back into a fragment.
    pub fn from_bytes(bytes: &[u8]) -> Result<Fragment> {
        Ok(postcard::from_bytes(bytes)?)
    }
}

impl<'a> IntoIterator for &'a Fragment {
    type Item = (&'a SfdeKey, &'a SegmentList);
    type IntoIter = btree_map::Iter<'a, SfdeKey, SegmentList>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
