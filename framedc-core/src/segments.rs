//! Sorted, disjoint, coalesced segment lists.
//!
//! A `SegmentList` maintains the time coverage of one SFDE group as a
//! sorted list of half-open `[start, end)` intervals with no overlapping
//! or adjacent pair. Half-open bounds make adjacency (`b == c`) a merge
//! without any off-by-one handling.
//!
//! Insertion is a bisect followed by a single left-aware merge sweep —
//! O(n) worst case per insert, which is fine because fragments hold the
//! coverage of one directory, not of the whole tree.

use serde::{Deserialize, Serialize};

/// A half-open GPS interval `[start, end)`.
///
/// Ordering is lexicographic on `(start, end)`, which is what the
/// insertion bisect relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Segment {
    pub start: u64,
    pub end: u64,
}

impl Segment {
    pub fn new(start: u64, end: u64) -> Segment {
        Segment { start, end }
    }

    /// Covered length in seconds.
    pub fn span(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}

/// A sorted list of pairwise-disjoint, fully coalesced segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentList(Vec<Segment>);

impl SegmentList {
    pub fn new() -> SegmentList {
        SegmentList(Vec::new())
    }

    /// Insert a segment, keeping the list sorted, disjoint, and coalesced.
    ///
    /// Two segments `[a, b)` and `[c, d)` merge iff `b >= c`. A degenerate
    /// segment (`start >= end`) produces no change.
    ///
    /// The merge sweep starts at the insertion point's left neighbour: an
    /// already-stored neighbour may have an end reaching past the new
    /// segment's start, and skipping it would leave a mergeable pair.
    pub fn add(&mut self, seg: Segment) {
        if seg.start >= seg.end {
            return;
        }
        let idx = self.0.partition_point(|s| *s < seg);
        self.0.insert(idx, seg);

        let n = self.0.len();
        let mut write = idx.saturating_sub(1);
        let mut read = write;
        while read < n {
            let lo = self.0[read].start;
            let mut hi = self.0[read].end;
            read += 1;
            while read < n && hi >= self.0[read].start {
                hi = hi.max(self.0[read].end);
                read += 1;
            }
            self.0[write] = Segment::new(lo, hi);
            write += 1;
        }
        self.0.truncate(write);
    }

    /// Total covered seconds across all segments.
    pub fn span(&self) -> u64 {
        self.0.iter().map(Segment::span).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Segment] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a SegmentList {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Segment> for SegmentList {
    fn from_iter<T: IntoIterator<Item = Segment>>(iter: T) -> SegmentList {
        let mut list = SegmentList::new();
        for seg in iter {
            list.add(seg);
        }
        list
    }
}
