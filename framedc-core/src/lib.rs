//! # framedc-core
//!
//! Core data model for the framedc disk-cache indexer.
//!
//! This crate provides:
//! - `FrameName`: the `SITE-FRAMETYPE-GPSSTART-DURATION.EXTENSION` parser
//! - `Segment` / `SegmentList`: sorted, disjoint, coalesced half-open
//!   GPS intervals
//! - `SfdeKey` / `Fragment`: one directory's grouped time coverage
//!
//! ## Design Principles
//!
//! 1. **Pure data**: no filesystem access, no I/O — scanning and
//!    persistence live in `framedc-indexer` and `framedc-cache`
//! 2. **Deterministic maps**: fragments are `BTreeMap`s so serialized
//!    images and emitted output are byte-stable
//! 3. **Silent skip at the parse seam**: a filename that does not match
//!    the frame grammar is "not a frame file", never an error

pub mod error;
pub mod fragment;
pub mod name;
pub mod segments;

pub use error::{CoreError, Result};
pub use fragment::{Fragment, SfdeKey};
pub use name::FrameName;
pub use segments::{Segment, SegmentList};
