//! The two sorted plain-text protocols.
//!
//! One line per `(directory, SFDE)` pair that survives the extension
//! filter; lines sort lexicographically and the file ends in exactly one
//! newline, so identical inputs render identical bytes. An empty index
//! renders a single newline.

use crate::error::{IndexerError, Result};
use framedc_cache::{HotMap, KeyedStore};
use framedc_core::{Fragment, SegmentList, SfdeKey};
use std::collections::BTreeSet;

/// `DIR,SITE,FT,1,DUR MTIME NFILES {s0 e0 …}`
///
/// NFILES divides the *summed* coverage by the duration, matching the
/// ldas-tools arithmetic.
pub(crate) fn render_ldas(
    store: &dyn KeyedStore,
    hot: &HotMap,
    extensions: &BTreeSet<String>,
) -> Result<Vec<u8>> {
    let lines = collect_lines(store, hot, extensions, |dir, key, segs, mtime| {
        let nfiles = segs.span() / key.duration;
        format!(
            "{dir},{site},{ft},1,{dur} {mtime} {nfiles} {{{ivals}}}",
            site = key.site,
            ft = key.frametype,
            dur = key.duration,
            ivals = interval_tokens(segs),
        )
    })?;
    Ok(finish(lines))
}

/// `DIR,SITE,FT,x,DUR,EXT MTIME NFILES { s0 e0 … }`
///
/// The extension joins the key, the placeholder column is `x`, NFILES is
/// the per-segment quotient sum, and the braces are standalone tokens.
pub(crate) fn render_pmdc(
    store: &dyn KeyedStore,
    hot: &HotMap,
    extensions: &BTreeSet<String>,
) -> Result<Vec<u8>> {
    let lines = collect_lines(store, hot, extensions, |dir, key, segs, mtime| {
        let nfiles: u64 = segs.iter().map(|s| s.span() / key.duration).sum();
        format!(
            "{dir},{site},{ft},x,{dur},{ext} {mtime} {nfiles} {{ {ivals} }}",
            site = key.site,
            ft = key.frametype,
            dur = key.duration,
            ext = key.extension,
            ivals = interval_tokens(segs),
        )
    })?;
    Ok(finish(lines))
}

fn collect_lines(
    store: &dyn KeyedStore,
    hot: &HotMap,
    extensions: &BTreeSet<String>,
    line: impl Fn(&str, &SfdeKey, &SegmentList, i64) -> String,
) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for (dir, bytes) in store.iter() {
        let fragment = Fragment::from_bytes(bytes)?;
        for (key, segs) in &fragment {
            if !extensions.contains(&key.extension) {
                continue;
            }
            let mtime = *hot
                .get(dir)
                .ok_or_else(|| IndexerError::MissingHotEntry(dir.to_string()))?;
            lines.push(line(dir, key, segs, mtime));
        }
    }
    lines.sort();
    Ok(lines)
}

fn interval_tokens(segs: &SegmentList) -> String {
    let mut tokens = Vec::with_capacity(segs.len() * 2);
    for seg in segs {
        tokens.push(seg.start.to_string());
        tokens.push(seg.end.to_string());
    }
    tokens.join(" ")
}

fn finish(lines: Vec<String>) -> Vec<u8> {
    let mut out = lines.join("\n").into_bytes();
    out.push(b'\n');
    out
}
