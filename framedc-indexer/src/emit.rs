//! Rendering the index in its three external protocols.
//!
//! `ldas` and `pmdc` are sorted plain text and byte-reproducible for a
//! fixed index; `dcfs` is a binary three-record form for the diskcache
//! filesystem. All three filter on the accepted extension set before
//! anything is rendered.

pub mod dcfs;
pub mod text;

use crate::error::Result;
use framedc_cache::{publish, HotMap, KeyedStore};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

/// Output protocol selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Plain text, ldas-tools compatible key (`DIR,SITE,FT,1,DUR`).
    Ldas,
    /// Extended plain text with the extension in the key.
    Pmdc,
    /// Binary three-record form for the diskcache filesystem.
    Dcfs,
}

impl Protocol {
    pub fn name(&self) -> &'static str {
        match self {
            Protocol::Ldas => "ldas",
            Protocol::Pmdc => "pmdc",
            Protocol::Dcfs => "dcfs",
        }
    }
}

/// Where rendered output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitTarget {
    /// Write to the process stdout (the `-o -` case).
    Stdout,
    /// Publish atomically to a file.
    File(PathBuf),
}

/// Render the accepted subset of the index in `protocol`.
pub fn render(
    store: &dyn KeyedStore,
    hot: &HotMap,
    protocol: Protocol,
    extensions: &BTreeSet<String>,
) -> Result<Vec<u8>> {
    match protocol {
        Protocol::Ldas => text::render_ldas(store, hot, extensions),
        Protocol::Pmdc => text::render_pmdc(store, hot, extensions),
        Protocol::Dcfs => dcfs::render_dcfs(store, hot, extensions),
    }
}

/// Render and deliver: stdout verbatim, files via atomic publication.
pub fn emit(
    store: &dyn KeyedStore,
    hot: &HotMap,
    protocol: Protocol,
    extensions: &BTreeSet<String>,
    target: &EmitTarget,
    mode: u32,
) -> Result<()> {
    let bytes = render(store, hot, protocol, extensions)?;
    tracing::debug!(protocol = protocol.name(), bytes = bytes.len(), "rendered");
    match target {
        EmitTarget::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&bytes)
                .and_then(|_| stdout.flush())
                .map_err(|e| crate::error::IndexerError::io("<stdout>", e))?;
        }
        EmitTarget::File(path) => publish(path, &bytes, mode)?,
    }
    Ok(())
}
