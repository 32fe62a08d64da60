//! # framedc-indexer
//!
//! The working half of framedc: walking roots, fanning out worker
//! processes, and rendering the index.
//!
//! - [`scan`]: the incremental scan engine. All filesystem access goes
//!   through the [`fs::ScanFs`] trait so hot-directory pruning is provable
//!   against a mock tree.
//! - [`driver`]: the parallel dispatch model — one worker process per
//!   root under a bounded pool, results aggregated from per-worker IPC
//!   files, nothing published unless every worker succeeds.
//! - [`ipc`]: the self-contained payload a worker writes at exit.
//! - [`emit`]: the three output protocols (`ldas`, `pmdc`, `dcfs`).
//!
//! The split between master and worker is a deployment detail, not a code
//! path: both run the same scan against a [`framedc_cache::KeyedStore`],
//! the master's file-backed and the worker's in-memory.

pub mod config;
pub mod driver;
pub mod emit;
pub mod error;
pub mod fs;
pub mod ipc;
pub mod scan;

pub use config::DriverConfig;
pub use driver::{check_disjoint_roots, run_worker, update_index};
pub use emit::{emit, EmitTarget, Protocol};
pub use error::{IndexerError, Result};
pub use fs::{OsFs, ScanFs};
pub use ipc::IpcPayload;
pub use scan::{apply_outcome, scan_root, ScanOutcome};
