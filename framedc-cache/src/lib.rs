//! # framedc-cache
//!
//! Persistent state for the framedc indexer. One namespace path `N`
//! owns three on-disk surfaces:
//!
//! - `N` — the namespace file: run header plus the hot-directory map
//!   (pretty JSON, inspectable with any tool)
//! - `N.shlv` — the index store: directory path → opaque fragment bytes
//!   (postcard image, version-stamped)
//! - `N.lock` — presence-only single-writer marker
//!
//! Every file-level update goes through [`publish`]: write a temp file in
//! the destination's directory, flush, chmod, rename. Concurrent readers
//! see the old bytes or the new bytes, never a torn file.
//!
//! The index store hides behind the [`KeyedStore`] trait with two
//! implementations: [`FileStore`] for the master process (loads and
//! republishes `N.shlv`) and [`MemStore`] for worker processes, which have
//! no write access to the persistent store and drain their results into an
//! IPC payload instead.

pub mod error;
pub mod lock;
pub mod namespace;
pub mod publish;
pub mod store;

pub use error::{CacheError, Result};
pub use lock::LockFile;
pub use namespace::{Header, HotMap, Namespace};
pub use publish::publish;
pub use store::{FileStore, KeyedStore, MemStore};
