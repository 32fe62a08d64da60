//! Parallel dispatch: one worker process per root, bounded pool,
//! all-or-nothing aggregation.
//!
//! Workers are re-invocations of this program in `--ipc-file` mode; there
//! is no shared memory, only the per-worker payload file inside a scratch
//! directory owned by the master. The pool enforces the concurrency cap
//! by polling `try_wait` every 125 ms and launching the next worker as a
//! slot frees.
//!
//! Failure is absolute: the first worker to exit nonzero hard-kills the
//! survivors and aborts the run before anything touches the persistent
//! cache. The scratch directory and any still-live workers are reclaimed
//! on every exit path, normal or unwinding, by the pool's drop.

use crate::config::{DriverConfig, POLL_INTERVAL};
use crate::error::{IndexerError, Result};
use crate::fs::OsFs;
use crate::ipc::IpcPayload;
use crate::scan::{apply_outcome, scan_root};
use framedc_cache::{HotMap, KeyedStore, MemStore, Namespace};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use tempfile::TempDir;

/// Update `store` and `hot` from a scan of `roots`.
///
/// A single root is scanned inline in this process; multiple roots fan
/// out to worker processes. Nothing is published here — the caller owns
/// persistence and the namespace lock.
pub fn update_index(
    namespace: &Path,
    roots: &[PathBuf],
    config: &DriverConfig,
    store: &mut dyn KeyedStore,
    hot: &mut HotMap,
) -> Result<()> {
    check_disjoint_roots(roots)?;
    match roots {
        [root] => run_inline(root, store, hot),
        _ => run_parallel(namespace, roots, config, store, hot),
    }
}

/// Worker-mode entry: scan one root against a read-only view of the
/// namespace and leave the results at `ipc_path`.
pub fn run_worker(namespace: &Path, root: &Path, ipc_path: &Path) -> Result<()> {
    let ns = Namespace::load_readonly(namespace)?;
    let outcome = scan_root(&OsFs, root, &ns.hot);

    let mut store = MemStore::new();
    apply_outcome(&mut store, &outcome)?;

    // The payload lives in the master's private scratch directory.
    IpcPayload::from_scan(&outcome, store.into_entries()).write(ipc_path, 0o600)
}

/// Reject root sets where one root contains another. Overlap would let
/// two workers overwrite the same directory's fragment in aggregation
/// order, which is a usage error rather than a behavior.
pub fn check_disjoint_roots(roots: &[PathBuf]) -> Result<()> {
    for (i, a) in roots.iter().enumerate() {
        for b in roots.iter().skip(i + 1) {
            if b.starts_with(a) {
                return Err(IndexerError::OverlappingRoots {
                    outer: a.clone(),
                    inner: b.clone(),
                });
            }
            if a.starts_with(b) {
                return Err(IndexerError::OverlappingRoots {
                    outer: b.clone(),
                    inner: a.clone(),
                });
            }
        }
    }
    Ok(())
}

fn run_inline(root: &Path, store: &mut dyn KeyedStore, hot: &mut HotMap) -> Result<()> {
    let outcome = scan_root(&OsFs, root, hot);
    apply_outcome(store, &outcome)?;
    hot.extend(outcome.hot);
    Ok(())
}

fn run_parallel(
    namespace: &Path,
    roots: &[PathBuf],
    config: &DriverConfig,
    store: &mut dyn KeyedStore,
    hot: &mut HotMap,
) -> Result<()> {
    let concurrency = config.concurrency.max(1);
    let mut pool = WorkerPool::create(namespace, config)?;

    for root in roots {
        while pool.reap()? >= concurrency {
            std::thread::sleep(POLL_INTERVAL);
        }
        pool.spawn(root)?;
    }
    while pool.reap()? > 0 {
        std::thread::sleep(POLL_INTERVAL);
    }

    // Every worker exited cleanly; absorb payloads in launch order.
    for worker in &pool.workers {
        let payload = IpcPayload::read(&worker.ipc_path)?;
        hot.extend(payload.hot);
        for (dir, bytes) in payload.dc {
            store.put(&dir, bytes);
        }
    }
    Ok(())
}

struct Worker {
    root: PathBuf,
    ipc_path: PathBuf,
    stderr_path: PathBuf,
    child: Child,
    status: Option<ExitStatus>,
}

/// Live workers plus the scratch directory their payloads land in.
///
/// Dropping the pool hard-kills anything still running and removes the
/// scratch directory; both steps tolerate repeats and already-gone
/// processes, so the pool doubles as the run's cleanup bundle.
struct WorkerPool {
    namespace: PathBuf,
    program: PathBuf,
    workers: Vec<Worker>,
    scratch: TempDir,
}

impl WorkerPool {
    fn create(namespace: &Path, config: &DriverConfig) -> Result<WorkerPool> {
        let builder_result = match &config.tempdir {
            Some(parent) => tempfile::Builder::new()
                .prefix("framedc-")
                .tempdir_in(parent),
            None => tempfile::Builder::new().prefix("framedc-").tempdir(),
        };
        let scratch = builder_result.map_err(|e| {
            let parent = config
                .tempdir
                .clone()
                .unwrap_or_else(std::env::temp_dir);
            IndexerError::io(parent, e)
        })?;
        Ok(WorkerPool {
            namespace: namespace.to_path_buf(),
            program: config.program.clone(),
            workers: Vec::new(),
            scratch,
        })
    }

    fn spawn(&mut self, root: &Path) -> Result<()> {
        let seq = self.workers.len();
        let ipc_path = self.scratch.path().join(seq.to_string());
        let stderr_path = self.scratch.path().join(format!("{seq}.stderr"));

        let stderr =
            File::create(&stderr_path).map_err(|e| IndexerError::io(&stderr_path, e))?;
        let child = Command::new(&self.program)
            .arg(&self.namespace)
            .arg(root)
            .arg("--ipc-file")
            .arg(&ipc_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(stderr)
            .spawn()
            .map_err(|e| IndexerError::io(&self.program, e))?;

        tracing::debug!(root = %root.display(), pid = child.id(), "spawned worker");
        self.workers.push(Worker {
            root: root.to_path_buf(),
            ipc_path,
            stderr_path,
            child,
            status: None,
        });
        Ok(())
    }

    /// Collect exits; return how many workers are still alive. The first
    /// nonzero exit kills the survivors and aborts with the worker's
    /// stderr attached.
    fn reap(&mut self) -> Result<usize> {
        let mut failed: Option<usize> = None;
        let mut alive = 0;
        for (i, worker) in self.workers.iter_mut().enumerate() {
            if worker.status.is_some() {
                continue;
            }
            match worker.child.try_wait() {
                Ok(Some(status)) => {
                    worker.status = Some(status);
                    if !status.success() && failed.is_none() {
                        failed = Some(i);
                    }
                }
                Ok(None) => alive += 1,
                Err(e) => return Err(IndexerError::io(&worker.root, e)),
            }
        }

        if let Some(i) = failed {
            self.kill_survivors();
            let worker = &self.workers[i];
            let stderr = std::fs::read_to_string(&worker.stderr_path).unwrap_or_default();
            let status = worker
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            return Err(IndexerError::WorkerFailed {
                root: worker.root.clone(),
                status,
                stderr,
            });
        }
        Ok(alive)
    }

    fn kill_survivors(&mut self) {
        for worker in &mut self.workers {
            if worker.status.is_some() {
                continue;
            }
            // SIGKILL; a worker that exited in the meantime is fine.
            if worker.child.kill().is_ok() {
                tracing::debug!(root = %worker.root.display(), "killed worker");
            }
            if let Ok(status) = worker.child.wait() {
                worker.status = Some(status);
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.kill_survivors();
        // `scratch` (the TempDir field) removes itself afterwards.
    }
}
