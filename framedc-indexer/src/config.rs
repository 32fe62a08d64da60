//! Driver configuration

use std::path::PathBuf;
use std::time::Duration;

/// Default cap on simultaneously live workers.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// How often the master polls its worker pool for exits.
pub const POLL_INTERVAL: Duration = Duration::from_millis(125);

/// Configuration for the parallel driver.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Executable to re-invoke in worker mode. Normally the current
    /// binary; tests point it at a prebuilt one.
    pub program: PathBuf,

    /// Maximum number of live worker processes. Always >= 1.
    /// Default: 5
    pub concurrency: usize,

    /// Parent directory for the per-run scratch directory holding worker
    /// IPC files. `None` uses the system temp directory.
    pub tempdir: Option<PathBuf>,
}

impl DriverConfig {
    pub fn new(program: PathBuf) -> DriverConfig {
        DriverConfig {
            program,
            concurrency: DEFAULT_CONCURRENCY,
            tempdir: None,
        }
    }
}
