use colored::Colorize;
use framedc_cache::CacheError;
use framedc_indexer::IndexerError;
use std::fmt;
use std::process;

/// Exit codes for the CLI.
#[allow(dead_code)]
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

/// Unified error type for CLI operations.
pub enum CliError {
    /// Error from the persistent cache layer.
    Cache(CacheError),
    /// Error from the scan/driver/emit layer.
    Indexer(IndexerError),
    /// Bad path argument, unreadable root, similar input trouble.
    Input(String),
    /// Argument / usage errors.
    Usage(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Cache(CacheError::LockHeld(path)) => write!(
                f,
                "{} lock conflict: {} exists — another indexer owns this namespace\n  {} if its owner crashed, remove the stale lock by hand",
                "error:".red().bold(),
                path.display(),
                "help:".cyan().bold(),
            ),
            CliError::Cache(e) => write!(f, "{} {e}", "error:".red().bold()),
            CliError::Indexer(e) => write!(f, "{} {e}", "error:".red().bold()),
            CliError::Input(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::Usage(msg) => write!(f, "{} {msg}", "error:".red().bold()),
        }
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<CacheError> for CliError {
    fn from(e: CacheError) -> Self {
        CliError::Cache(e)
    }
}

impl From<IndexerError> for CliError {
    fn from(e: IndexerError) -> Self {
        CliError::Indexer(e)
    }
}

/// Print error and exit with the appropriate code.
pub fn exit_with_error(err: CliError) -> ! {
    eprintln!("{err}");
    let code = match &err {
        CliError::Usage(_) => EXIT_USAGE,
        // Overlapping roots are caught below the CLI but are usage all
        // the same.
        CliError::Indexer(IndexerError::OverlappingRoots { .. }) => EXIT_USAGE,
        _ => EXIT_ERROR,
    };
    process::exit(code)
}

pub type CliResult<T> = std::result::Result<T, CliError>;
