mod cli;
mod error;
mod status;

use clap::Parser;
use cli::Cli;
use error::{exit_with_error, CliError, CliResult};
use framedc_cache::{FileStore, KeyedStore, LockFile, Namespace};
use framedc_indexer::emit::{emit, EmitTarget};
use framedc_indexer::{run_worker, update_index, DriverConfig};
use std::path::PathBuf;
use std::time::Instant;

fn init_tracing() {
    // Per-directory scan problems surface as warnings on stderr; default
    // the filter so they are visible without RUST_LOG.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli) {
        exit_with_error(e);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    if cli.status {
        return status::run(&cli.namespace);
    }
    if cli.dirs.is_empty() {
        return Err(CliError::Usage("no directories listed".to_string()));
    }
    let roots = canonical_roots(&cli.dirs)?;

    match &cli.ipc_file {
        Some(ipc_path) => {
            if roots.len() != 1 {
                return Err(CliError::Usage(format!(
                    "--ipc-file takes exactly one DIR, got {}",
                    roots.len()
                )));
            }
            run_worker(&cli.namespace, &roots[0], ipc_path)?;
            Ok(())
        }
        None => run_master(&cli, &roots),
    }
}

/// Resolve roots to canonical absolute paths so index keys are stable no
/// matter how the roots were spelled on the command line.
fn canonical_roots(dirs: &[PathBuf]) -> CliResult<Vec<PathBuf>> {
    dirs.iter()
        .map(|dir| {
            std::fs::canonicalize(dir)
                .map_err(|e| CliError::Input(format!("{}: {e}", dir.display())))
        })
        .collect()
}

fn run_master(cli: &Cli, roots: &[PathBuf]) -> CliResult<()> {
    let mode = cli.output_file_mode;

    // Held for the whole pipeline; drop releases it on every exit path
    // out of this function.
    let _lock = LockFile::acquire(&Namespace::lock_path(&cli.namespace))?;

    let mut ns = Namespace::load_or_init(&cli.namespace, mode)?;
    let mut store = FileStore::open(&Namespace::store_path(&cli.namespace))?;

    let program = std::env::current_exe()
        .map_err(|e| CliError::Input(format!("cannot resolve own executable: {e}")))?;
    let config = DriverConfig {
        program,
        concurrency: cli.concurrency as usize,
        tempdir: cli.tempdir.clone(),
    };

    let scan_started = Instant::now();
    update_index(&cli.namespace, roots, &config, &mut store, &mut ns.hot)?;
    let scan_secs = scan_started.elapsed().as_secs_f64();

    let mut write_secs = 0.0;
    if let Some(protocol) = cli.protocol {
        let target = match cli.output.as_str() {
            "-" => EmitTarget::Stdout,
            path => EmitTarget::File(PathBuf::from(path)),
        };
        let write_started = Instant::now();
        emit(
            &store,
            &ns.hot,
            protocol.into(),
            &cli.extension_set(),
            &target,
            mode,
        )?;
        write_secs = write_started.elapsed().as_secs_f64();
    }

    let close_started = Instant::now();
    ns.header.dir_count = store.len() as u64;
    ns.header.index_bytes = store.close(mode)?;
    ns.header.version = env!("CARGO_PKG_VERSION").to_string();
    ns.header.initial_run = false;
    ns.header.last_run = Some(chrono::Utc::now());
    ns.header.scan_secs = scan_secs;
    ns.header.write_secs = write_secs;
    ns.header.close_secs = close_started.elapsed().as_secs_f64();
    ns.save(&cli.namespace, mode)?;

    tracing::info!(
        dirs = ns.header.dir_count,
        scan_secs,
        "cache updated"
    );
    Ok(())
}
