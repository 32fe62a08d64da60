use clap::{Parser, ValueEnum};
use framedc_indexer::Protocol;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "framedc",
    about = "Incremental disk-cache indexer for frame file trees",
    version
)]
pub struct Cli {
    /// Base path for the persistent cache. The index store lives at
    /// NAMESPACE.shlv and the single-writer marker at NAMESPACE.lock.
    pub namespace: PathBuf,

    /// Root directories to scan. More than one fans out worker processes.
    pub dirs: Vec<PathBuf>,

    /// Scan for files ending with ".EXTENSION" (no dot). Repeat for
    /// multiple extensions; defaults to gwf when none given.
    #[arg(short = 'e', long = "extension")]
    pub extensions: Vec<String>,

    /// File to write emitted output to; '-' is stdout. Only applies
    /// together with --protocol.
    #[arg(short = 'o', long = "output", default_value = "-")]
    pub output: String,

    /// Octal mode applied to atomically-published files.
    #[arg(
        short = 'm',
        long = "output-file-mode",
        default_value = "644",
        value_parser = parse_octal_mode
    )]
    pub output_file_mode: u32,

    /// Worker mode: write the scan result to this IPC file instead of
    /// the persistent cache. Requires exactly one DIR. You probably do
    /// not need this.
    #[arg(short = 'i', long = "ipc-file")]
    pub ipc_file: Option<PathBuf>,

    /// Emit the index in this protocol. 'ldas' is plain text compatible
    /// with ldas-tools; 'pmdc' extends it with the file extension; both
    /// are sorted. 'dcfs' is the binary form for the diskcache
    /// filesystem. Omitted: the cache is still updated, nothing is
    /// emitted.
    #[arg(short = 'p', long = "protocol", value_enum)]
    pub protocol: Option<ProtocolArg>,

    /// Maximum number of concurrent scan processes. Only applicable with
    /// more than one DIR.
    #[arg(
        short = 'r',
        long = "concurrency",
        default_value_t = 5,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub concurrency: u32,

    /// Parent directory for the per-run scratch directory.
    #[arg(short = 't', long = "tempdir")]
    pub tempdir: Option<PathBuf>,

    /// Print the namespace header and exit.
    #[arg(short = 's', long = "status")]
    pub status: bool,
}

impl Cli {
    /// Accepted extensions with the documented default applied.
    pub fn extension_set(&self) -> std::collections::BTreeSet<String> {
        if self.extensions.is_empty() {
            ["gwf".to_string()].into_iter().collect()
        } else {
            self.extensions.iter().cloned().collect()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProtocolArg {
    Ldas,
    Pmdc,
    Dcfs,
}

impl From<ProtocolArg> for Protocol {
    fn from(arg: ProtocolArg) -> Protocol {
        match arg {
            ProtocolArg::Ldas => Protocol::Ldas,
            ProtocolArg::Pmdc => Protocol::Pmdc,
            ProtocolArg::Dcfs => Protocol::Dcfs,
        }
    }
}

fn parse_octal_mode(s: &str) -> Result<u32, String> {
    u32::from_str_radix(s, 8).map_err(|_| format!("'{s}' is not an octal file mode"))
}
