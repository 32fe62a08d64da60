//! The `--status` report: render the namespace header without touching
//! the lock or the index store's contents.

use crate::error::CliResult;
use comfy_table::{ContentArrangement, Table};
use framedc_cache::Namespace;
use std::path::Path;

pub fn run(namespace: &Path) -> CliResult<()> {
    let ns = Namespace::load_existing(namespace)?;
    let header = &ns.header;

    let rows: Vec<(&str, String)> = vec![
        ("version", header.version.clone()),
        ("initial run", header.initial_run.to_string()),
        (
            "last run",
            header
                .last_run
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "never".to_string()),
        ),
        ("scan seconds", format!("{:.3}", header.scan_secs)),
        ("write seconds", format!("{:.3}", header.write_secs)),
        ("close seconds", format!("{:.3}", header.close_secs)),
        ("directories", header.dir_count.to_string()),
        ("hot entries", ns.hot.len().to_string()),
        ("index bytes", header.index_bytes.to_string()),
        ("namespace file", live_size(namespace)),
        ("index store", live_size(&Namespace::store_path(namespace))),
    ];

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(["field", "value"]);
    for (field, value) in rows {
        table.add_row([field.to_string(), value]);
    }

    println!("{table}");
    Ok(())
}

/// Current on-disk size, as distinct from the header's last-run record.
fn live_size(path: &Path) -> String {
    match std::fs::metadata(path) {
        Ok(meta) => format!("{} bytes", meta.len()),
        Err(_) => "absent".to_string(),
    }
}
