//! Output formatting and persistence for datasets, summary tables and reports.
//!
//! Supports JSON export and CSV tables.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::analyzers::types::RawRecord;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Prints a value as pretty-printed JSON followed by a newline.
///
/// Pass `std::io::stdout().lock()` for machine-readable CLI output; logs go
/// to stderr and never mix with it.
pub fn print_json<W: Write>(mut out: W, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Writes a value as pretty-printed JSON, replacing any existing file.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, value)?;
    debug!(path = %path.display(), "Wrote JSON");
    Ok(())
}

/// Writes flat rows as a CSV table with a header row, replacing any existing file.
///
/// The header is derived from the row type's field names, so an empty table
/// produces an empty file.
pub fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;

    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = rows.len(), "Wrote CSV table");
    Ok(())
}

/// Writes a fetched dataset to CSV. Each fetch is a fresh snapshot, so an
/// existing file is replaced rather than appended to.
pub fn write_records(path: &Path, records: &[RawRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_table(path, records)
}
