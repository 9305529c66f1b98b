//! CSV export for [`Table`]s.
//!
//! The header row comes first, cells are written as plain text, missing
//! values as empty cells, and no row-number column is added. Existing files
//! are overwritten.

use crate::models::Table;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize a table to CSV bytes.
pub fn to_csv_bytes(table: &Table) -> Result<Vec<u8>, ::csv::Error> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    if !table.columns.is_empty() {
        writer.write_record(&table.columns)?;
    }
    for row in &table.rows {
        writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
    }
    writer.into_inner().map_err(|e| e.into_error().into())
}

/// Write one table to `path`.
#[instrument(level = "debug", skip(table), fields(path = %path.display(), rows = table.len()))]
pub async fn write_table(table: &Table, path: &Path) -> Result<(), Box<dyn Error>> {
    let bytes = to_csv_bytes(table)?;
    fs::write(path, bytes).await?;
    Ok(())
}

/// Write each `(stem, table)` pair to `{dir}/{stem}.csv`, creating `dir` first.
///
/// # Returns
///
/// The paths written, in iteration order.
///
/// # Errors
///
/// Fails on the first directory or file that cannot be written.
#[instrument(level = "info", skip(tables), fields(dir = %dir.display()))]
pub async fn write_tables<'a, I>(dir: &Path, tables: I) -> Result<Vec<PathBuf>, Box<dyn Error>>
where
    I: IntoIterator<Item = (&'a str, &'a Table)>,
{
    if let Err(e) = fs::create_dir_all(dir).await {
        error!(error = %e, "Failed to create output directory");
        return Err(e.into());
    }

    let mut written = Vec::new();
    for (stem, table) in tables {
        let path = dir.join(format!("{stem}.csv"));
        write_table(table, &path).await?;
        written.push(path);
    }

    info!(files = written.len(), "Wrote CSV files");
    Ok(written)
}
