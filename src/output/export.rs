//! Tabular export of collected records

use crate::record::Record;
use crate::ExportError;
use chrono::{DateTime, TimeZone};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Separator placed between the items of a list-valued field
pub const LIST_SEPARATOR: &str = ", ";

/// Builds `<directory>/<prefix>_<YYYYmmdd_HHMMSS>.csv`
pub fn timestamped_path<Tz>(directory: &Path, prefix: &str, at: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    directory.join(format!("{}_{}.csv", prefix, at.format("%Y%m%d_%H%M%S")))
}

/// Column set of the export: the sorted union of every record's keys
pub fn columns(records: &[Record]) -> Vec<&str> {
    records
        .iter()
        .flat_map(Record::keys)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Writes one row per record to `path`
///
/// List fields are joined with [`LIST_SEPARATOR`]; absent and null fields are
/// written as empty cells. With no records nothing is written and no file is
/// created.
///
/// # Returns
///
/// * `Ok(usize)` - Number of data rows written
/// * `Err(ExportError)` - The file could not be created or written
pub fn export_records(records: &[Record], path: &Path, delimiter: u8) -> Result<usize, ExportError> {
    if records.is_empty() {
        tracing::warn!("Empty record set. Nothing to export.");
        return Ok(0);
    }

    let columns = columns(records);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;

    writer.write_record(&columns)?;
    for record in records {
        writer.write_record(columns.iter().map(|column| {
            record
                .get(column)
                .map(|value| value.render(LIST_SEPARATOR))
                .unwrap_or_default()
        }))?;
    }
    writer.flush()?;

    tracing::info!(
        "Exported {} records ({} columns) to {}",
        records.len(),
        columns.len(),
        path.display()
    );
    Ok(records.len())
}
