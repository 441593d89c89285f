//! Output formatting and persistence for the analysis reports.
//!
//! Supports pretty-printing, JSON serialization, and CSV files written
//! without an index column.

use std::fs;
use std::path::Path;

use csv::{Writer, WriterBuilder};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::analysis::types::{ActiveBookingsTable, DailyGuestTotal};
use crate::dataset::Dataset;
use crate::error::Result;

/// Logs a report using Rust's debug pretty-print format.
pub fn print_pretty(report: &impl std::fmt::Debug) {
    debug!("{:#?}", report);
}

/// Logs a report as pretty-printed JSON.
pub fn print_json(report: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes a CSV file through a temporary file in the target directory that
/// is renamed into place once complete, so readers never see a partial
/// report. The temporary file is removed if filling it fails.
fn write_csv_atomically<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut Writer<&mut NamedTempFile>) -> Result<()>,
{
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(&mut tmp);
        fill(&mut writer)?;
        writer.flush()?;
    }

    tmp.persist(path).map_err(|e| e.error)?;
    debug!(path = %path.display(), "CSV written");
    Ok(())
}

/// Writes a dataset with its header row.
pub fn write_dataset(path: impl AsRef<Path>, dataset: &Dataset) -> Result<()> {
    write_csv_atomically(path.as_ref(), |w| {
        w.write_record(dataset.headers())?;
        for record in dataset.records() {
            w.write_record(record)?;
        }
        Ok(())
    })
}

/// Writes the active-bookings report.
pub fn write_active_bookings(path: impl AsRef<Path>, table: &ActiveBookingsTable) -> Result<()> {
    write_csv_atomically(path.as_ref(), |w| {
        w.write_record(&table.headers)?;
        for row in &table.rows {
            w.write_record(row)?;
        }
        Ok(())
    })
}

/// Writes the guest-totals report.
///
/// The header row is always present, so a window without guests yields a
/// header-only file.
pub fn write_daily_totals(path: impl AsRef<Path>, totals: &[DailyGuestTotal]) -> Result<()> {
    write_csv_atomically(path.as_ref(), |w| {
        w.write_record(DailyGuestTotal::HEADERS)?;
        for total in totals {
            w.serialize(total)?;
        }
        Ok(())
    })
}
