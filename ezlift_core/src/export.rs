//! CSV export of weekly training volume.
//!
//! The file is written next to its destination, fsynced and then renamed
//! over it, so readers never observe a half-written export.

use crate::{Error, Result, WeeklyVolume};
use std::path::Path;
use tempfile::NamedTempFile;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    week_start: String,
    total_sets: usize,
    total_volume: f64,
    is_current: bool,
}

impl From<&WeeklyVolume> for CsvRow {
    fn from(week: &WeeklyVolume) -> Self {
        CsvRow {
            week_start: week.week_start.to_string(),
            total_sets: week.total_sets,
            total_volume: week.total_volume,
            is_current: week.is_current,
        }
    }
}

/// Write weekly volume rows to `path`, replacing any existing file
///
/// Returns the number of rows written. An empty slice still produces a
/// file containing only the header row.
pub fn write_weekly_csv(weeks: &[WeeklyVolume], path: &Path) -> Result<usize> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(temp.as_file());

        writer.write_record(["week_start", "total_sets", "total_volume", "is_current"])?;
        for week in weeks {
            writer.serialize(CsvRow::from(week))?;
        }
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Exported {} weeks to {:?}", weeks.len(), path);
    Ok(weeks.len())
}
