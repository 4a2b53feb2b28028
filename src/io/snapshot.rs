//! Snapshot CSV read/write.
//!
//! Layout: header `date,<label>,<label>,...`, one row per month, dates as
//! `YYYY-MM-DD`, missing cells left empty. This is the only artifact that
//! crosses from the fetch stage to the presentation stage.

use std::fs::{self, File};
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{Column, TimeTable};
use crate::error::AppError;

const DATE_HEADER: &str = "date";
const DATE_FMT: &str = "%Y-%m-%d";

/// Write the snapshot atomically: a sibling temp file is renamed into place,
/// so an interrupted write never replaces a good snapshot with a partial one.
pub fn write_snapshot(path: &Path, table: &TimeTable) -> Result<(), AppError> {
    let tmp = temp_path(path);
    if let Err(err) = write_csv(&tmp, table) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        AppError::io(format!("Failed to move snapshot into place at '{}': {e}", path.display()))
    })?;
    info!(path = %path.display(), rows = table.len(), columns = table.columns().len(), "snapshot written");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "snapshot.csv".into());
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_csv(path: &Path, table: &TimeTable) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create snapshot '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    let mut header = vec![DATE_HEADER.to_string()];
    header.extend(table.labels().iter().map(|s| s.to_string()));
    writer
        .write_record(&header)
        .map_err(|e| AppError::io(format!("Failed to write snapshot header: {e}")))?;

    for (idx, date) in table.dates().iter().enumerate() {
        let mut record = vec![date.format(DATE_FMT).to_string()];
        for col in table.columns() {
            record.push(col.values[idx].map(|v| v.to_string()).unwrap_or_default());
        }
        writer
            .write_record(&record)
            .map_err(|e| AppError::io(format!("Failed to write snapshot row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush snapshot: {e}")))?;
    Ok(())
}

/// Load a snapshot written by `write_snapshot`.
pub fn read_snapshot(path: &Path) -> Result<TimeTable, AppError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        IoErrorKind::NotFound => AppError::missing_snapshot(format!(
            "Snapshot '{}' not found. Run `cpi fetch` first.",
            path.display()
        )),
        _ => AppError::missing_snapshot(format!("Failed to open snapshot '{}': {e}", path.display())),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::parse(format!("Failed to read snapshot header: {e}")))?
        .clone();
    let labels = parse_header(&headers)?;

    let mut dates = Vec::new();
    let mut values: Vec<Vec<Option<f64>>> = vec![Vec::new(); labels.len()];

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::parse(format!("Snapshot line {line}: {e}")))?;

        let raw_date = record.get(0).unwrap_or("");
        let date = NaiveDate::parse_from_str(raw_date, DATE_FMT)
            .map_err(|_| AppError::parse(format!("Snapshot line {line}: invalid date '{raw_date}'.")))?;
        dates.push(date);

        for (col, cells) in values.iter_mut().enumerate() {
            let raw = record.get(col + 1).unwrap_or("");
            cells.push(parse_cell(raw).map_err(|msg| AppError::parse(format!("Snapshot line {line}: {msg}")))?);
        }
    }

    debug!(path = %path.display(), rows = dates.len(), "snapshot loaded");

    let columns = labels
        .into_iter()
        .zip(values)
        .map(|(label, v)| Column::new(label, v))
        .collect();
    TimeTable::new(dates, columns)
}

fn parse_header(headers: &StringRecord) -> Result<Vec<String>, AppError> {
    // Spreadsheet tools sometimes prepend a UTF-8 BOM to the first header.
    let first = headers.get(0).map(|h| h.trim_start_matches('\u{feff}'));
    if first.map(|h| h.eq_ignore_ascii_case(DATE_HEADER)) != Some(true) {
        return Err(AppError::parse("Snapshot must start with a `date` column."));
    }
    let labels: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
    if labels.is_empty() {
        return Err(AppError::parse("Snapshot has no series columns."));
    }
    Ok(labels)
}

fn parse_cell(raw: &str) -> Result<Option<f64>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(format!("invalid number '{raw}'.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn sample_table() -> TimeTable {
        TimeTable::new(
            vec![d(2023, 1), d(2023, 2), d(2023, 3)],
            vec![
                Column::new("All items", vec![Some(300.536), Some(301.648), Some(301.808)]),
                Column::new("Food", vec![Some(311.1), None, Some(312.25)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn write_then_read_keeps_layout_and_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.csv");
        let table = sample_table();

        write_snapshot(&path, &table).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("date,All items,Food"));
        assert_eq!(lines.next(), Some("2023-01-01,300.536,311.1"));
        assert_eq!(lines.next(), Some("2023-02-01,301.648,"));

        let back = read_snapshot(&path).unwrap();
        assert_eq!(back, table);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn missing_file_is_missing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_snapshot(&dir.path().join("nope.csv")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingSnapshot);
    }

    #[test]
    fn malformed_rows_are_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.csv");

        fs::write(&path, "date,A\n2023-13-01,1.0\n").unwrap();
        assert_eq!(read_snapshot(&path).unwrap_err().kind(), ErrorKind::Parse);

        fs::write(&path, "date,A\n2023-01-01,abc\n").unwrap();
        assert_eq!(read_snapshot(&path).unwrap_err().kind(), ErrorKind::Parse);

        fs::write(&path, "when,A\n2023-01-01,1\n").unwrap();
        assert_eq!(read_snapshot(&path).unwrap_err().kind(), ErrorKind::Parse);
    }

    #[test]
    fn bom_prefixed_header_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.csv");
        fs::write(&path, "\u{feff}date,A\n2023-01-01,1.5\n").unwrap();
        let table = read_snapshot(&path).unwrap();
        assert_eq!(table.columns()[0].values, vec![Some(1.5)]);
    }
}
