//! Formatted terminal output for the fetch and report commands.
//!
//! We keep formatting code in one place so:
//! - the transform code stays clean and testable
//! - output changes are localized (important for golden tests)

use crate::app::pipeline::{Dashboard, FetchSummary};
use crate::chart::format_value;
use crate::domain::AxisMode;
use crate::transform::{CorrelationMatrix, LatestRow};

/// Width of a correlation cell (and of its truncated column header).
const CELL: usize = 8;
const ROW_LABEL: usize = 32;

pub fn format_fetch_summary(summary: &FetchSummary, path: &std::path::Path) -> String {
    let table = &summary.table;
    let range = match (table.dates().first(), table.dates().last()) {
        (Some(a), Some(b)) => format!("{a} .. {b}"),
        _ => "-".to_string(),
    };
    format!(
        "Wrote {} ({} months x {} series, {} observations, {range})",
        path.display(),
        table.len(),
        table.columns().len(),
        summary.observations,
    )
}

/// Header block: snapshot span and latest complete year-over-year row.
pub fn format_report_header(dash: &Dashboard) -> String {
    let mut out = String::new();
    out.push_str("=== cpi - CPI inflation report (BLS) ===\n");
    if let (Some(first), Some(last)) = (dash.snapshot.dates().first(), dash.snapshot.dates().last()) {
        out.push_str(&format!(
            "Snapshot: {first} .. {last} | {} months | {} series\n",
            dash.snapshot.len(),
            dash.snapshot.columns().len()
        ));
    }
    out.push('\n');
    out.push_str(&format_latest(dash.latest.as_ref()));
    out
}

/// Latest fully populated year-over-year row, one category per line.
pub fn format_latest(latest: Option<&LatestRow>) -> String {
    let Some(latest) = latest else {
        return "Latest year-over-year: (not enough history)\n".to_string();
    };
    let mut out = format!("Latest year-over-year ({}):\n", latest.date.format("%Y-%m"));
    for (label, value) in &latest.cells {
        out.push_str(&format!(
            "  {:<width$} {:>8}\n",
            truncate(label, ROW_LABEL),
            format_value(*value, AxisMode::Percent),
            width = ROW_LABEL
        ));
    }
    out
}

/// Correlation matrix with truncated column headers; undefined cells as `-`.
pub fn format_correlation(matrix: &CorrelationMatrix) -> String {
    let mut out = String::from("Correlation of year-over-year changes:\n");

    let mut header = format!("{:<width$}", "", width = ROW_LABEL);
    for label in &matrix.labels {
        header.push_str(&format!(" {:>CELL$}", truncate(label, CELL)));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    for (label, row) in matrix.labels.iter().zip(&matrix.values) {
        let mut line = format!("{:<width$}", truncate(label, ROW_LABEL), width = ROW_LABEL);
        for cell in row {
            let text = cell.map(|r| format!("{r:.3}")).unwrap_or_else(|| "-".to_string());
            line.push_str(&format!(" {text:>CELL$}"));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn latest_row_prints_percentages() {
        let latest = LatestRow {
            date: NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
            cells: vec![("All items".to_string(), 0.0335), ("Energy".to_string(), -0.0193)],
        };
        let txt = format_latest(Some(&latest));
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[0], "Latest year-over-year (2023-12):");
        assert!(lines[1].starts_with("  All items"));
        assert!(lines[1].ends_with("3.35%"));
        assert!(lines[2].ends_with("-1.93%"));
        assert!(format_latest(None).contains("not enough history"));
    }

    #[test]
    fn correlation_table_marks_undefined_cells() {
        let m = CorrelationMatrix {
            labels: vec!["All items".to_string(), "Education and communication".to_string()],
            values: vec![vec![Some(1.0), None], vec![None, Some(1.0)]],
        };
        let txt = format_correlation(&m);
        let lines: Vec<&str> = txt.lines().collect();
        assert!(lines[1].contains("All ite."));
        assert!(lines[1].contains("Educati."));
        assert!(lines[2].starts_with("All items"));
        assert!(lines[2].ends_with("1.000        -"));
        assert!(lines[3].ends_with("-    1.000"));
    }

    #[test]
    fn truncate_respects_limit() {
        assert_eq!(truncate("Food", 8), "Food");
        assert_eq!(truncate("Transportation", 8), "Transpo.");
    }
}
