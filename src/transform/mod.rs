//! Derived views of the snapshot.
//!
//! - period-over-period / year-over-year change and 3-month annualized rate (`change`)
//! - pairwise-complete correlation (`correlation`)
//! - most recent fully populated row (`latest_complete_row`)

use chrono::NaiveDate;

use crate::domain::TimeTable;

pub mod change;
pub mod correlation;

pub use change::*;
pub use correlation::*;

/// One fully populated row of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestRow {
    pub date: NaiveDate,
    /// `(label, value)` in column order.
    pub cells: Vec<(String, f64)>,
}

/// The most recent row in which every column is defined.
pub fn latest_complete_row(table: &TimeTable) -> Option<LatestRow> {
    (0..table.len()).rev().find_map(|idx| {
        let row = table.row(idx)?;
        let values: Option<Vec<f64>> = row.into_iter().collect();
        let values = values?;
        let cells = table
            .labels()
            .into_iter()
            .map(str::to_string)
            .zip(values)
            .collect();
        Some(LatestRow {
            date: table.dates()[idx],
            cells,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Column;

    #[test]
    fn latest_skips_trailing_partial_rows() {
        let dates = (1..=3).map(|m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap()).collect();
        let table = TimeTable::new(
            dates,
            vec![
                Column::new("a", vec![None, Some(0.02), Some(0.03)]),
                Column::new("b", vec![Some(0.1), Some(0.2), None]),
            ],
        )
        .unwrap();

        let latest = latest_complete_row(&table).unwrap();
        assert_eq!(latest.date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(latest.cells, vec![("a".to_string(), 0.02), ("b".to_string(), 0.2)]);
    }

    #[test]
    fn no_complete_row_yields_none() {
        let dates = vec![NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()];
        let table = TimeTable::new(dates, vec![Column::new("a", vec![None])]).unwrap();
        assert_eq!(latest_complete_row(&table), None);
    }
}
