//! Period-over-period change and compounded annualization.
//!
//! All offsets are by row position. The table-level functions first check
//! that the index is a gap-free monthly calendar, because a 12-row offset is
//! only "a year" and a 3-row window only "a quarter" under that assumption.

use crate::domain::TimeTable;
use crate::error::AppError;

/// Periods per year for monthly data; also the year-over-year offset.
pub const MONTHS_PER_YEAR: usize = 12;

/// Trailing window (in monthly changes) for the annualized rate.
pub const ANNUALIZE_WINDOW: usize = 3;

/// `out[t] = x[t] / x[t - periods] - 1`.
///
/// Undefined when either input is missing or the base is zero; the first
/// `periods` cells are always undefined.
pub fn pct_change_series(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(t, cur)| {
            let prev = t.checked_sub(periods).and_then(|i| values[i]);
            match (*cur, prev) {
                (Some(cur), Some(prev)) if prev != 0.0 => Some(cur / prev - 1.0),
                _ => None,
            }
        })
        .collect()
}

/// Annualize each trailing `window` of fractional changes:
/// `(Π (1 + p))^(periods_per_year / window) - 1`.
///
/// A window with any undefined change is undefined, so the first
/// `window - 1` cells (plus whatever was already undefined) stay `None`.
pub fn compound_annualize_series(
    changes: &[Option<f64>],
    window: usize,
    periods_per_year: usize,
) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; changes.len()];
    }
    let exponent = periods_per_year as f64 / window as f64;

    (0..changes.len())
        .map(|t| {
            if t + 1 < window {
                return None;
            }
            let growth = changes[t + 1 - window..=t]
                .iter()
                .copied()
                .try_fold(1.0_f64, |acc, p| p.map(|p| acc * (1.0 + p)))?;
            let rate = growth.powf(exponent) - 1.0;
            rate.is_finite().then_some(rate)
        })
        .collect()
}

/// Column-wise `pct_change_series` over a monthly table.
pub fn pct_change(table: &TimeTable, periods: usize) -> Result<TimeTable, AppError> {
    if periods == 0 {
        return Err(AppError::config("pct_change needs periods >= 1."));
    }
    table.require_monthly()?;
    Ok(table.map_columns(|values| pct_change_series(values, periods)))
}

/// Fractional change versus the value 12 rows earlier.
pub fn year_over_year(table: &TimeTable) -> Result<TimeTable, AppError> {
    pct_change(table, MONTHS_PER_YEAR)
}

/// Rolling 3-month change compounded to an annual rate.
pub fn rolling_annualized(table: &TimeTable) -> Result<TimeTable, AppError> {
    let monthly = pct_change(table, 1)?;
    Ok(monthly.map_columns(|changes| compound_annualize_series(changes, ANNUALIZE_WINDOW, MONTHS_PER_YEAR)))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Column, next_month};
    use crate::error::ErrorKind;

    fn monthly_table(columns: Vec<(&str, Vec<Option<f64>>)>) -> TimeTable {
        let n = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        let mut dates = Vec::with_capacity(n);
        let mut d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        for _ in 0..n {
            dates.push(d);
            d = next_month(d).unwrap();
        }
        let columns = columns.into_iter().map(|(l, v)| Column::new(l, v)).collect();
        TimeTable::new(dates, columns).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn yoy_of_constant_series_is_zero() {
        let table = monthly_table(vec![("c", vec![Some(250.0); 15])]);
        let yoy = year_over_year(&table).unwrap();
        let col = &yoy.columns()[0];
        assert_eq!(col.leading_undefined(), 12);
        assert_eq!(col.defined(), 3);
        assert!(col.values.iter().flatten().all(|&v| v == 0.0));
    }

    #[test]
    fn annualized_rate_of_constant_growth() {
        let p = 0.004_f64;
        let values: Vec<Option<f64>> = (0..10).map(|i| Some(100.0 * (1.0 + p).powi(i))).collect();
        let table = monthly_table(vec![("g", values)]);

        let ann = rolling_annualized(&table).unwrap();
        let col = &ann.columns()[0];
        let expected = (1.0 + p).powi(12) - 1.0;
        assert_eq!(col.defined(), 7);
        for v in col.values.iter().flatten() {
            assert!((v - expected).abs() < 1e-10, "{v} vs {expected}");
        }
    }

    #[test]
    fn leading_undefined_counts() {
        let values: Vec<Option<f64>> = (0..30).map(|i| Some(100.0 + i as f64)).collect();
        let table = monthly_table(vec![("a", values.clone()), ("b", values)]);

        let yoy = year_over_year(&table).unwrap();
        let ann = rolling_annualized(&table).unwrap();
        for col in yoy.columns() {
            assert_eq!(col.leading_undefined(), 12);
        }
        // One row lost to the monthly change, two more to fill the 3-wide window.
        for col in ann.columns() {
            assert_eq!(col.leading_undefined(), 3);
            assert_eq!(col.defined(), 27);
        }
    }

    #[test]
    fn linear_series_end_to_end() {
        // 24 months: 100, 101, ..., 123.
        let values: Vec<Option<f64>> = (0..24).map(|i| Some(100.0 + i as f64)).collect();
        let table = monthly_table(vec![("lin", values)]);

        let yoy = year_over_year(&table).unwrap();
        let last = yoy.columns()[0].values[23].unwrap();
        assert!(close(last, 123.0 / 111.0 - 1.0));
        // Row 12 compares against the first observation.
        assert!(close(yoy.columns()[0].values[12].unwrap(), 0.12));

        let monthly = pct_change(&table, 1).unwrap();
        assert!(close(monthly.columns()[0].values[1].unwrap(), 0.01));

        let ann = rolling_annualized(&table).unwrap();
        let hand = ((101.0_f64 / 100.0) * (102.0 / 101.0) * (103.0 / 102.0)).powf(4.0) - 1.0;
        assert!(close(ann.columns()[0].values[3].unwrap(), hand));
        // The product telescopes: last value is (123/120)^4 - 1.
        let tail = (123.0_f64 / 120.0).powf(4.0) - 1.0;
        assert!(close(ann.columns()[0].values[23].unwrap(), tail));
    }

    #[test]
    fn rolling_annualized_is_pure() {
        let values = vec![Some(100.0), Some(101.5), None, Some(102.0), Some(103.1), Some(103.0), Some(104.2)];
        let table = monthly_table(vec![("x", values)]);
        let first = rolling_annualized(&table).unwrap();
        let second = rolling_annualized(&table).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn gaps_poison_every_window_they_touch() {
        let values = vec![
            Some(100.0),
            Some(101.0),
            Some(102.0),
            Some(103.0),
            None,
            Some(105.0),
            Some(106.0),
            Some(107.0),
            Some(108.0),
            Some(109.0),
        ];
        let table = monthly_table(vec![("x", values)]);
        let ann = rolling_annualized(&table).unwrap();
        let defined: Vec<bool> = ann.columns()[0].values.iter().map(Option::is_some).collect();
        // p[4] and p[5] are undefined; windows ending at 4..=7 include one of them.
        assert_eq!(
            defined,
            vec![false, false, false, true, false, false, false, false, true, true]
        );
    }

    #[test]
    fn zero_base_is_undefined_not_infinite() {
        let out = pct_change_series(&[Some(0.0), Some(1.0)], 1);
        assert_eq!(out, vec![None, None]);
    }

    #[test]
    fn irregular_cadence_is_rejected() {
        let dates = vec![
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
        ];
        let table = TimeTable::new(dates, vec![Column::new("x", vec![Some(1.0), Some(2.0)])]).unwrap();
        assert_eq!(year_over_year(&table).unwrap_err().kind(), ErrorKind::Precondition);
        assert_eq!(rolling_annualized(&table).unwrap_err().kind(), ErrorKind::Precondition);
    }

    #[test]
    fn short_input_is_all_undefined() {
        let table = monthly_table(vec![("x", vec![Some(1.0); 5])]);
        let yoy = year_over_year(&table).unwrap();
        assert_eq!(yoy.columns()[0].defined(), 0);
    }
}
